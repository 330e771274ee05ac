//! Sequence executor
//!
//! Ties together the parser, the screen model, the selection and the
//! palette, and applies parsed actions to them. The emulator does no I/O:
//! bytes go in through [`Emulator::process`], replies the application asked
//! for (device attributes, cursor reports, color queries) come out of
//! [`Emulator::take_responses`].

use std::collections::HashMap;

use tracing::{debug, info, trace};

use crate::config::Config;
use crate::core::{
    format_color_spec, parse_color_spec, Charset, Color, CursorShape, GlyphFlags, Palette, Rgb,
    Screen, Selection, SelectionKind, SelectionSnap, Snapshot, TermMode,
};
use crate::input::{self, Key, KeyEvent, Modifiers, MouseButton, MouseEvent};
use crate::parser::{
    Action, CsiAction, DynamicColor, EscAction, OscAction, Parser, SgrAttribute, StringSequence,
    Terminator,
};

/// Primary device attributes: VT102
const DEVICE_ATTRIBUTES: &[u8] = b"\x1b[?6c";
/// Secondary device attributes
const SECONDARY_DEVICE_ATTRIBUTES: &[u8] = b"\x1b[>0;10;1c";

/// Terminal state machine driven by the child's output
#[derive(Debug)]
pub struct Emulator {
    parser: Parser,
    screen: Screen,
    selection: Selection,
    palette: Palette,
    /// Bytes to send back to the child
    responses: Vec<u8>,
    bell: bool,
    /// Rows pushed into history since the last [`Emulator::take_scrolled`]
    scrolled: usize,
    /// DEC private modes stored by `CSI ? Pm s`
    saved_modes: HashMap<u32, bool>,
}

impl Emulator {
    /// Create an emulator with the default palette and word delimiters
    pub fn new(cols: usize, rows: usize, scrollback_lines: usize) -> Self {
        Self {
            parser: Parser::new(),
            screen: Screen::new(cols, rows, scrollback_lines),
            selection: Selection::default(),
            palette: Palette::default(),
            responses: Vec::new(),
            bell: false,
            scrolled: 0,
            saved_modes: HashMap::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let (cols, rows) = config.geometry();
        Self {
            screen: Screen::new(cols, rows, config.scrollback_lines)
                .with_tab_width(config.tab_width),
            selection: Selection::new(config.word_delimiters.clone()),
            palette: Palette::from_config(&config.palette),
            ..Self::new(cols, rows, config.scrollback_lines)
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn title(&self) -> &str {
        self.screen.title()
    }

    /// Process output bytes from the child
    pub fn process(&mut self, data: &[u8]) {
        let actions = self.parser.parse(data);
        for action in actions {
            self.apply_action(action);
            self.follow_scroll();
        }
    }

    /// Drain the replies queued for the child
    pub fn take_responses(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.responses)
    }

    /// Whether BEL was received since the last call
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    /// Rows pushed into history since the last call
    pub fn take_scrolled(&mut self) -> usize {
        std::mem::take(&mut self.scrolled)
    }

    /// Resize the screen; the selection is dropped
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.screen.resize(cols, rows);
        self.screen.take_scroll_activity();
        self.selection.clear();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_screen(&self.screen)
    }

    // ---- input encoding ----

    /// Bytes for a key press; empty when the key sends nothing or the
    /// keyboard is locked (KAM)
    pub fn encode_key(&self, event: &KeyEvent) -> Vec<u8> {
        let mode = self.screen.mode();
        if mode.contains(TermMode::KEYBOARD_LOCK) {
            return Vec::new();
        }
        input::encode_key_event(event, mode)
    }

    /// Whether the application wants mouse events
    pub fn mouse_reporting(&self) -> bool {
        self.screen.mode().intersects(TermMode::ANY_MOUSE)
    }

    /// Mouse report for the active tracking mode and encoding
    pub fn encode_mouse(&self, event: &MouseEvent) -> Option<Vec<u8>> {
        let mode = self.screen.mode();
        input::encode_mouse(event, mode.mouse_mode(), mode.mouse_encoding())
    }

    /// Cursor keys for a wheel event on the alternate screen (?1007)
    pub fn encode_alternate_scroll(&self, button: MouseButton, lines: usize) -> Option<Vec<u8>> {
        let mode = self.screen.mode();
        if !mode.contains(TermMode::ALT_SCREEN | TermMode::ALTERNATE_SCROLL) {
            return None;
        }
        let key = match button {
            MouseButton::WheelUp => Key::Up,
            MouseButton::WheelDown => Key::Down,
            _ => return None,
        };
        let event = KeyEvent::new(key, Modifiers::NONE);
        Some(self.encode_key(&event).repeat(lines))
    }

    pub fn encode_paste(&self, text: &str) -> Vec<u8> {
        input::encode_paste(
            text,
            self.screen.mode().contains(TermMode::BRACKETED_PASTE),
        )
    }

    /// Focus report, when the application asked for them (?1004)
    pub fn encode_focus(&self, focused: bool) -> Option<Vec<u8>> {
        self.screen
            .mode()
            .contains(TermMode::FOCUS_IN_OUT)
            .then(|| input::encode_focus(focused))
    }

    // ---- selection, in painted coordinates ----

    pub fn start_selection(&mut self, col: usize, view_row: usize, snap: SelectionSnap) {
        let row = self.screen.view_to_history_row(view_row);
        self.selection.start(col, row, snap, &self.screen);
        self.screen.mark_all_dirty();
    }

    pub fn extend_selection(
        &mut self,
        col: usize,
        view_row: usize,
        kind: SelectionKind,
        done: bool,
    ) {
        let row = self.screen.view_to_history_row(view_row);
        self.selection.extend(col, row, kind, done, &self.screen);
        self.screen.mark_all_dirty();
    }

    pub fn selection_text(&self) -> Option<String> {
        self.selection.text(&self.screen)
    }

    pub fn clear_selection(&mut self) {
        if self.selection.is_active() {
            self.screen.mark_all_dirty();
        }
        self.selection.clear();
    }

    pub fn is_selected(&self, col: usize, view_row: usize) -> bool {
        let row = self.screen.view_to_history_row(view_row);
        self.selection.is_selected(col, row, &self.screen)
    }

    // ---- painting ----

    /// Foreground and background of a painted cell as RGB
    ///
    /// Applies bold brightening of the 8 base colors, reverse video (per
    /// glyph and DECSCNM) and invisibility.
    pub fn resolved_colors(&self, col: usize, view_row: usize) -> Option<(Rgb, Rgb)> {
        let glyph = self.screen.view_glyph(col, view_row)?;
        let fg_color = match glyph.fg {
            Color::Basic(i) if i < 8 && glyph.flags.contains(GlyphFlags::BOLD) => {
                Color::Basic(i + 8)
            }
            color => color,
        };
        let mut fg = self.palette.resolve(fg_color, true);
        let mut bg = self.palette.resolve(glyph.bg, false);

        let reverse = glyph.flags.contains(GlyphFlags::REVERSE)
            != self.screen.mode().contains(TermMode::REVERSE_VIDEO);
        if reverse {
            std::mem::swap(&mut fg, &mut bg);
        }
        if glyph.flags.contains(GlyphFlags::INVISIBLE) {
            fg = bg;
        }
        Some((fg, bg))
    }

    /// Keep the selection on its content after the screen scrolled
    fn follow_scroll(&mut self) {
        let activity = self.screen.take_scroll_activity();
        if activity.history > 0 {
            self.scrolled += activity.history;
            self.selection
                .scroll(activity.history, self.screen.history_len());
        }
        if let Some((top, bottom)) = activity.region {
            if self.selection.intersects_rows(top as isize, bottom as isize) {
                self.selection.clear();
            }
        }
    }

    /// Apply a single parsed action to the screen
    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Print(rune) => self.print(rune),
            Action::Execute(byte) => self.execute_control(byte),
            Action::Csi(csi) => self.execute_csi(&csi),
            Action::Esc(esc) => self.execute_esc(esc),
            Action::Osc(osc) => self.execute_osc(osc),
            Action::String(seq) => self.execute_string(&seq),
        }
    }

    fn print(&mut self, rune: char) {
        if self.selection.is_active() {
            let cursor = self.screen.cursor();
            if self
                .selection
                .is_selected(cursor.col, cursor.row as isize, &self.screen)
            {
                self.selection.clear();
            }
        }
        self.screen.put_char(rune);
    }

    /// Execute a C0 or C1 control
    fn execute_control(&mut self, byte: u8) {
        match byte {
            // BEL
            0x07 => {
                trace!("bell");
                self.bell = true;
            }
            0x08 => self.screen.backspace(),
            0x09 => self.screen.tab_forward(1),
            // LF, VT, FF
            0x0A..=0x0C => {
                let lnm = self.screen.mode().contains(TermMode::LINE_FEED_NEW_LINE);
                self.screen.newline(lnm);
            }
            0x0D => self.screen.carriage_return(),
            // SO, SI
            0x0E => self.screen.charsets_mut().invoke(1),
            0x0F => self.screen.charsets_mut().invoke(0),
            // IND, NEL, HTS, RI
            0x84 => self.screen.newline(false),
            0x85 => self.screen.newline(true),
            0x88 => self.screen.set_tab_stop(),
            0x8D => self.screen.reverse_index(),
            // SS2, SS3
            0x8E => self.screen.charsets_mut().single_shift(2),
            0x8F => self.screen.charsets_mut().single_shift(3),
            // DECID
            0x9A => self.responses.extend_from_slice(DEVICE_ATTRIBUTES),
            _ => trace!(byte, "ignored control"),
        }
    }

    /// Execute a CSI sequence
    fn execute_csi(&mut self, csi: &CsiAction) {
        match csi.private {
            None => {}
            Some('?') => return self.execute_csi_private(csi),
            Some('>') if csi.final_char == 'c' => {
                if csi.param(0, 0) == 0 {
                    self.responses
                        .extend_from_slice(SECONDARY_DEVICE_ATTRIBUTES);
                }
                return;
            }
            Some(_) => {
                debug!(sequence = %csi.describe(), "unhandled CSI");
                return;
            }
        }

        let n = csi.param_or_default(0, 1) as usize;
        match (csi.intermediates.as_str(), csi.final_char) {
            // ICH
            ("", '@') => self.screen.insert_blank(n),
            // CUU
            ("", 'A') => self.screen.cursor_up(n),
            // CUD, VPR
            ("", 'B') | ("", 'e') => self.screen.cursor_down(n),
            // CUF, HPR
            ("", 'C') | ("", 'a') => self.screen.cursor_forward(n),
            // CUB
            ("", 'D') => self.screen.cursor_backward(n),
            // CNL
            ("", 'E') => {
                self.screen.cursor_down(n);
                self.screen.carriage_return();
            }
            // CPL
            ("", 'F') => {
                self.screen.cursor_up(n);
                self.screen.carriage_return();
            }
            // CHA, HPA
            ("", 'G') | ("", '`') => self.screen.set_col(n - 1),
            // CUP, HVP
            ("", 'H') | ("", 'f') => {
                let row = csi.param_or_default(0, 1) as usize - 1;
                let col = csi.param_or_default(1, 1) as usize - 1;
                self.screen.move_absolute(col, row);
            }
            // CHT
            ("", 'I') => self.screen.tab_forward(n),
            // ED
            ("", 'J') => self.screen.erase_in_display(csi.param(0, 0)),
            // EL
            ("", 'K') => self.screen.erase_in_line(csi.param(0, 0)),
            // IL
            ("", 'L') => self.screen.insert_lines(n),
            // DL
            ("", 'M') => self.screen.delete_lines(n),
            // DCH
            ("", 'P') => self.screen.delete_chars(n),
            // SU
            ("", 'S') => {
                let (top, _) = self.screen.scroll_region();
                self.screen.scroll_up(top, n);
            }
            // SD
            ("", 'T') => {
                let (top, _) = self.screen.scroll_region();
                self.screen.scroll_down(top, n);
            }
            // ECH
            ("", 'X') => self.screen.erase_chars(n),
            // CBT
            ("", 'Z') => self.screen.tab_backward(n),
            // REP
            ("", 'b') => self.screen.repeat_last(n),
            // DA
            ("", 'c') => {
                if csi.param(0, 0) == 0 {
                    self.responses.extend_from_slice(DEVICE_ATTRIBUTES);
                }
            }
            // VPA
            ("", 'd') => self.screen.set_row(n - 1),
            // TBC
            ("", 'g') => match csi.param(0, 0) {
                0 => self.screen.clear_tab_stop(),
                3 => self.screen.clear_all_tab_stops(),
                mode => debug!(mode, "unknown TBC mode"),
            },
            // SM, RM
            ("", 'h') => self.set_ansi_modes(csi, true),
            ("", 'l') => self.set_ansi_modes(csi, false),
            // SGR
            ("", 'm') => self.execute_sgr(csi),
            // DSR
            ("", 'n') => self.device_status(csi.param(0, 0), false),
            // DECSTBM
            ("", 'r') => {
                let top = csi.param_or_default(0, 1) as usize - 1;
                let bottom = csi.param_or_default(1, self.screen.rows() as u32) as usize - 1;
                self.screen.set_scroll_region(top, bottom);
            }
            // SCOSC, SCORC
            ("", 's') if csi.params.is_empty() => self.screen.save_cursor(),
            ("", 'u') if csi.params.is_empty() => self.screen.restore_cursor(),
            // DECSCUSR
            (" ", 'q') => self.set_cursor_style(csi.param(0, 0)),
            // DECSTR
            ("!", 'p') => self.soft_reset(),
            _ => debug!(sequence = %csi.describe(), "unhandled CSI"),
        }
    }

    /// Execute a private CSI sequence (starts with ?)
    fn execute_csi_private(&mut self, csi: &CsiAction) {
        match csi.final_char {
            'h' => {
                for &mode in &csi.params {
                    self.set_dec_mode(mode, true);
                }
            }
            'l' => {
                for &mode in &csi.params {
                    self.set_dec_mode(mode, false);
                }
            }
            // XTSAVE
            's' => {
                for &mode in &csi.params {
                    if let Some(set) = self.dec_mode(mode) {
                        self.saved_modes.insert(mode, set);
                    }
                }
            }
            // XTRESTORE
            'r' => {
                for &mode in &csi.params {
                    if let Some(set) = self.saved_modes.get(&mode).copied() {
                        self.set_dec_mode(mode, set);
                    }
                }
            }
            // DECSED, DECSEL
            'J' => self.screen.erase_in_display(csi.param(0, 0)),
            'K' => self.screen.erase_in_line(csi.param(0, 0)),
            // DECXCPR
            'n' => self.device_status(csi.param(0, 0), true),
            _ => debug!(sequence = %csi.describe(), "unhandled private CSI"),
        }
    }

    /// Mode bit of a DEC private mode that maps onto one flag
    fn dec_mode_bit(mode: u32) -> Option<TermMode> {
        let bit = match mode {
            1 => TermMode::APP_CURSOR,
            5 => TermMode::REVERSE_VIDEO,
            6 => TermMode::ORIGIN,
            7 => TermMode::LINE_WRAP,
            9 => TermMode::MOUSE_X10,
            12 => TermMode::CURSOR_BLINK,
            25 => TermMode::SHOW_CURSOR,
            66 => TermMode::APP_KEYPAD,
            1000 => TermMode::MOUSE_REPORT,
            1002 => TermMode::MOUSE_MOTION,
            1003 => TermMode::MOUSE_ALL,
            1004 => TermMode::FOCUS_IN_OUT,
            1005 => TermMode::UTF8_MOUSE,
            1006 => TermMode::SGR_MOUSE,
            1007 => TermMode::ALTERNATE_SCROLL,
            1015 => TermMode::URXVT_MOUSE,
            2004 => TermMode::BRACKETED_PASTE,
            _ => return None,
        };
        Some(bit)
    }

    /// Current value of a DEC private mode that can be saved
    fn dec_mode(&self, mode: u32) -> Option<bool> {
        Self::dec_mode_bit(mode).map(|bit| self.screen.mode().contains(bit))
    }

    /// Set or reset a DEC private mode
    fn set_dec_mode(&mut self, mode: u32, set: bool) {
        trace!(mode, set, "DEC private mode");
        match mode {
            // Alternate screen, without and with clearing
            47 | 1047 => self.switch_screen(set),
            1048 => {
                if set {
                    self.screen.save_cursor();
                } else {
                    self.screen.restore_cursor();
                }
            }
            1049 => {
                if set {
                    self.screen.save_cursor();
                    self.switch_screen(true);
                } else {
                    self.switch_screen(false);
                    self.screen.restore_cursor();
                }
            }
            // DECCOLM; the host owns the geometry
            3 => debug!(set, "DECCOLM ignored"),
            _ => match Self::dec_mode_bit(mode) {
                Some(bit) if bit.intersects(TermMode::ANY_MOUSE) => {
                    self.screen.set_mouse_mode(bit, set)
                }
                Some(bit) if bit.intersects(TermMode::ANY_MOUSE_ENCODING) => {
                    self.screen.set_mouse_encoding(bit, set)
                }
                Some(bit) if bit == TermMode::CURSOR_BLINK => {
                    self.screen.set_mode(set, TermMode::CURSOR_BLINK);
                    self.screen.cursor_mut().blinking = set;
                }
                Some(bit) => self.screen.set_mode(set, bit),
                None => debug!(mode, set, "unknown DEC mode"),
            },
        }
    }

    /// Enter or leave the alternate screen; a selection made on the
    /// screen being left is dropped
    fn switch_screen(&mut self, alt: bool) {
        if self.screen.is_alt_screen() == alt {
            return;
        }
        if alt {
            self.screen.enter_alt_screen();
        } else {
            self.screen.exit_alt_screen();
        }
        self.clear_selection();
    }

    /// SM / RM
    fn set_ansi_modes(&mut self, csi: &CsiAction, set: bool) {
        for &mode in &csi.params {
            let bit = match mode {
                // KAM
                2 => TermMode::KEYBOARD_LOCK,
                // IRM
                4 => TermMode::INSERT,
                // SRM
                12 => TermMode::SEND_RECEIVE,
                // LNM
                20 => TermMode::LINE_FEED_NEW_LINE,
                _ => {
                    debug!(mode, set, "unknown ANSI mode");
                    continue;
                }
            };
            self.screen.set_mode(set, bit);
        }
    }

    /// DSR 5 / 6, with `private` for the DECXCPR form
    fn device_status(&mut self, request: u32, private: bool) {
        match request {
            5 if !private => self.responses.extend_from_slice(b"\x1b[0n"),
            6 => {
                let cursor = self.screen.cursor();
                let (top, _) = self.screen.scroll_region();
                let row = if cursor.origin() {
                    cursor.row.saturating_sub(top)
                } else {
                    cursor.row
                };
                let marker = if private { "?" } else { "" };
                let reply = format!("\x1b[{}{};{}R", marker, row + 1, cursor.col + 1);
                self.responses.extend_from_slice(reply.as_bytes());
            }
            _ => debug!(request, private, "unknown DSR request"),
        }
    }

    /// DECSCUSR
    fn set_cursor_style(&mut self, style: u32) {
        let (shape, blinking) = match style {
            0 | 1 => (CursorShape::Block, true),
            2 => (CursorShape::Block, false),
            3 => (CursorShape::Underline, true),
            4 => (CursorShape::Underline, false),
            5 => (CursorShape::Bar, true),
            6 => (CursorShape::Bar, false),
            _ => {
                debug!(style, "unknown cursor style");
                return;
            }
        };
        let cursor = self.screen.cursor_mut();
        cursor.shape = shape;
        cursor.blinking = blinking;
    }

    /// Execute SGR (Select Graphic Rendition)
    fn execute_sgr(&mut self, csi: &CsiAction) {
        let template = &mut self.screen.cursor_mut().template;
        for attr in csi.parse_sgr() {
            match attr {
                SgrAttribute::Reset => {
                    template.flags.remove(GlyphFlags::RENDITION);
                    template.fg = Color::Default;
                    template.bg = Color::Default;
                }
                SgrAttribute::Bold => template.flags.insert(GlyphFlags::BOLD),
                SgrAttribute::Faint => template.flags.insert(GlyphFlags::FAINT),
                SgrAttribute::Italic => template.flags.insert(GlyphFlags::ITALIC),
                SgrAttribute::Underline => template.flags.insert(GlyphFlags::UNDERLINE),
                SgrAttribute::Blink => template.flags.insert(GlyphFlags::BLINK),
                SgrAttribute::Reverse => template.flags.insert(GlyphFlags::REVERSE),
                SgrAttribute::Invisible => template.flags.insert(GlyphFlags::INVISIBLE),
                SgrAttribute::Struck => template.flags.insert(GlyphFlags::STRUCK),
                SgrAttribute::NoBoldFaint => {
                    template.flags.remove(GlyphFlags::BOLD | GlyphFlags::FAINT)
                }
                SgrAttribute::NoItalic => template.flags.remove(GlyphFlags::ITALIC),
                SgrAttribute::NoUnderline => template.flags.remove(GlyphFlags::UNDERLINE),
                SgrAttribute::NoBlink => template.flags.remove(GlyphFlags::BLINK),
                SgrAttribute::NoReverse => template.flags.remove(GlyphFlags::REVERSE),
                SgrAttribute::NoInvisible => template.flags.remove(GlyphFlags::INVISIBLE),
                SgrAttribute::NoStruck => template.flags.remove(GlyphFlags::STRUCK),
                SgrAttribute::Foreground(color) => template.fg = color,
                SgrAttribute::Background(color) => template.bg = color,
                SgrAttribute::DefaultForeground => template.fg = Color::Default,
                SgrAttribute::DefaultBackground => template.bg = Color::Default,
            }
        }
    }

    /// Execute an ESC sequence
    fn execute_esc(&mut self, esc: EscAction) {
        match esc {
            EscAction::SaveCursor => self.screen.save_cursor(),
            EscAction::RestoreCursor => self.screen.restore_cursor(),
            EscAction::Index => self.screen.newline(false),
            EscAction::NextLine => self.screen.newline(true),
            EscAction::TabSet => self.screen.set_tab_stop(),
            EscAction::ReverseIndex => self.screen.reverse_index(),
            EscAction::FullReset => self.full_reset(),
            EscAction::ApplicationKeypad => self.screen.set_mode(true, TermMode::APP_KEYPAD),
            EscAction::NormalKeypad => self.screen.set_mode(false, TermMode::APP_KEYPAD),
            EscAction::SingleShift(slot) => self.screen.charsets_mut().single_shift(slot),
            EscAction::LockingShift(slot) => self.screen.charsets_mut().invoke(slot),
            EscAction::DesignateCharset { slot, designator } => {
                let charset = Charset::from_designator(designator);
                trace!(slot, ?charset, "designate charset");
                self.screen.charsets_mut().designate(slot, charset);
            }
            EscAction::AlignmentTest => self.screen.decaln(),
            EscAction::Identify => self.responses.extend_from_slice(DEVICE_ATTRIBUTES),
            EscAction::Unknown(sequence) => debug!(?sequence, "unknown ESC sequence"),
        }
    }

    /// Execute an OSC sequence
    fn execute_osc(&mut self, osc: OscAction) {
        match osc {
            OscAction::SetTitle(title) => {
                trace!(%title, "set title");
                self.screen.set_title(&title);
            }
            OscAction::SetIconName(name) => self.screen.set_icon_name(&name),
            OscAction::SetPaletteColor { index, spec } => match parse_color_spec(&spec) {
                Some(rgb) => {
                    self.palette.set_indexed(index, rgb);
                    self.screen.mark_all_dirty();
                }
                None => debug!(index, %spec, "invalid palette color"),
            },
            OscAction::QueryPaletteColor { index, terminator } => {
                let spec = format_color_spec(self.palette.indexed(index));
                self.reply_osc(&format!("4;{};{}", index, spec), terminator);
            }
            OscAction::ResetPaletteColor(index) => {
                match index {
                    Some(index) => self.palette.reset_indexed(index),
                    None => self.palette.reset_all_indexed(),
                }
                self.screen.mark_all_dirty();
            }
            OscAction::SetDynamicColor { target, spec } => match parse_color_spec(&spec) {
                Some(rgb) => {
                    match target {
                        DynamicColor::Foreground => self.palette.set_foreground(rgb),
                        DynamicColor::Background => self.palette.set_background(rgb),
                        DynamicColor::Cursor => self.palette.set_cursor(rgb),
                    }
                    self.screen.mark_all_dirty();
                }
                None => debug!(?target, %spec, "invalid dynamic color"),
            },
            OscAction::QueryDynamicColor { target, terminator } => {
                let rgb = match target {
                    DynamicColor::Foreground => self.palette.foreground(),
                    DynamicColor::Background => self.palette.background(),
                    DynamicColor::Cursor => self.palette.cursor(),
                };
                let reply = format!("{};{}", target.osc(), format_color_spec(rgb));
                self.reply_osc(&reply, terminator);
            }
            OscAction::ResetDynamicColor(target) => {
                match target {
                    DynamicColor::Foreground => self.palette.reset_foreground(),
                    DynamicColor::Background => self.palette.reset_background(),
                    DynamicColor::Cursor => self.palette.reset_cursor(),
                }
                self.screen.mark_all_dirty();
            }
            OscAction::Clipboard { selection, data } => {
                // Clipboard writes from the child are not honored
                info!(%selection, len = data.len(), "ignoring OSC 52 clipboard request");
            }
            OscAction::Unknown { command, payload } => {
                debug!(?command, len = payload.len(), "unknown OSC");
            }
        }
    }

    fn execute_string(&mut self, seq: &StringSequence) {
        debug!(kind = ?seq.kind, len = seq.raw.len(), "ignoring string sequence");
    }

    fn reply_osc(&mut self, body: &str, terminator: Terminator) {
        self.responses.extend_from_slice(b"\x1b]");
        self.responses.extend_from_slice(body.as_bytes());
        self.responses
            .extend_from_slice(terminator.as_str().as_bytes());
    }

    /// DECSTR
    fn soft_reset(&mut self) {
        self.screen.soft_reset();
        debug!("soft reset");
    }

    /// RIS
    fn full_reset(&mut self) {
        self.screen.reset();
        self.screen.take_scroll_activity();
        self.palette.reset();
        self.selection.clear();
        self.saved_modes.clear();
        debug!("full reset");
    }
}
