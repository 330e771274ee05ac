//! Screen model implementation
//!
//! The screen holds the primary and alternate grids, the cursor, the scroll
//! region, tab stops and mode flags. The primary grid feeds the scrollback
//! ring. The alternate grid never does, and it is cleared on entry so that
//! leaving it restores the primary grid untouched.
//!
//! Every operation clamps its arguments to the grid; nothing here panics on
//! out-of-range input coming from the application.

use tracing::trace;

use super::cell::{rune_width, Glyph, GlyphFlags};
use super::charset::CharsetState;
use super::cursor::{Cursor, SavedCursor};
use super::modes::TermMode;
use super::scrollback::{Line, Scrollback};

pub const DEFAULT_TAB_WIDTH: usize = 8;

/// Rows that scrolled while the host was not looking
///
/// Drained by the emulator after every chunk so the selection can follow
/// its content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollActivity {
    /// Rows pushed into scrollback
    pub history: usize,
    /// Inclusive row span scrolled without touching history
    pub region: Option<(usize, usize)>,
}

#[derive(Debug, Clone)]
pub struct Screen {
    cols: usize,
    rows: usize,
    primary: Vec<Line>,
    alternate: Vec<Line>,
    scrollback: Scrollback,
    cursor: Cursor,
    /// DECSC slots, indexed by `is_alt_screen() as usize`
    saved: [SavedCursor; 2],
    /// Scroll region top (0-indexed, inclusive)
    scroll_top: usize,
    /// Scroll region bottom (0-indexed, inclusive)
    scroll_bottom: usize,
    tabs: Vec<bool>,
    tab_width: usize,
    mode: TermMode,
    charsets: CharsetState,
    dirty: Vec<bool>,
    /// Rows of history shown above the live grid
    view_offset: usize,
    /// Last rune written, for REP
    last_rune: Option<char>,
    activity: ScrollActivity,
    title: String,
    icon_name: String,
}

impl Screen {
    /// Create a screen; zero dimensions are clamped to 1
    pub fn new(cols: usize, rows: usize, scrollback_lines: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let mut screen = Self {
            cols,
            rows,
            primary: (0..rows).map(|_| Line::new(cols)).collect(),
            alternate: (0..rows).map(|_| Line::new(cols)).collect(),
            scrollback: Scrollback::new(scrollback_lines),
            cursor: Cursor::new(),
            saved: [SavedCursor::default(); 2],
            scroll_top: 0,
            scroll_bottom: rows - 1,
            tabs: Vec::new(),
            tab_width: DEFAULT_TAB_WIDTH,
            mode: TermMode::default(),
            charsets: CharsetState::default(),
            dirty: vec![true; rows],
            view_offset: 0,
            last_rune: None,
            activity: ScrollActivity::default(),
            title: String::new(),
            icon_name: String::new(),
        };
        screen.reset_tabs();
        screen
    }

    /// Use a tab stop interval other than 8
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width.max(1);
        self.reset_tabs();
        self
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn mode(&self) -> TermMode {
        self.mode
    }

    pub fn charsets_mut(&mut self) -> &mut CharsetState {
        &mut self.charsets
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn history_len(&self) -> usize {
        self.scrollback.len()
    }

    pub fn scroll_region(&self) -> (usize, usize) {
        (self.scroll_top, self.scroll_bottom)
    }

    pub fn is_alt_screen(&self) -> bool {
        self.mode.contains(TermMode::ALT_SCREEN)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn icon_name(&self) -> &str {
        &self.icon_name
    }

    pub fn set_icon_name(&mut self, name: &str) {
        self.icon_name = name.to_string();
    }

    fn grid(&self) -> &[Line] {
        if self.is_alt_screen() {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn grid_mut(&mut self) -> &mut Vec<Line> {
        if self.mode.contains(TermMode::ALT_SCREEN) {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    /// Row of the active grid
    pub fn line(&self, row: usize) -> Option<&Line> {
        self.grid().get(row)
    }

    /// Glyph of the active grid
    pub fn glyph(&self, col: usize, row: usize) -> Option<&Glyph> {
        self.line(row).and_then(|line| line.get(col))
    }

    /// Row in history coordinates: 0 is the top of the live grid, negative
    /// rows count back into scrollback (-1 is the newest history row)
    pub fn line_at(&self, row: isize) -> Option<&Line> {
        if row >= 0 {
            self.grid().get(row as usize)
        } else {
            self.scrollback.get_from_end(row.unsigned_abs() - 1)
        }
    }

    // ---- dirty tracking ----

    pub fn is_row_dirty(&self, row: usize) -> bool {
        self.dirty.get(row).copied().unwrap_or(false)
    }

    pub fn dirty_rows(&self) -> Vec<usize> {
        self.dirty
            .iter()
            .enumerate()
            .filter_map(|(row, &dirty)| dirty.then_some(row))
            .collect()
    }

    pub fn mark_clean(&mut self) {
        self.dirty.fill(false);
    }

    pub fn mark_row_clean(&mut self, row: usize) {
        if let Some(flag) = self.dirty.get_mut(row) {
            *flag = false;
        }
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    fn mark_row_dirty(&mut self, row: usize) {
        if let Some(flag) = self.dirty.get_mut(row) {
            *flag = true;
        }
    }

    fn mark_rows_dirty(&mut self, top: usize, bottom: usize) {
        let bottom = bottom.min(self.rows - 1);
        if top <= bottom {
            self.dirty[top..=bottom].fill(true);
        }
    }

    /// Drain the scroll activity recorded since the last call
    pub fn take_scroll_activity(&mut self) -> ScrollActivity {
        std::mem::take(&mut self.activity)
    }

    fn note_region_scroll(&mut self, top: usize, bottom: usize) {
        self.activity.region = Some(match self.activity.region {
            Some((t, b)) => (t.min(top), b.max(bottom)),
            None => (top, bottom),
        });
    }

    // ---- writing ----

    /// Write a printable rune at the cursor, applying the active charset
    pub fn put_char(&mut self, rune: char) {
        let rune = self.charsets.translate(rune);
        self.write_rune(rune);
    }

    /// REP: write the last rune `n` more times
    pub fn repeat_last(&mut self, n: usize) {
        if let Some(rune) = self.last_rune {
            for _ in 0..n.min(self.cols * self.rows) {
                self.write_rune(rune);
            }
        }
    }

    fn write_rune(&mut self, rune: char) {
        let width = rune_width(rune);
        if width == 0 || width > self.cols {
            // Combining marks and zero-width runes get no cell of their own
            trace!(rune = ?rune, "dropping zero-width rune");
            return;
        }

        let autowrap = self.mode.contains(TermMode::LINE_WRAP);
        if autowrap && self.cursor.wrap_pending() {
            self.wrap_line();
        }
        if self.cursor.col + width > self.cols {
            if autowrap {
                self.wrap_line();
            } else {
                self.cursor.col = self.cols - width;
            }
        }

        let (col, row) = (self.cursor.col, self.cursor.row);
        if self.mode.contains(TermMode::INSERT) && col + width < self.cols {
            self.shift_right(col, row, width);
        }
        self.break_wide_pair(col, row);
        if width == 2 {
            self.break_wide_pair(col + 1, row);
        }

        let template = self.cursor.template;
        let rendition = template.flags & GlyphFlags::RENDITION;
        let line = &mut self.grid_mut()[row];
        line[col] = Glyph {
            rune,
            flags: if width == 2 {
                rendition | GlyphFlags::WIDE
            } else {
                rendition
            },
            fg: template.fg,
            bg: template.bg,
        };
        if width == 2 {
            line[col + 1] = Glyph {
                rune: ' ',
                flags: rendition | GlyphFlags::WIDE_DUMMY,
                fg: template.fg,
                bg: template.bg,
            };
        }
        self.mark_row_dirty(row);
        self.last_rune = Some(rune);

        if col + width < self.cols {
            self.cursor.col = col + width;
        } else {
            self.cursor.set_wrap_pending(true);
        }
    }

    /// Mark the cursor row as soft-wrapped and continue on the next one
    fn wrap_line(&mut self) {
        let row = self.cursor.row;
        self.grid_mut()[row].set_wrapped(true);
        self.newline(true);
    }

    /// Blank the other half of a wide pair that `(col, row)` belongs to
    fn break_wide_pair(&mut self, col: usize, row: usize) {
        let cols = self.cols;
        let line = &mut self.grid_mut()[row];
        let Some(glyph) = line.get(col).copied() else {
            return;
        };
        if glyph.is_wide() && col + 1 < cols {
            let bg = line[col + 1].bg;
            line[col + 1] = Glyph::blank(bg);
        } else if glyph.is_wide_dummy() && col > 0 {
            let bg = line[col - 1].bg;
            line[col - 1] = Glyph::blank(bg);
        }
    }

    /// Blank any half of a wide pair left without its partner
    fn repair_wide_pairs(&mut self, row: usize) {
        let line = &mut self.grid_mut()[row];
        let cols = line.len();
        for col in 0..cols {
            let glyph = line[col];
            let orphan = if glyph.is_wide() {
                col + 1 >= cols || !line[col + 1].is_wide_dummy()
            } else if glyph.is_wide_dummy() {
                col == 0 || !line[col - 1].is_wide()
            } else {
                false
            };
            if orphan {
                line[col] = Glyph::blank(glyph.bg);
            }
        }
    }

    fn shift_right(&mut self, col: usize, row: usize, n: usize) {
        let bg = self.cursor.bg();
        self.break_wide_pair(col, row);
        let line = &mut self.grid_mut()[row];
        let glyphs = &mut line.glyphs_mut()[col..];
        let n = n.min(glyphs.len());
        glyphs.rotate_right(n);
        glyphs[..n].fill(Glyph::blank(bg));
        self.repair_wide_pairs(row);
        self.mark_row_dirty(row);
    }

    // ---- line feeds and scrolling ----

    /// LF / IND; with `carriage_return` also returns to column 0 (NEL)
    pub fn newline(&mut self, carriage_return: bool) {
        let row = self.cursor.row;
        if row == self.scroll_bottom {
            self.scroll_up(self.scroll_top, 1);
        } else if row + 1 < self.rows {
            self.cursor.row = row + 1;
        }
        if carriage_return {
            self.cursor.col = 0;
        }
        self.cursor.set_wrap_pending(false);
    }

    /// RI: move up, scrolling the region down at its top
    pub fn reverse_index(&mut self) {
        let row = self.cursor.row;
        if row == self.scroll_top {
            self.scroll_down(self.scroll_top, 1);
        } else if row > 0 {
            self.cursor.row = row - 1;
        }
        self.cursor.set_wrap_pending(false);
    }

    /// Shift rows `[origin, bottom]` up by `n`, clearing the exposed rows
    ///
    /// On the primary screen, rows leaving the top of a region that starts
    /// at row 0 go into scrollback.
    pub fn scroll_up(&mut self, origin: usize, n: usize) {
        self.scroll_region_up(origin, n, true);
    }

    fn scroll_region_up(&mut self, origin: usize, n: usize, keep_history: bool) {
        let bottom = self.scroll_bottom;
        if origin > bottom {
            return;
        }
        let n = n.min(bottom - origin + 1);
        if n == 0 {
            return;
        }
        let cols = self.cols;
        let bg = self.cursor.bg();
        let keep_history = keep_history && origin == 0 && !self.is_alt_screen();

        let grid = self.grid_mut();
        grid[origin..=bottom].rotate_left(n);
        let mut evicted = Vec::new();
        for line in &mut grid[bottom + 1 - n..=bottom] {
            let old = std::mem::replace(line, Line::blank(cols, bg));
            if keep_history {
                evicted.push(old);
            }
        }

        if keep_history {
            for line in evicted {
                self.push_history(line);
            }
            self.activity.history += n;
        } else {
            self.note_region_scroll(origin, bottom);
        }
        self.mark_rows_dirty(origin, bottom);
    }

    /// Shift rows `[origin, bottom]` down by `n`, clearing the exposed rows
    pub fn scroll_down(&mut self, origin: usize, n: usize) {
        let bottom = self.scroll_bottom;
        if origin > bottom {
            return;
        }
        let n = n.min(bottom - origin + 1);
        if n == 0 {
            return;
        }
        let cols = self.cols;
        let bg = self.cursor.bg();

        let grid = self.grid_mut();
        grid[origin..=bottom].rotate_right(n);
        for line in &mut grid[origin..origin + n] {
            *line = Line::blank(cols, bg);
        }
        self.note_region_scroll(origin, bottom);
        self.mark_rows_dirty(origin, bottom);
    }

    fn push_history(&mut self, line: Line) {
        self.scrollback.push(line);
        // Keep a scrolled-back view on the same content
        if self.view_offset > 0 {
            self.view_offset = (self.view_offset + 1).min(self.scrollback.len());
        }
    }

    /// DECSTBM with 0-indexed inclusive rows
    ///
    /// The bottom margin is clamped to the last row; a region that is still
    /// empty selects the whole screen. The cursor goes home.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let bottom = bottom.min(self.rows - 1);
        if top < bottom {
            self.scroll_top = top;
            self.scroll_bottom = bottom;
        } else {
            self.scroll_top = 0;
            self.scroll_bottom = self.rows - 1;
        }
        self.move_absolute(0, 0);
    }

    // ---- erasing ----

    /// Blank the inclusive rectangle with the cursor background
    pub fn clear_region(&mut self, x1: usize, y1: usize, x2: usize, y2: usize) {
        let (x1, x2) = (x1.min(x2), x1.max(x2).min(self.cols - 1));
        let (y1, y2) = (y1.min(y2), y1.max(y2).min(self.rows - 1));
        if x1 > x2 || y1 > y2 {
            return;
        }
        let cols = self.cols;
        let bg = self.cursor.bg();
        for row in y1..=y2 {
            let line = &mut self.grid_mut()[row];
            line.glyphs_mut()[x1..=x2].fill(Glyph::blank(bg));
            if x1 > 0 && line[x1 - 1].is_wide() {
                let bg = line[x1 - 1].bg;
                line[x1 - 1] = Glyph::blank(bg);
            }
            if x2 + 1 < cols && line[x2 + 1].is_wide_dummy() {
                let bg = line[x2 + 1].bg;
                line[x2 + 1] = Glyph::blank(bg);
            }
        }
        self.mark_rows_dirty(y1, y2);
    }

    /// ED: 0 below, 1 above, 2 all, 3 scrollback
    pub fn erase_in_display(&mut self, mode: u32) {
        let (col, row) = (self.cursor.col, self.cursor.row);
        let (last_col, last_row) = (self.cols - 1, self.rows - 1);
        match mode {
            0 => {
                self.clear_region(col, row, last_col, row);
                if row < last_row {
                    self.clear_region(0, row + 1, last_col, last_row);
                }
            }
            1 => {
                if row > 0 {
                    self.clear_region(0, 0, last_col, row - 1);
                }
                self.clear_region(0, row, col, row);
            }
            2 => self.clear_region(0, 0, last_col, last_row),
            3 => self.clear_history(),
            _ => trace!(mode, "unknown ED mode"),
        }
    }

    /// EL: 0 right of cursor, 1 left of cursor, 2 whole row
    pub fn erase_in_line(&mut self, mode: u32) {
        let (col, row) = (self.cursor.col, self.cursor.row);
        match mode {
            0 => self.clear_region(col, row, self.cols - 1, row),
            1 => self.clear_region(0, row, col, row),
            2 => self.clear_region(0, row, self.cols - 1, row),
            _ => trace!(mode, "unknown EL mode"),
        }
    }

    /// ECH
    pub fn erase_chars(&mut self, n: usize) {
        let (col, row) = (self.cursor.col, self.cursor.row);
        let end = col.saturating_add(n.max(1) - 1);
        self.clear_region(col, row, end, row);
    }

    pub fn clear_history(&mut self) {
        self.scrollback.clear();
        if self.view_offset > 0 {
            self.view_offset = 0;
            self.mark_all_dirty();
        }
    }

    // ---- character and line editing ----

    /// ICH
    pub fn insert_blank(&mut self, n: usize) {
        let (col, row) = (self.cursor.col, self.cursor.row);
        self.shift_right(col, row, n.max(1));
    }

    /// DCH
    pub fn delete_chars(&mut self, n: usize) {
        let (col, row) = (self.cursor.col, self.cursor.row);
        let bg = self.cursor.bg();
        self.break_wide_pair(col, row);
        let line = &mut self.grid_mut()[row];
        let glyphs = &mut line.glyphs_mut()[col..];
        let n = n.max(1).min(glyphs.len());
        glyphs.rotate_left(n);
        let len = glyphs.len();
        glyphs[len - n..].fill(Glyph::blank(bg));
        self.repair_wide_pairs(row);
        self.mark_row_dirty(row);
    }

    /// IL; only inside the scroll region
    pub fn insert_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if (self.scroll_top..=self.scroll_bottom).contains(&row) {
            self.scroll_down(row, n.max(1));
            self.cursor.col = 0;
            self.cursor.set_wrap_pending(false);
        }
    }

    /// DL; only inside the scroll region, never feeds scrollback
    pub fn delete_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if (self.scroll_top..=self.scroll_bottom).contains(&row) {
            self.scroll_region_up(row, n.max(1), false);
            self.cursor.col = 0;
            self.cursor.set_wrap_pending(false);
        }
    }

    // ---- cursor movement ----

    /// Move to `(col, row)` in screen coordinates
    ///
    /// In origin mode the row is confined to the scroll region.
    pub fn move_to(&mut self, col: usize, row: usize) {
        let (min_row, max_row) = if self.cursor.origin() {
            (self.scroll_top, self.scroll_bottom)
        } else {
            (0, self.rows - 1)
        };
        self.cursor.col = col.min(self.cols - 1);
        self.cursor.row = row.clamp(min_row, max_row);
        self.cursor.set_wrap_pending(false);
    }

    /// CUP / HVP: rows are relative to the region in origin mode
    pub fn move_absolute(&mut self, col: usize, row: usize) {
        let offset = if self.cursor.origin() {
            self.scroll_top
        } else {
            0
        };
        self.move_to(col, row.saturating_add(offset));
    }

    /// CUU; stops at the region top when starting inside it
    pub fn cursor_up(&mut self, n: usize) {
        let row = self.cursor.row;
        let limit = if row >= self.scroll_top {
            self.scroll_top
        } else {
            0
        };
        self.cursor.row = row.saturating_sub(n.max(1)).max(limit);
        self.cursor.set_wrap_pending(false);
    }

    /// CUD; stops at the region bottom when starting inside it
    pub fn cursor_down(&mut self, n: usize) {
        let row = self.cursor.row;
        let limit = if row <= self.scroll_bottom {
            self.scroll_bottom
        } else {
            self.rows - 1
        };
        self.cursor.row = row.saturating_add(n.max(1)).min(limit);
        self.cursor.set_wrap_pending(false);
    }

    /// CUF / HPR
    pub fn cursor_forward(&mut self, n: usize) {
        self.cursor.col = self.cursor.col.saturating_add(n.max(1)).min(self.cols - 1);
        self.cursor.set_wrap_pending(false);
    }

    /// CUB
    pub fn cursor_backward(&mut self, n: usize) {
        self.cursor.col = self.cursor.col.saturating_sub(n.max(1));
        self.cursor.set_wrap_pending(false);
    }

    /// CHA / HPA
    pub fn set_col(&mut self, col: usize) {
        self.cursor.col = col.min(self.cols - 1);
        self.cursor.set_wrap_pending(false);
    }

    /// VPA
    pub fn set_row(&mut self, row: usize) {
        let col = self.cursor.col;
        self.move_absolute(col, row);
    }

    pub fn carriage_return(&mut self) {
        self.cursor.col = 0;
        self.cursor.set_wrap_pending(false);
    }

    pub fn backspace(&mut self) {
        self.cursor_backward(1);
    }

    // ---- tabs ----

    fn reset_tabs(&mut self) {
        let width = self.tab_width;
        self.tabs = (0..self.cols).map(|col| col > 0 && col % width == 0).collect();
    }

    /// HT / CHT
    pub fn tab_forward(&mut self, n: usize) {
        let last = self.cols - 1;
        let mut col = self.cursor.col;
        for _ in 0..n.max(1) {
            if col >= last {
                break;
            }
            col += 1;
            while col < last && !self.tabs[col] {
                col += 1;
            }
        }
        self.cursor.col = col;
        self.cursor.set_wrap_pending(false);
    }

    /// CBT
    pub fn tab_backward(&mut self, n: usize) {
        let mut col = self.cursor.col;
        for _ in 0..n.max(1) {
            if col == 0 {
                break;
            }
            col -= 1;
            while col > 0 && !self.tabs[col] {
                col -= 1;
            }
        }
        self.cursor.col = col;
        self.cursor.set_wrap_pending(false);
    }

    /// HTS
    pub fn set_tab_stop(&mut self) {
        let col = self.cursor.col;
        self.tabs[col] = true;
    }

    /// TBC 0
    pub fn clear_tab_stop(&mut self) {
        let col = self.cursor.col;
        self.tabs[col] = false;
    }

    /// TBC 3
    pub fn clear_all_tab_stops(&mut self) {
        self.tabs.fill(false);
    }

    // ---- modes ----

    /// Set or reset mode bits that need no further bookkeeping
    ///
    /// Origin mode also homes the cursor. The alternate screen bit is owned
    /// by [`Screen::enter_alt_screen`] and is ignored here.
    pub fn set_mode(&mut self, set: bool, mode: TermMode) {
        let mode = mode - TermMode::ALT_SCREEN;
        let old = self.mode;
        self.mode.set(mode, set);

        if mode.contains(TermMode::ORIGIN) {
            self.cursor.set_origin(set);
            self.move_absolute(0, 0);
        }
        if mode.contains(TermMode::REVERSE_VIDEO) && old != self.mode {
            self.mark_all_dirty();
        }
    }

    pub fn set_mouse_mode(&mut self, mode: TermMode, enable: bool) {
        self.mode.set_mouse_mode(mode, enable);
    }

    pub fn set_mouse_encoding(&mut self, mode: TermMode, enable: bool) {
        self.mode.set_mouse_encoding(mode, enable);
    }

    /// Switch to the alternate grid, clearing it first
    pub fn enter_alt_screen(&mut self) {
        if self.is_alt_screen() {
            return;
        }
        let bg = self.cursor.bg();
        for line in &mut self.alternate {
            line.clear(bg);
        }
        self.mode.insert(TermMode::ALT_SCREEN);
        self.view_offset = 0;
        self.mark_all_dirty();
    }

    /// Switch back to the primary grid, which was never touched meanwhile
    pub fn exit_alt_screen(&mut self) {
        if !self.is_alt_screen() {
            return;
        }
        self.mode.remove(TermMode::ALT_SCREEN);
        self.mark_all_dirty();
    }

    /// DECSC for the active screen
    pub fn save_cursor(&mut self) {
        let slot = usize::from(self.is_alt_screen());
        self.saved[slot] = self.cursor.save(self.charsets);
    }

    /// DECRC for the active screen
    pub fn restore_cursor(&mut self) {
        let slot = usize::from(self.is_alt_screen());
        let saved = self.saved[slot];
        self.cursor.restore(&saved, self.cols, self.rows);
        self.charsets = saved.charsets;
    }

    // ---- history view ----

    pub fn view_offset(&self) -> usize {
        self.view_offset
    }

    /// Look further back into scrollback; the alternate screen has none
    pub fn scroll_view_up(&mut self, n: usize) {
        if self.is_alt_screen() {
            return;
        }
        let offset = (self.view_offset + n).min(self.scrollback.len());
        if offset != self.view_offset {
            self.view_offset = offset;
            self.mark_all_dirty();
        }
    }

    pub fn scroll_view_down(&mut self, n: usize) {
        let offset = self.view_offset.saturating_sub(n);
        if offset != self.view_offset {
            self.view_offset = offset;
            self.mark_all_dirty();
        }
    }

    pub fn reset_view(&mut self) {
        if self.view_offset != 0 {
            self.view_offset = 0;
            self.mark_all_dirty();
        }
    }

    /// Row as it should be painted, accounting for the history view
    pub fn view_line(&self, row: usize) -> Option<&Line> {
        if row >= self.rows {
            return None;
        }
        self.line_at(self.view_to_history_row(row))
    }

    pub fn view_glyph(&self, col: usize, row: usize) -> Option<&Glyph> {
        self.view_line(row).and_then(|line| line.get(col))
    }

    /// Map a painted row to history coordinates
    pub fn view_to_history_row(&self, row: usize) -> isize {
        row as isize - self.view_offset as isize
    }

    // ---- geometry and resets ----

    /// Resize both grids
    ///
    /// Columns are truncated or padded. When rows shrink, blank rows below
    /// the cursor are dropped first and then the top rows move into
    /// scrollback; when rows grow, scrollback rows come back on top.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        let cols = cols.max(1);
        let rows = rows.max(1);
        if cols == self.cols && rows == self.rows {
            return;
        }

        let alt = self.is_alt_screen();
        for line in self.primary.iter_mut().chain(self.alternate.iter_mut()) {
            line.resize(cols);
        }
        self.cols = cols;

        // Track the primary cursor row while content moves
        let mut primary_row = if alt {
            self.saved[0].row
        } else {
            self.cursor.row
        };
        let mut alt_row = if alt { self.cursor.row } else { 0 };

        if rows < self.primary.len() {
            let mut excess = self.primary.len() - rows;
            while excess > 0
                && self.primary.len() > primary_row + 1
                && self.primary.last().is_some_and(Line::is_blank)
            {
                self.primary.pop();
                excess -= 1;
            }
            let moved: Vec<Line> = self.primary.drain(..excess).collect();
            for line in moved {
                self.scrollback.push(line);
            }
            primary_row = primary_row.saturating_sub(excess);
        } else {
            while self.primary.len() < rows {
                match self.scrollback.pop_newest() {
                    Some(mut line) => {
                        line.resize(cols);
                        self.primary.insert(0, line);
                        primary_row += 1;
                    }
                    None => self.primary.push(Line::new(cols)),
                }
            }
        }

        if alt_row >= rows {
            let shift = alt_row + 1 - rows;
            self.alternate.drain(..shift.min(self.alternate.len()));
            alt_row -= shift;
        }
        self.alternate.resize_with(rows, || Line::new(cols));
        self.alternate.truncate(rows);

        self.rows = rows;
        self.scroll_top = 0;
        self.scroll_bottom = rows - 1;
        self.view_offset = 0;
        self.dirty = vec![true; rows];

        let old_tabs = std::mem::take(&mut self.tabs);
        self.reset_tabs();
        for (col, stop) in old_tabs.into_iter().enumerate().take(cols) {
            self.tabs[col] = stop;
        }

        if alt {
            self.cursor.move_to(self.cursor.col, alt_row, cols, rows);
            self.saved[0].row = primary_row.min(rows - 1);
        } else {
            self.cursor.move_to(self.cursor.col, primary_row, cols, rows);
        }
        for saved in &mut self.saved {
            saved.col = saved.col.min(cols - 1);
            saved.row = saved.row.min(rows - 1);
        }
        for row in 0..rows {
            self.repair_wide_pairs(row);
        }
    }

    /// DECSTR
    pub fn soft_reset(&mut self) {
        self.mode.insert(TermMode::SHOW_CURSOR | TermMode::LINE_WRAP);
        self.mode.remove(
            TermMode::INSERT | TermMode::ORIGIN | TermMode::APP_CURSOR | TermMode::APP_KEYPAD,
        );
        self.cursor.set_origin(false);
        self.cursor.reset_attributes();
        self.cursor.set_wrap_pending(false);
        self.charsets.reset();
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
        self.saved = [SavedCursor::default(); 2];
    }

    /// RIS: back to power-on state; scrollback and title survive
    pub fn reset(&mut self) {
        self.mode = TermMode::default();
        self.cursor = Cursor::new();
        self.saved = [SavedCursor::default(); 2];
        self.charsets.reset();
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
        self.reset_tabs();
        for line in self.primary.iter_mut().chain(self.alternate.iter_mut()) {
            line.clear(Default::default());
        }
        self.view_offset = 0;
        self.last_rune = None;
        self.mark_all_dirty();
    }

    /// DECALN: fill the screen with `E`
    pub fn decaln(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
        for line in self.grid_mut() {
            line.glyphs_mut().fill(Glyph::new('E'));
        }
        self.move_to(0, 0);
        self.mark_all_dirty();
    }

    /// Active grid as text, one row per line, trailing blanks trimmed
    pub fn text(&self) -> String {
        let mut lines: Vec<String> = self.grid().iter().map(Line::text).collect();
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::Color;
    use proptest::prelude::*;

    fn write(screen: &mut Screen, text: &str) {
        for c in text.chars() {
            screen.put_char(c);
        }
    }

    fn row_text(screen: &Screen, row: usize) -> String {
        screen.line(row).map(Line::text).unwrap_or_default()
    }

    #[test]
    fn test_screen_new() {
        let screen = Screen::new(80, 24, 1000);
        assert_eq!(screen.cols(), 80);
        assert_eq!(screen.rows(), 24);
        assert_eq!((screen.cursor().col, screen.cursor().row), (0, 0));
        assert_eq!(screen.scroll_region(), (0, 23));
        assert!(screen.is_row_dirty(0));
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let screen = Screen::new(0, 0, 10);
        assert_eq!((screen.cols(), screen.rows()), (1, 1));
    }

    #[test]
    fn test_put_char() {
        let mut screen = Screen::new(80, 24, 1000);
        write(&mut screen, "Hi");
        assert_eq!(screen.glyph(0, 0).map(|g| g.rune), Some('H'));
        assert_eq!(screen.glyph(1, 0).map(|g| g.rune), Some('i'));
        assert_eq!(screen.cursor().col, 2);
    }

    #[test]
    fn test_autowrap() {
        let mut screen = Screen::new(5, 3, 1000);
        write(&mut screen, "Hello World");

        assert_eq!(row_text(&screen, 0), "Hello");
        assert_eq!(row_text(&screen, 1), " Worl");
        assert_eq!(row_text(&screen, 2), "d");
        assert!(screen.line(0).is_some_and(Line::is_wrapped));
        assert!(!screen.line(2).is_some_and(Line::is_wrapped));
    }

    #[test]
    fn test_pending_wrap_is_deferred() {
        let mut screen = Screen::new(5, 3, 1000);
        write(&mut screen, "Hello");
        assert_eq!(screen.cursor().col, 4);
        assert!(screen.cursor().wrap_pending());
        assert_eq!(screen.cursor().row, 0);

        // A carriage return cancels the wrap
        screen.carriage_return();
        write(&mut screen, "J");
        assert_eq!(row_text(&screen, 0), "Jello");
    }

    #[test]
    fn test_no_autowrap_overwrites_last_column() {
        let mut screen = Screen::new(5, 2, 1000);
        screen.set_mode(false, TermMode::LINE_WRAP);
        write(&mut screen, "abcdefg");
        assert_eq!(row_text(&screen, 0), "abcdg");
        assert_eq!(screen.cursor().row, 0);
    }

    #[test]
    fn test_wide_char_pairing() {
        let mut screen = Screen::new(10, 2, 1000);
        write(&mut screen, "中a");
        let lead = screen.glyph(0, 0).copied().unwrap_or_default();
        let dummy = screen.glyph(1, 0).copied().unwrap_or_default();
        assert!(lead.is_wide());
        assert!(dummy.is_wide_dummy());
        assert_eq!(screen.cursor().col, 3);
        assert_eq!(row_text(&screen, 0), "中a");
    }

    #[test]
    fn test_wide_char_wraps_at_margin() {
        let mut screen = Screen::new(5, 2, 1000);
        write(&mut screen, "abcd中");
        assert_eq!(row_text(&screen, 0), "abcd");
        assert!(screen.glyph(0, 1).is_some_and(Glyph::is_wide));
        assert!(screen.line(0).is_some_and(Line::is_wrapped));
    }

    #[test]
    fn test_overwrite_half_of_wide_pair() {
        let mut screen = Screen::new(10, 1, 1000);
        write(&mut screen, "中");
        screen.move_to(1, 0);
        write(&mut screen, "x");
        assert_eq!(screen.glyph(0, 0).map(|g| g.rune), Some(' '));
        assert!(!screen.glyph(0, 0).is_some_and(Glyph::is_wide));
        assert_eq!(row_text(&screen, 0), " x");

        screen.move_to(4, 0);
        write(&mut screen, "中");
        screen.move_to(4, 0);
        write(&mut screen, "y");
        assert!(!screen.glyph(5, 0).is_some_and(Glyph::is_wide_dummy));
    }

    #[test]
    fn test_combining_mark_dropped() {
        let mut screen = Screen::new(10, 1, 1000);
        write(&mut screen, "e\u{0301}x");
        assert_eq!(row_text(&screen, 0), "ex");
    }

    #[test]
    fn test_insert_mode() {
        let mut screen = Screen::new(10, 1, 1000);
        write(&mut screen, "world");
        screen.move_to(0, 0);
        screen.set_mode(true, TermMode::INSERT);
        write(&mut screen, "hi ");
        assert_eq!(row_text(&screen, 0), "hi world");
    }

    #[test]
    fn test_linefeed_and_scroll() {
        let mut screen = Screen::new(80, 3, 1000);
        write(&mut screen, "1");
        screen.newline(true);
        write(&mut screen, "2");
        screen.newline(true);
        write(&mut screen, "3");
        screen.newline(true);
        write(&mut screen, "4");

        assert_eq!(row_text(&screen, 0), "2");
        assert_eq!(row_text(&screen, 2), "4");
        assert_eq!(screen.scrollback().len(), 1);
        assert_eq!(screen.scrollback().get(0).map(Line::text), Some("1".to_string()));
        assert_eq!(screen.take_scroll_activity().history, 1);
        assert_eq!(screen.take_scroll_activity().history, 0);
    }

    #[test]
    fn test_alt_screen_has_no_history() {
        let mut screen = Screen::new(10, 2, 1000);
        screen.enter_alt_screen();
        for _ in 0..5 {
            write(&mut screen, "x");
            screen.newline(true);
        }
        assert!(screen.scrollback().is_empty());
    }

    #[test]
    fn test_scroll_region() {
        let mut screen = Screen::new(10, 5, 1000);
        for row in 0..5 {
            screen.move_to(0, row);
            write(&mut screen, &row.to_string());
        }
        screen.set_scroll_region(1, 3);
        assert_eq!((screen.cursor().col, screen.cursor().row), (0, 0));

        screen.move_to(0, 3);
        screen.newline(false);
        assert_eq!(row_text(&screen, 0), "0");
        assert_eq!(row_text(&screen, 1), "2");
        assert_eq!(row_text(&screen, 2), "3");
        assert_eq!(row_text(&screen, 3), "");
        assert_eq!(row_text(&screen, 4), "4");
        assert!(screen.scrollback().is_empty());
        assert_eq!(screen.take_scroll_activity().region, Some((1, 3)));
    }

    #[test]
    fn test_invalid_scroll_region_is_full_screen() {
        let mut screen = Screen::new(10, 5, 1000);
        screen.set_scroll_region(3, 2);
        assert_eq!(screen.scroll_region(), (0, 4));
        screen.set_scroll_region(4, 9);
        assert_eq!(screen.scroll_region(), (0, 4));
    }

    #[test]
    fn test_scroll_region_bottom_clamped() {
        let mut screen = Screen::new(10, 5, 1000);
        screen.set_scroll_region(1, 99);
        assert_eq!(screen.scroll_region(), (1, 4));
        assert_eq!((screen.cursor().col, screen.cursor().row), (0, 0));
    }

    #[test]
    fn test_reverse_index_at_top() {
        let mut screen = Screen::new(10, 3, 1000);
        write(&mut screen, "top");
        screen.move_to(0, 0);
        screen.reverse_index();
        assert_eq!(row_text(&screen, 0), "");
        assert_eq!(row_text(&screen, 1), "top");
    }

    #[test]
    fn test_erase_in_display() {
        let mut screen = Screen::new(10, 3, 1000);
        write(&mut screen, &"X".repeat(30));
        screen.move_to(5, 1);
        screen.erase_in_display(0);
        assert_eq!(row_text(&screen, 0), "XXXXXXXXXX");
        assert_eq!(row_text(&screen, 1), "XXXXX");
        assert_eq!(row_text(&screen, 2), "");

        screen.erase_in_display(1);
        assert_eq!(row_text(&screen, 0), "");
        assert_eq!(row_text(&screen, 1), "");
    }

    #[test]
    fn test_erase_uses_cursor_background() {
        let mut screen = Screen::new(10, 1, 1000);
        screen.cursor_mut().template.bg = Color::BLUE;
        screen.erase_in_line(2);
        assert_eq!(screen.glyph(3, 0).map(|g| g.bg), Some(Color::BLUE));
    }

    #[test]
    fn test_erase_in_line() {
        let mut screen = Screen::new(10, 1, 1000);
        write(&mut screen, "ABCDEFGHIJ");
        screen.move_to(5, 0);
        screen.erase_in_line(0);
        assert_eq!(row_text(&screen, 0), "ABCDE");
        screen.move_to(1, 0);
        screen.erase_in_line(1);
        assert_eq!(row_text(&screen, 0), "  CDE");
    }

    #[test]
    fn test_erase_scrollback() {
        let mut screen = Screen::new(10, 2, 1000);
        for _ in 0..5 {
            write(&mut screen, "x");
            screen.newline(true);
        }
        assert!(!screen.scrollback().is_empty());
        screen.erase_in_display(3);
        assert!(screen.scrollback().is_empty());
    }

    #[test]
    fn test_clear_region_normalizes_and_clamps() {
        let mut screen = Screen::new(5, 3, 1000);
        write(&mut screen, &"X".repeat(15));
        screen.clear_region(100, 100, 3, 1);
        assert_eq!(row_text(&screen, 0), "XXXXX");
        assert_eq!(row_text(&screen, 1), "XXX");
        assert_eq!(row_text(&screen, 2), "XXX");
    }

    #[test]
    fn test_insert_delete_lines() {
        let mut screen = Screen::new(10, 4, 1000);
        for row in 0..4 {
            screen.move_to(0, row);
            write(&mut screen, &format!("L{row}"));
        }
        screen.move_to(3, 1);
        screen.insert_lines(1);
        assert_eq!(screen.cursor().col, 0);
        assert_eq!(row_text(&screen, 1), "");
        assert_eq!(row_text(&screen, 2), "L1");
        assert_eq!(row_text(&screen, 3), "L2");

        screen.delete_lines(2);
        assert_eq!(row_text(&screen, 1), "L2");
        assert_eq!(row_text(&screen, 2), "");
        assert!(screen.scrollback().is_empty());
    }

    #[test]
    fn test_delete_lines_at_top_skips_history() {
        let mut screen = Screen::new(10, 3, 1000);
        write(&mut screen, "gone");
        screen.delete_lines(1);
        assert!(screen.scrollback().is_empty());
        assert_eq!(row_text(&screen, 0), "");
    }

    #[test]
    fn test_insert_delete_chars() {
        let mut screen = Screen::new(10, 1, 1000);
        write(&mut screen, "ABCDEF");
        screen.move_to(2, 0);
        screen.insert_blank(2);
        assert_eq!(row_text(&screen, 0), "AB  CDEF");
        screen.delete_chars(3);
        assert_eq!(row_text(&screen, 0), "ABDEF");
        screen.erase_chars(2);
        assert_eq!(row_text(&screen, 0), "AB  F");
    }

    #[test]
    fn test_repeat_last() {
        let mut screen = Screen::new(10, 1, 1000);
        write(&mut screen, "a");
        screen.repeat_last(3);
        assert_eq!(row_text(&screen, 0), "aaaa");
    }

    #[test]
    fn test_alternate_screen_round_trip() {
        let mut screen = Screen::new(10, 3, 1000);
        write(&mut screen, "primary");
        let before: Vec<Line> = (0..3).filter_map(|r| screen.line(r).cloned()).collect();

        screen.enter_alt_screen();
        assert!(screen.is_alt_screen());
        assert_eq!(row_text(&screen, 0), "");
        write(&mut screen, "alternate");
        screen.erase_in_display(2);
        write(&mut screen, "more");

        screen.exit_alt_screen();
        let after: Vec<Line> = (0..3).filter_map(|r| screen.line(r).cloned()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_origin_mode() {
        let mut screen = Screen::new(10, 10, 1000);
        screen.set_scroll_region(2, 5);
        screen.set_mode(true, TermMode::ORIGIN);
        assert_eq!(screen.cursor().row, 2);
        screen.move_absolute(0, 100);
        assert_eq!(screen.cursor().row, 5);
        screen.set_mode(false, TermMode::ORIGIN);
        screen.move_absolute(0, 100);
        assert_eq!(screen.cursor().row, 9);
    }

    #[test]
    fn test_relative_moves_respect_region() {
        let mut screen = Screen::new(10, 10, 1000);
        screen.set_scroll_region(2, 5);
        screen.move_to(0, 4);
        screen.cursor_up(10);
        assert_eq!(screen.cursor().row, 2);
        screen.cursor_down(10);
        assert_eq!(screen.cursor().row, 5);
        screen.move_to(0, 7);
        screen.cursor_down(10);
        assert_eq!(screen.cursor().row, 9);
        screen.cursor_forward(100);
        assert_eq!(screen.cursor().col, 9);
        screen.cursor_backward(100);
        assert_eq!(screen.cursor().col, 0);
    }

    #[test]
    fn test_tab_stops() {
        let mut screen = Screen::new(20, 1, 1000);
        screen.tab_forward(1);
        assert_eq!(screen.cursor().col, 8);
        screen.tab_forward(1);
        assert_eq!(screen.cursor().col, 16);
        screen.tab_forward(1);
        assert_eq!(screen.cursor().col, 19);
        screen.tab_backward(1);
        assert_eq!(screen.cursor().col, 16);

        screen.move_to(3, 0);
        screen.set_tab_stop();
        screen.move_to(0, 0);
        screen.tab_forward(1);
        assert_eq!(screen.cursor().col, 3);

        screen.clear_all_tab_stops();
        screen.move_to(0, 0);
        screen.tab_forward(1);
        assert_eq!(screen.cursor().col, 19);
    }

    #[test]
    fn test_custom_tab_width() {
        let mut screen = Screen::new(20, 1, 1000).with_tab_width(4);
        screen.tab_forward(2);
        assert_eq!(screen.cursor().col, 8);
    }

    #[test]
    fn test_save_restore_cursor() {
        let mut screen = Screen::new(80, 24, 1000);
        screen.move_to(10, 5);
        screen.cursor_mut().template.flags |= GlyphFlags::BOLD;
        screen.charsets_mut().designate(0, crate::core::charset::Charset::DecSpecialGraphics);
        screen.save_cursor();

        screen.move_to(0, 0);
        screen.cursor_mut().reset_attributes();
        screen.charsets_mut().reset();

        screen.restore_cursor();
        assert_eq!((screen.cursor().col, screen.cursor().row), (10, 5));
        assert!(screen.cursor().template.flags.contains(GlyphFlags::BOLD));
        write(&mut screen, "q");
        assert_eq!(screen.glyph(10, 5).map(|g| g.rune), Some('─'));
    }

    #[test]
    fn test_resize_shrink_pushes_to_history() {
        let mut screen = Screen::new(10, 5, 1000);
        for row in 0..5 {
            screen.move_to(0, row);
            write(&mut screen, &format!("r{row}"));
        }
        screen.resize(10, 3);
        assert_eq!(screen.rows(), 3);
        assert_eq!(screen.scrollback().len(), 2);
        assert_eq!(row_text(&screen, 0), "r2");
        assert_eq!(screen.cursor().row, 2);
    }

    #[test]
    fn test_resize_shrink_drops_blank_rows_below_cursor() {
        let mut screen = Screen::new(10, 5, 1000);
        write(&mut screen, "only");
        screen.resize(10, 2);
        assert!(screen.scrollback().is_empty());
        assert_eq!(row_text(&screen, 0), "only");
        assert_eq!(screen.cursor().row, 0);
    }

    #[test]
    fn test_resize_grow_pulls_from_history() {
        let mut screen = Screen::new(10, 3, 1000);
        for i in 0..5 {
            write(&mut screen, &format!("l{i}"));
            if i < 4 {
                screen.newline(true);
            }
        }
        assert_eq!(screen.scrollback().len(), 2);
        assert_eq!(screen.cursor().row, 2);

        screen.resize(10, 5);
        assert!(screen.scrollback().is_empty());
        assert_eq!(row_text(&screen, 0), "l0");
        assert_eq!(row_text(&screen, 4), "l4");
        assert_eq!(screen.cursor().row, 4);
    }

    #[test]
    fn test_resize_columns() {
        let mut screen = Screen::new(10, 2, 1000);
        write(&mut screen, "abcdefghij");
        screen.resize(4, 2);
        assert_eq!(row_text(&screen, 0), "abcd");
        assert!(screen.cursor().col < 4);
        screen.resize(8, 2);
        assert_eq!(row_text(&screen, 0), "abcd");
        assert_eq!(screen.dirty_rows(), vec![0, 1]);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut screen = Screen::new(10, 3, 1000);
        screen.mark_clean();
        assert!(screen.dirty_rows().is_empty());
        screen.move_to(0, 1);
        write(&mut screen, "x");
        assert_eq!(screen.dirty_rows(), vec![1]);
        screen.mark_row_clean(1);
        assert!(!screen.is_row_dirty(1));
    }

    #[test]
    fn test_view_offset() {
        let mut screen = Screen::new(10, 2, 1000);
        for i in 0..4 {
            write(&mut screen, &format!("{i}"));
            screen.newline(true);
        }
        // History: 0 1 2, screen: 3 and a blank row
        assert_eq!(screen.history_len(), 3);
        screen.scroll_view_up(1);
        assert_eq!(screen.view_line(0).map(Line::text), Some("2".to_string()));
        assert_eq!(screen.view_line(1).map(Line::text), Some("3".to_string()));

        // New history keeps the view anchored
        write(&mut screen, "4");
        screen.newline(true);
        assert_eq!(screen.view_offset(), 2);
        assert_eq!(screen.view_line(0).map(Line::text), Some("2".to_string()));

        screen.scroll_view_up(100);
        assert_eq!(screen.view_offset(), 4);
        screen.reset_view();
        assert_eq!(screen.view_offset(), 0);
    }

    #[test]
    fn test_line_at_history_coordinates() {
        let mut screen = Screen::new(10, 2, 1000);
        write(&mut screen, "a");
        screen.newline(true);
        write(&mut screen, "b");
        screen.newline(true);
        write(&mut screen, "c");
        assert_eq!(screen.line_at(-1).map(Line::text), Some("a".to_string()));
        assert_eq!(screen.line_at(0).map(Line::text), Some("b".to_string()));
        assert!(screen.line_at(-2).is_none());
    }

    #[test]
    fn test_decaln() {
        let mut screen = Screen::new(3, 2, 1000);
        screen.decaln();
        assert_eq!(screen.text(), "EEE\nEEE");
    }

    #[test]
    fn test_reset() {
        let mut screen = Screen::new(10, 3, 1000);
        write(&mut screen, "text");
        screen.set_mode(true, TermMode::INSERT);
        screen.reset();
        assert_eq!(screen.text(), "");
        assert_eq!(screen.mode(), TermMode::default());
        assert_eq!(screen.cursor().col, 0);
    }

    proptest! {
        #[test]
        fn prop_cursor_stays_on_screen(
            cols in 1usize..40,
            rows in 1usize..20,
            ops in proptest::collection::vec((0u8..12, 0usize..100), 0..64),
        ) {
            let mut screen = Screen::new(cols, rows, 100);
            for (op, n) in ops {
                match op {
                    0 => screen.move_to(n, n),
                    1 => screen.cursor_up(n),
                    2 => screen.cursor_down(n),
                    3 => screen.cursor_forward(n),
                    4 => screen.cursor_backward(n),
                    5 => screen.put_char('中'),
                    6 => screen.put_char('x'),
                    7 => screen.newline(n % 2 == 0),
                    8 => screen.insert_lines(n),
                    9 => screen.delete_chars(n),
                    10 => screen.resize(1 + n % 40, 1 + n % 20),
                    _ => screen.tab_forward(n),
                }
                prop_assert!(screen.cursor().col < screen.cols());
                prop_assert!(screen.cursor().row < screen.rows());
            }
        }

        #[test]
        fn prop_grow_resize_conserves_lines(extra in 0usize..10, written in 0usize..20) {
            let mut screen = Screen::new(10, 4, 1000);
            for i in 0..written {
                screen.put_char(char::from(b'a' + (i % 26) as u8));
                screen.newline(true);
            }
            let total = screen.history_len() + screen.rows();
            screen.resize(10, 4 + extra);
            prop_assert_eq!(screen.history_len() + screen.rows(), total.max(4 + extra));
        }
    }
}
