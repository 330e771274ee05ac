//! Deterministic snapshots
//!
//! A snapshot captures the live grid, cursor and modes in a serializable
//! form. Feeding the same byte stream into a fresh emulator always yields
//! the same snapshot, which is what the golden tests and the headless
//! runner rely on.

use serde::{Deserialize, Serialize};

use super::cell::{Glyph, GlyphFlags};
use super::color::Color;
use super::cursor::CursorShape;
use super::modes::{MouseEncoding, MouseMode, TermMode};
use super::screen::Screen;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub cols: usize,
    pub rows: usize,
    /// Live grid, row-major
    pub grid: Vec<Vec<GlyphSnapshot>>,
    pub cursor: CursorSnapshot,
    pub scroll_top: usize,
    pub scroll_bottom: usize,
    pub modes: ModesSnapshot,
    pub title: String,
    pub alternate_screen: bool,
    pub scrollback_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphSnapshot {
    pub rune: char,
    #[serde(default, skip_serializing_if = "Color::is_default")]
    pub fg: Color,
    #[serde(default, skip_serializing_if = "Color::is_default")]
    pub bg: Color,
    #[serde(default, skip_serializing_if = "StyleSnapshot::is_plain")]
    pub style: StyleSnapshot,
    /// 0 for the placeholder of a wide rune, 2 for its lead
    pub width: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub faint: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub blink: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub invisible: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub struck: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub wrapped: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl StyleSnapshot {
    fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub col: usize,
    pub row: usize,
    pub visible: bool,
    pub shape: String,
    pub wrap_pending: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModesSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub application_cursor: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub application_keypad: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bracketed_paste: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub focus_reporting: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub insert: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub origin: bool,
    pub autowrap: bool,
    pub mouse_tracking: String,
    pub mouse_encoding: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub linefeed_mode: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse_video: bool,
}

impl From<&Glyph> for StyleSnapshot {
    fn from(glyph: &Glyph) -> Self {
        let flags = glyph.flags;
        StyleSnapshot {
            bold: flags.contains(GlyphFlags::BOLD),
            faint: flags.contains(GlyphFlags::FAINT),
            italic: flags.contains(GlyphFlags::ITALIC),
            underline: flags.contains(GlyphFlags::UNDERLINE),
            blink: flags.contains(GlyphFlags::BLINK),
            reverse: flags.contains(GlyphFlags::REVERSE),
            invisible: flags.contains(GlyphFlags::INVISIBLE),
            struck: flags.contains(GlyphFlags::STRUCK),
            wrapped: flags.contains(GlyphFlags::WRAP),
        }
    }
}

impl From<&Glyph> for GlyphSnapshot {
    fn from(glyph: &Glyph) -> Self {
        GlyphSnapshot {
            rune: glyph.rune,
            fg: glyph.fg,
            bg: glyph.bg,
            style: StyleSnapshot::from(glyph),
            width: glyph.width() as u8,
        }
    }
}

impl From<TermMode> for ModesSnapshot {
    fn from(mode: TermMode) -> Self {
        ModesSnapshot {
            application_cursor: mode.contains(TermMode::APP_CURSOR),
            application_keypad: mode.contains(TermMode::APP_KEYPAD),
            bracketed_paste: mode.contains(TermMode::BRACKETED_PASTE),
            focus_reporting: mode.contains(TermMode::FOCUS_IN_OUT),
            insert: mode.contains(TermMode::INSERT),
            origin: mode.contains(TermMode::ORIGIN),
            autowrap: mode.contains(TermMode::LINE_WRAP),
            mouse_tracking: match mode.mouse_mode() {
                MouseMode::None => "none",
                MouseMode::X10 => "x10",
                MouseMode::Normal => "normal",
                MouseMode::ButtonMotion => "button_event",
                MouseMode::AnyMotion => "any_event",
            }
            .to_string(),
            mouse_encoding: match mode.mouse_encoding() {
                MouseEncoding::X10 => "x10",
                MouseEncoding::Utf8 => "utf8",
                MouseEncoding::Sgr => "sgr",
                MouseEncoding::Urxvt => "urxvt",
            }
            .to_string(),
            linefeed_mode: mode.contains(TermMode::LINE_FEED_NEW_LINE),
            reverse_video: mode.contains(TermMode::REVERSE_VIDEO),
        }
    }
}

impl Snapshot {
    pub fn from_screen(screen: &Screen) -> Self {
        let grid = (0..screen.rows())
            .map(|row| {
                (0..screen.cols())
                    .map(|col| {
                        screen
                            .glyph(col, row)
                            .map(GlyphSnapshot::from)
                            .unwrap_or_else(|| GlyphSnapshot::from(&Glyph::default()))
                    })
                    .collect()
            })
            .collect();

        let cursor = screen.cursor();
        let mode = screen.mode();
        let (scroll_top, scroll_bottom) = screen.scroll_region();

        Snapshot {
            cols: screen.cols(),
            rows: screen.rows(),
            grid,
            cursor: CursorSnapshot {
                col: cursor.col,
                row: cursor.row,
                visible: mode.contains(TermMode::SHOW_CURSOR),
                shape: match cursor.shape {
                    CursorShape::Block => "block",
                    CursorShape::Underline => "underline",
                    CursorShape::Bar => "bar",
                }
                .to_string(),
                wrap_pending: cursor.wrap_pending(),
            },
            scroll_top,
            scroll_bottom,
            modes: ModesSnapshot::from(mode),
            title: screen.title().to_string(),
            alternate_screen: screen.is_alt_screen(),
            scrollback_lines: screen.history_len(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text of the grid: trailing blanks and blank trailing rows trimmed
    pub fn to_text(&self) -> String {
        let mut lines: Vec<String> = self
            .grid
            .iter()
            .map(|row| {
                let line: String = row
                    .iter()
                    .filter(|glyph| glyph.width != 0)
                    .map(|glyph| glyph.rune)
                    .collect();
                line.trim_end_matches(' ').to_string()
            })
            .collect();
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Same dimensions and cells; cursor and modes are ignored
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.cols == other.cols && self.rows == other.rows && self.grid == other.grid
    }
}
