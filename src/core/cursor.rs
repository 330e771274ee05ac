//! Cursor state
//!
//! The cursor carries its position, the template glyph new runes are
//! written with, and the wrap-pending / origin-mode state bits. DECSC and
//! DECRC copy all of that (plus the charset designations) into a
//! [`SavedCursor`].

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::cell::{Glyph, GlyphFlags};
use super::charset::CharsetState;
use super::color::Color;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CursorState: u8 {
        /// The last write landed on the right margin; the next one wraps first
        const WRAP_NEXT = 1 << 0;
        /// DECOM: rows are addressed relative to the scroll region
        const ORIGIN    = 1 << 1;
    }
}

/// Cursor shape requested with DECSCUSR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorShape {
    #[default]
    Block,
    Underline,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    pub col: usize,
    pub row: usize,
    /// Attributes and colors applied to newly written runes
    pub template: Glyph,
    pub state: CursorState,
    pub shape: CursorShape,
    pub blinking: bool,
}

/// DECSC slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SavedCursor {
    pub col: usize,
    pub row: usize,
    pub template: Glyph,
    pub origin: bool,
    pub charsets: CharsetState,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to an absolute cell, clamped to a `cols` x `rows` grid
    pub fn move_to(&mut self, col: usize, row: usize, cols: usize, rows: usize) {
        self.col = col.min(cols.saturating_sub(1));
        self.row = row.min(rows.saturating_sub(1));
        self.state.remove(CursorState::WRAP_NEXT);
    }

    pub fn wrap_pending(&self) -> bool {
        self.state.contains(CursorState::WRAP_NEXT)
    }

    pub fn set_wrap_pending(&mut self, pending: bool) {
        self.state.set(CursorState::WRAP_NEXT, pending);
    }

    pub fn origin(&self) -> bool {
        self.state.contains(CursorState::ORIGIN)
    }

    pub fn set_origin(&mut self, origin: bool) {
        self.state.set(CursorState::ORIGIN, origin);
    }

    pub fn fg(&self) -> Color {
        self.template.fg
    }

    pub fn bg(&self) -> Color {
        self.template.bg
    }

    /// SGR 0: drop every rendition and color
    pub fn reset_attributes(&mut self) {
        self.template.flags.remove(GlyphFlags::RENDITION);
        self.template.fg = Color::Default;
        self.template.bg = Color::Default;
    }

    pub fn save(&self, charsets: CharsetState) -> SavedCursor {
        SavedCursor {
            col: self.col,
            row: self.row,
            template: self.template,
            origin: self.origin(),
            charsets,
        }
    }

    /// Restore a saved slot, clamping the position to the current grid
    pub fn restore(&mut self, saved: &SavedCursor, cols: usize, rows: usize) {
        self.template = saved.template;
        self.set_origin(saved.origin);
        self.move_to(saved.col, saved.row, cols, rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cursor_default() {
        let cursor = Cursor::new();
        assert_eq!((cursor.col, cursor.row), (0, 0));
        assert!(!cursor.wrap_pending());
        assert!(!cursor.origin());
        assert_eq!(cursor.template, Glyph::default());
    }

    #[test]
    fn test_move_clears_wrap_pending() {
        let mut cursor = Cursor::new();
        cursor.set_wrap_pending(true);
        cursor.move_to(3, 3, 80, 24);
        assert!(!cursor.wrap_pending());
    }

    #[test]
    fn test_reset_attributes_keeps_layout_flags() {
        let mut cursor = Cursor::new();
        cursor.template.flags = GlyphFlags::BOLD | GlyphFlags::WRAP;
        cursor.template.fg = Color::RED;
        cursor.reset_attributes();
        assert_eq!(cursor.template.flags, GlyphFlags::WRAP);
        assert_eq!(cursor.fg(), Color::Default);
    }

    #[test]
    fn test_save_restore() {
        let mut cursor = Cursor::new();
        cursor.move_to(10, 5, 80, 24);
        cursor.template.flags |= GlyphFlags::BOLD;
        cursor.set_origin(true);
        let saved = cursor.save(CharsetState::default());

        cursor.move_to(0, 0, 80, 24);
        cursor.reset_attributes();
        cursor.set_origin(false);

        cursor.restore(&saved, 80, 24);
        assert_eq!((cursor.col, cursor.row), (10, 5));
        assert!(cursor.template.flags.contains(GlyphFlags::BOLD));
        assert!(cursor.origin());
    }

    #[test]
    fn test_restore_clamps() {
        let mut cursor = Cursor::new();
        cursor.move_to(70, 20, 80, 24);
        let saved = cursor.save(CharsetState::default());
        cursor.restore(&saved, 40, 10);
        assert_eq!((cursor.col, cursor.row), (39, 9));
    }

    proptest! {
        #[test]
        fn prop_move_to_stays_in_bounds(
            col in 0usize..1000,
            row in 0usize..1000,
            cols in 1usize..300,
            rows in 1usize..200,
        ) {
            let mut cursor = Cursor::new();
            cursor.move_to(col, row, cols, rows);
            prop_assert!(cursor.col < cols);
            prop_assert!(cursor.row < rows);
        }
    }
}
