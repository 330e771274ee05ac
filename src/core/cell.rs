//! Screen Glyph
//!
//! A single cell of the terminal grid: one rune plus the attributes and
//! colors it was written with.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

use super::color::Color;

bitflags! {
    /// Rendition and layout attributes of a glyph
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct GlyphFlags: u16 {
        const BOLD       = 1 << 0;
        const FAINT      = 1 << 1;
        const ITALIC     = 1 << 2;
        const UNDERLINE  = 1 << 3;
        const BLINK      = 1 << 4;
        const REVERSE    = 1 << 5;
        const INVISIBLE  = 1 << 6;
        const STRUCK     = 1 << 7;
        /// Last cell of a row that soft-wrapped into the next one
        const WRAP       = 1 << 8;
        /// First cell of a double-width rune
        const WIDE       = 1 << 9;
        /// Placeholder cell following a `WIDE` glyph
        const WIDE_DUMMY = 1 << 10;

        /// Attributes that SGR controls
        const RENDITION = Self::BOLD.bits()
            | Self::FAINT.bits()
            | Self::ITALIC.bits()
            | Self::UNDERLINE.bits()
            | Self::BLINK.bits()
            | Self::REVERSE.bits()
            | Self::INVISIBLE.bits()
            | Self::STRUCK.bits();
    }
}

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    pub rune: char,
    pub flags: GlyphFlags,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Glyph {
    fn default() -> Self {
        Self {
            rune: ' ',
            flags: GlyphFlags::empty(),
            fg: Color::Default,
            bg: Color::Default,
        }
    }
}

impl Glyph {
    pub fn new(rune: char) -> Self {
        Self {
            rune,
            ..Default::default()
        }
    }

    /// A blank cell carrying only a background color, as erase operations produce
    pub fn blank(bg: Color) -> Self {
        Self {
            bg,
            ..Default::default()
        }
    }

    /// Blank with no attributes (a space or the placeholder of a wide rune)
    pub fn is_blank(&self) -> bool {
        (self.rune == ' ' || self.is_wide_dummy())
            && !self.flags.intersects(GlyphFlags::RENDITION)
            && self.bg.is_default()
    }

    /// Holds no visible rune; attributes are ignored
    pub fn is_empty(&self) -> bool {
        self.rune == ' ' || self.is_wide_dummy()
    }

    pub fn is_wide(&self) -> bool {
        self.flags.contains(GlyphFlags::WIDE)
    }

    pub fn is_wide_dummy(&self) -> bool {
        self.flags.contains(GlyphFlags::WIDE_DUMMY)
    }

    pub fn is_wrapped(&self) -> bool {
        self.flags.contains(GlyphFlags::WRAP)
    }

    /// Columns this glyph occupies on screen
    pub fn width(&self) -> usize {
        if self.is_wide_dummy() {
            0
        } else if self.is_wide() {
            2
        } else {
            1
        }
    }

    /// Reset to a blank with the given background
    pub fn erase(&mut self, bg: Color) {
        *self = Self::blank(bg);
    }
}

/// Display width of a rune in terminal columns
///
/// Control characters report 0; everything else follows the East Asian
/// width tables.
pub fn rune_width(rune: char) -> usize {
    rune.width().unwrap_or(0)
}
