//! Grid rows and the scrollback ring
//!
//! Rows that scroll off the top of the primary screen are pushed into a
//! bounded FIFO. Once it is full the oldest row is dropped for every new
//! one, so memory stays at `capacity` rows no matter how long the session
//! runs.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::cell::{Glyph, GlyphFlags};
use super::color::Color;

/// One row of glyphs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    glyphs: Vec<Glyph>,
}

impl Line {
    pub fn new(cols: usize) -> Self {
        Self::blank(cols, Color::Default)
    }

    /// A row of blanks with the given background
    pub fn blank(cols: usize, bg: Color) -> Self {
        Self {
            glyphs: vec![Glyph::blank(bg); cols],
        }
    }

    pub fn from_glyphs(glyphs: Vec<Glyph>) -> Self {
        Self { glyphs }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn get(&self, col: usize) -> Option<&Glyph> {
        self.glyphs.get(col)
    }

    pub fn get_mut(&mut self, col: usize) -> Option<&mut Glyph> {
        self.glyphs.get_mut(col)
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn glyphs_mut(&mut self) -> &mut [Glyph] {
        &mut self.glyphs
    }

    /// The row continues on the next one (soft wrap)
    pub fn is_wrapped(&self) -> bool {
        self.glyphs.last().is_some_and(Glyph::is_wrapped)
    }

    pub fn set_wrapped(&mut self, wrapped: bool) {
        if let Some(last) = self.glyphs.last_mut() {
            last.flags.set(GlyphFlags::WRAP, wrapped);
        }
    }

    /// Fill every cell with a blank of the given background
    pub fn clear(&mut self, bg: Color) {
        self.glyphs.fill(Glyph::blank(bg));
    }

    /// No visible content and no attributes anywhere in the row
    pub fn is_blank(&self) -> bool {
        self.glyphs.iter().all(Glyph::is_blank)
    }

    /// Number of columns up to and including the last non-space rune
    pub fn content_len(&self) -> usize {
        self.glyphs
            .iter()
            .rposition(|g| !g.is_empty())
            .map_or(0, |i| i + 1)
    }

    /// Truncate or pad to `cols`
    ///
    /// A wide rune whose placeholder would be cut off is blanked, and the
    /// new last cell never keeps a stale `WRAP` mark.
    pub fn resize(&mut self, cols: usize) {
        let old = self.glyphs.len();
        if cols < old {
            let wrapped = self.is_wrapped();
            self.glyphs.truncate(cols);
            if let Some(last) = self.glyphs.last_mut() {
                if last.is_wide() {
                    last.erase(last.bg);
                }
                last.flags.set(GlyphFlags::WRAP, wrapped);
            }
        } else if cols > old {
            // The wrap mark belongs on the last cell
            let wrapped = self.is_wrapped();
            if let Some(last) = self.glyphs.last_mut() {
                last.flags.remove(GlyphFlags::WRAP);
            }
            self.glyphs.resize(cols, Glyph::default());
            self.set_wrapped(wrapped);
        }
    }

    /// Row text with wide placeholders skipped and trailing blanks trimmed
    pub fn text(&self) -> String {
        let mut text: String = self
            .glyphs
            .iter()
            .filter(|g| !g.is_wide_dummy())
            .map(|g| g.rune)
            .collect();
        text.truncate(text.trim_end_matches(' ').len());
        text
    }
}

impl std::ops::Index<usize> for Line {
    type Output = Glyph;

    fn index(&self, col: usize) -> &Glyph {
        &self.glyphs[col]
    }
}

impl std::ops::IndexMut<usize> for Line {
    fn index_mut(&mut self, col: usize) -> &mut Glyph {
        &mut self.glyphs[col]
    }
}

/// Bounded FIFO of rows that scrolled off the primary screen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scrollback {
    lines: VecDeque<Line>,
    capacity: usize,
}

impl Scrollback {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append the newest row, evicting the oldest when full
    ///
    /// Returns true if a row was evicted.
    pub fn push(&mut self, line: Line) -> bool {
        if self.capacity == 0 {
            return true;
        }
        let evicted = self.lines.len() >= self.capacity;
        if evicted {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        evicted
    }

    /// Remove and return the newest row (used when the screen grows)
    pub fn pop_newest(&mut self) -> Option<Line> {
        self.lines.pop_back()
    }

    /// Row by age, 0 = oldest
    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Row counted back from the newest, 0 = most recent
    pub fn get_from_end(&self, index: usize) -> Option<&Line> {
        let len = self.lines.len();
        if index >= len {
            return None;
        }
        self.lines.get(len - 1 - index)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Line> + ExactSizeIterator {
        self.lines.iter()
    }

    /// Change the capacity, keeping the most recent rows
    pub fn set_capacity(&mut self, capacity: usize) {
        while self.lines.len() > capacity {
            self.lines.pop_front();
        }
        self.capacity = capacity;
    }
}
