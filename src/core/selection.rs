//! Text selection
//!
//! Selections are kept in history coordinates: row 0 is the top of the live
//! grid and negative rows reach back into scrollback. The original anchors
//! (`ob`, `oe`) are what the mouse touched; the normalized bounds (`nb`,
//! `ne`) are ordered and expanded by word/line snapping, and are what
//! hit-testing and text extraction use.

use serde::{Deserialize, Serialize};

use super::cell::Glyph;
use super::scrollback::Line;
use super::screen::Screen;

/// Characters that end a word on double-click, besides whitespace
pub const DEFAULT_WORD_DELIMITERS: &str = "`'\"()[]{}<>|;,:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionPoint {
    pub col: usize,
    /// History row; negative rows are scrollback
    pub row: isize,
}

impl SelectionPoint {
    pub fn new(col: usize, row: isize) -> Self {
        Self { col, row }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Nothing selected
    #[default]
    Idle,
    /// Button pressed, nothing dragged yet
    Empty,
    /// Complete selection
    Ready,
    /// Drag in progress
    Selecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionKind {
    /// Reading-order stream of cells
    #[default]
    Regular,
    /// Column block
    Rectangular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionSnap {
    #[default]
    None,
    /// Double click
    Word,
    /// Triple click
    Line,
}

impl SelectionSnap {
    /// Snap for a click count (1, 2, 3, then cycling)
    pub fn from_click_count(clicks: u32) -> Self {
        match clicks % 3 {
            2 => SelectionSnap::Word,
            0 if clicks > 0 => SelectionSnap::Line,
            _ => SelectionSnap::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    mode: SelectionMode,
    kind: SelectionKind,
    snap: SelectionSnap,
    ob: SelectionPoint,
    oe: SelectionPoint,
    nb: SelectionPoint,
    ne: SelectionPoint,
    /// Started on the alternate screen
    alt: bool,
    word_delimiters: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(DEFAULT_WORD_DELIMITERS)
    }
}

impl Selection {
    pub fn new(word_delimiters: impl Into<String>) -> Self {
        Self {
            mode: SelectionMode::Idle,
            kind: SelectionKind::Regular,
            snap: SelectionSnap::None,
            ob: SelectionPoint::default(),
            oe: SelectionPoint::default(),
            nb: SelectionPoint::default(),
            ne: SelectionPoint::default(),
            alt: false,
            word_delimiters: word_delimiters.into(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    pub fn snap(&self) -> SelectionSnap {
        self.snap
    }

    /// Something is selected or being selected
    pub fn is_active(&self) -> bool {
        matches!(self.mode, SelectionMode::Ready | SelectionMode::Selecting)
    }

    /// Normalized bounds while a selection is shown
    pub fn bounds(&self) -> Option<(SelectionPoint, SelectionPoint)> {
        self.is_active().then_some((self.nb, self.ne))
    }

    pub fn clear(&mut self) {
        self.mode = SelectionMode::Idle;
    }

    /// Begin a selection at a mouse press
    ///
    /// With word or line snap the selection is complete immediately.
    pub fn start(&mut self, col: usize, row: isize, snap: SelectionSnap, screen: &Screen) {
        let point = clamp_point(col, row, screen);
        self.mode = SelectionMode::Empty;
        self.kind = SelectionKind::Regular;
        self.snap = snap;
        self.alt = screen.is_alt_screen();
        self.ob = point;
        self.oe = point;
        self.normalize(screen);
        if snap != SelectionSnap::None {
            self.mode = SelectionMode::Ready;
        }
    }

    /// Move the free end of the selection; `done` on button release
    ///
    /// Releasing without ever dragging clears the selection.
    pub fn extend(
        &mut self,
        col: usize,
        row: isize,
        kind: SelectionKind,
        done: bool,
        screen: &Screen,
    ) {
        if self.mode == SelectionMode::Idle {
            return;
        }
        if done && self.mode == SelectionMode::Empty && self.snap == SelectionSnap::None {
            let point = clamp_point(col, row, screen);
            if point == self.ob {
                self.clear();
                return;
            }
        }
        self.oe = clamp_point(col, row, screen);
        self.kind = kind;
        self.normalize(screen);
        self.mode = if done {
            SelectionMode::Ready
        } else {
            SelectionMode::Selecting
        };
    }

    fn normalize(&mut self, screen: &Screen) {
        let (ob, oe) = (self.ob, self.oe);
        if self.kind == SelectionKind::Regular && ob.row != oe.row {
            let (first, last) = if ob.row < oe.row { (ob, oe) } else { (oe, ob) };
            self.nb.col = first.col;
            self.ne.col = last.col;
        } else {
            self.nb.col = ob.col.min(oe.col);
            self.ne.col = ob.col.max(oe.col);
        }
        self.nb.row = ob.row.min(oe.row);
        self.ne.row = ob.row.max(oe.row);

        self.nb = self.snap_point(self.nb, Direction::Backward, screen);
        self.ne = self.snap_point(self.ne, Direction::Forward, screen);

        if self.kind == SelectionKind::Rectangular {
            return;
        }
        // Past the end of a row's content means "to the end of the row"
        let begin_len = line_len(screen.line_at(self.nb.row));
        if begin_len < self.nb.col {
            self.nb.col = begin_len;
        }
        if let Some(line) = screen.line_at(self.ne.row) {
            if line_len(Some(line)) <= self.ne.col {
                self.ne.col = line.len().saturating_sub(1);
            }
        }
    }

    fn is_delimiter(&self, glyph: &Glyph) -> bool {
        glyph.rune.is_whitespace() || self.word_delimiters.contains(glyph.rune)
    }

    fn snap_point(&self, point: SelectionPoint, dir: Direction, screen: &Screen) -> SelectionPoint {
        match self.snap {
            SelectionSnap::None => point,
            SelectionSnap::Word => self.snap_word(point, dir, screen),
            SelectionSnap::Line => snap_line(point, dir, screen),
        }
    }

    /// Walk to the edge of the run of same-class runes, across soft wraps
    fn snap_word(&self, point: SelectionPoint, dir: Direction, screen: &Screen) -> SelectionPoint {
        let (min_row, max_row) = row_bounds(screen);
        let Some(mut prev) = screen.line_at(point.row).and_then(|l| l.get(point.col)).copied()
        else {
            return point;
        };
        let mut prev_delim = self.is_delimiter(&prev);
        let (mut col, mut row) = (point.col, point.row);

        loop {
            let (next_col, next_row) = match dir {
                Direction::Forward => {
                    let len = screen.line_at(row).map_or(0, Line::len);
                    if col + 1 < len {
                        (col + 1, row)
                    } else {
                        let wrapped = screen.line_at(row).is_some_and(Line::is_wrapped);
                        if row + 1 > max_row || !wrapped {
                            break;
                        }
                        (0, row + 1)
                    }
                }
                Direction::Backward => {
                    if col > 0 {
                        (col - 1, row)
                    } else {
                        if row - 1 < min_row {
                            break;
                        }
                        let Some(above) = screen.line_at(row - 1) else {
                            break;
                        };
                        if !above.is_wrapped() || above.is_empty() {
                            break;
                        }
                        (above.len() - 1, row - 1)
                    }
                }
            };

            let Some(line) = screen.line_at(next_row) else {
                break;
            };
            if next_col >= line_len(Some(line)) {
                break;
            }
            let glyph = line[next_col];
            let delim = self.is_delimiter(&glyph);
            if !glyph.is_wide_dummy()
                && (delim != prev_delim || (delim && glyph.rune != prev.rune))
            {
                break;
            }
            col = next_col;
            row = next_row;
            prev = glyph;
            prev_delim = delim;
        }
        SelectionPoint::new(col, row)
    }

    /// Whether the cell at `(col, row)` (history coordinates) is selected
    pub fn is_selected(&self, col: usize, row: isize, screen: &Screen) -> bool {
        if !self.is_active() || self.alt != screen.is_alt_screen() {
            return false;
        }
        if col > 0
            && screen
                .line_at(row)
                .and_then(|line| line.get(col))
                .is_some_and(Glyph::is_wide_dummy)
        {
            return self.contains(col - 1, row);
        }
        self.contains(col, row)
    }

    fn contains(&self, col: usize, row: isize) -> bool {
        let (nb, ne) = (self.nb, self.ne);
        if row < nb.row || row > ne.row {
            return false;
        }
        match self.kind {
            SelectionKind::Rectangular => col >= nb.col && col <= ne.col,
            SelectionKind::Regular => {
                (row != nb.row || col >= nb.col) && (row != ne.row || col <= ne.col)
            }
        }
    }

    /// Whether any selected row lies in `[top, bottom]`
    pub fn intersects_rows(&self, top: isize, bottom: isize) -> bool {
        self.is_active() && self.nb.row <= bottom && self.ne.row >= top
    }

    /// Selected text
    ///
    /// Rows are joined with newlines except where a regular selection
    /// crosses a soft wrap. Trailing blanks of each row are dropped.
    pub fn text(&self, screen: &Screen) -> Option<String> {
        if !self.is_active() || self.alt != screen.is_alt_screen() {
            return None;
        }
        let rect = self.kind == SelectionKind::Rectangular;
        let mut text = String::new();

        for row in self.nb.row..=self.ne.row {
            let line = screen.line_at(row);
            let len = line_len(line);
            if let Some(line) = line.filter(|_| len > 0) {
                let (first, last) = if rect {
                    (self.nb.col, self.ne.col)
                } else {
                    (
                        if row == self.nb.row { self.nb.col } else { 0 },
                        if row == self.ne.row {
                            self.ne.col
                        } else {
                            line.len() - 1
                        },
                    )
                };
                let last = last.min(len - 1);
                if first <= last {
                    let mut chunk: String = line.glyphs()[first..=last]
                        .iter()
                        .filter(|g| !g.is_wide_dummy())
                        .map(|g| g.rune)
                        .collect();
                    chunk.truncate(chunk.trim_end_matches(' ').len());
                    text.push_str(&chunk);
                }
            }

            let soft_wrapped = !rect && line.is_some_and(Line::is_wrapped);
            if row < self.ne.row && !soft_wrapped {
                text.push('\n');
            }
        }
        Some(text)
    }

    /// Follow content that moved `n` rows up into history
    ///
    /// A selection whose rows fell out of the retained history is dropped.
    pub fn scroll(&mut self, n: usize, history_len: usize) {
        if self.mode == SelectionMode::Idle || self.alt || n == 0 {
            return;
        }
        let n = n as isize;
        let oldest = -(history_len as isize);
        for point in [&mut self.ob, &mut self.oe, &mut self.nb, &mut self.ne] {
            point.row -= n;
        }
        if self.ne.row < oldest {
            self.clear();
            return;
        }
        for point in [&mut self.ob, &mut self.oe, &mut self.nb] {
            if point.row < oldest {
                point.row = oldest;
                point.col = 0;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Rows a selection may cover: scrollback only on the primary screen
fn row_bounds(screen: &Screen) -> (isize, isize) {
    let min = if screen.is_alt_screen() {
        0
    } else {
        -(screen.history_len() as isize)
    };
    (min, screen.rows() as isize - 1)
}

fn clamp_point(col: usize, row: isize, screen: &Screen) -> SelectionPoint {
    let (min_row, max_row) = row_bounds(screen);
    SelectionPoint::new(col.min(screen.cols() - 1), row.clamp(min_row, max_row))
}

/// Selectable length of a row: all of it when it soft-wraps, otherwise up
/// to the last non-blank cell
fn line_len(line: Option<&Line>) -> usize {
    match line {
        Some(line) if line.is_wrapped() => line.len(),
        Some(line) => line.content_len(),
        None => 0,
    }
}

/// Expand to whole rows, following soft wraps
fn snap_line(point: SelectionPoint, dir: Direction, screen: &Screen) -> SelectionPoint {
    let (min_row, max_row) = row_bounds(screen);
    let mut row = point.row;
    match dir {
        Direction::Backward => {
            while row > min_row && screen.line_at(row - 1).is_some_and(Line::is_wrapped) {
                row -= 1;
            }
            SelectionPoint::new(0, row)
        }
        Direction::Forward => {
            while row < max_row && screen.line_at(row).is_some_and(Line::is_wrapped) {
                row += 1;
            }
            let last = screen.line_at(row).map_or(0, |l| l.len().saturating_sub(1));
            SelectionPoint::new(last, row)
        }
    }
}
