//! Terminal Core Module
//!
//! Platform-independent terminal state:
//! - glyphs, colors and the palette
//! - cursor, modes and charsets
//! - the screen model with its scrollback ring
//! - selection and deterministic snapshots
//!
//! Nothing in here does I/O. Given the same sequence of operations the
//! core always ends up in the same state.

mod cell;
mod charset;
mod color;
mod cursor;
mod modes;
mod screen;
mod scrollback;
mod selection;
mod snapshot;

pub use cell::{rune_width, Glyph, GlyphFlags};
pub use charset::{Charset, CharsetState};
pub use color::{
    format_color_spec, parse_color_spec, xterm_rgb, Color, ColorMode, Palette, Rgb,
};
pub use cursor::{Cursor, CursorShape, CursorState, SavedCursor};
pub use modes::{MouseEncoding, MouseMode, TermMode};
pub use screen::{Screen, ScrollActivity, DEFAULT_TAB_WIDTH};
pub use scrollback::{Line, Scrollback};
pub use selection::{
    Selection, SelectionKind, SelectionMode, SelectionPoint, SelectionSnap,
    DEFAULT_WORD_DELIMITERS,
};
pub use snapshot::{CursorSnapshot, GlyphSnapshot, ModesSnapshot, Snapshot, StyleSnapshot};
