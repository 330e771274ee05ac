//! vtpane: an embeddable terminal emulation engine
//!
//! The crate runs a shell on a pseudoterminal and keeps an st-class model of
//! its screen for a host application to paint:
//!
//! - `utf8`: streaming UTF-8 decoding and encoding
//! - `pty`: Unix PTY management and the child process
//! - `parser`: VT/xterm escape sequence parser
//! - `core`: screen model, cells, cursor, scrollback, selection
//! - `emulator`: applies parsed sequences to the screen
//! - `terminal`: the host-facing façade with its reader thread
//! - `input`: key, mouse and paste encoding

pub mod config;
pub mod core;
pub mod emulator;
pub mod error;
pub mod input;
pub mod parser;
pub mod pty;
pub mod terminal;
pub mod utf8;

pub use config::{Config, PaletteConfig, ShellConfig};
pub use emulator::Emulator;
pub use error::{Error, Result};
pub use terminal::{Terminal, TerminalState, TerminalView, Wakeup};
