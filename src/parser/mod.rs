//! Terminal escape sequence parser
//!
//! A stateful parser that converts bytes into terminal actions.
//! Based on the VT500-series parser model from <https://vt100.net/emu/dec_ansi_parser>

mod actions;
mod state;

pub use actions::{
    Action, CsiAction, DynamicColor, EscAction, OscAction, SgrAttribute, StringKind,
    StringSequence, Terminator,
};
pub use state::{Parser, MAX_CSI_PARAMS, MAX_STRING_LEN};
