//! Parser State Machine
//!
//! Implements a VT500-series compatible parser state machine.
//! Bytes are decoded to runes first, so UTF-8 sequences and escape
//! sequences may be split across chunks anywhere.
//!
//! # State Machine
//!
//! The parser follows the state machine model described in:
//! - "A parser for DEC's ANSI-compatible video terminals" by Paul Williams
//! - https://vt100.net/emu/dec_ansi_parser
//!
//! States:
//! - Ground: Normal text processing
//! - Escape: After ESC, waiting for next rune
//! - EscapeIntermediate: ESC followed by intermediate runes
//! - CharsetSelect: `ESC (` and friends, waiting for the designator
//! - CsiEntry / CsiParam / CsiIntermediate: collecting a control sequence
//! - CsiIgnore: malformed control sequence, swallowed up to its final
//! - String: collecting an OSC, DCS, APC, PM or SOS payload
//! - StringEscape: ESC seen inside a string, `\` terminates it

use tracing::{debug, trace};

use super::actions::{
    Action, CsiAction, EscAction, OscAction, StringKind, StringSequence, Terminator,
};
use crate::utf8::Utf8Decoder;

/// Parameters beyond this many are dropped
pub const MAX_CSI_PARAMS: usize = 32;
/// Longest string payload kept, in bytes; the rest is discarded
pub const MAX_STRING_LEN: usize = 64 * 1024;
const MAX_INTERMEDIATES: usize = 4;

const CAN: char = '\x18';
const SUB: char = '\x1a';
const ESC: char = '\x1b';
const BEL: char = '\x07';
const DEL: char = '\x7f';

const C1_DCS: u32 = 0x90;
const C1_SOS: u32 = 0x98;
const C1_CSI: u32 = 0x9b;
const C1_ST: u32 = 0x9c;
const C1_OSC: u32 = 0x9d;
const C1_PM: u32 = 0x9e;
const C1_APC: u32 = 0x9f;

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    EscapeIntermediate,
    CharsetSelect(usize),
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    String(StringKind),
    StringEscape(StringKind),
}

fn is_c0(rune: char) -> bool {
    (rune as u32) < 0x20
}

fn is_c1(rune: char) -> bool {
    (0x80..=0x9f).contains(&(rune as u32))
}

fn is_intermediate(rune: char) -> bool {
    (' '..='/').contains(&rune)
}

fn is_final(rune: char) -> bool {
    ('@'..='~').contains(&rune)
}

/// The terminal parser
#[derive(Debug)]
pub struct Parser {
    state: State,
    decoder: Utf8Decoder,
    /// Intermediates of an ESC or CSI sequence
    intermediates: String,
    params: Vec<u32>,
    colon: Vec<bool>,
    /// Parameter being built; `None` until a digit arrives
    current_param: Option<u32>,
    /// The parameter being built follows a `:`
    current_colon: bool,
    private_marker: Option<char>,
    /// Payload of the string being collected
    string: String,
    /// Set once the payload hit `MAX_STRING_LEN`
    string_truncated: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in the ground state
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            decoder: Utf8Decoder::new(),
            intermediates: String::with_capacity(MAX_INTERMEDIATES),
            params: Vec::with_capacity(16),
            colon: Vec::with_capacity(16),
            current_param: None,
            current_colon: false,
            private_marker: None,
            string: String::with_capacity(256),
            string_truncated: false,
        }
    }

    /// Reset the parser to initial state, dropping any partial input
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.decoder.reset();
        self.clear_params();
        self.clear_string();
    }

    /// True when no sequence or UTF-8 rune is partially accumulated
    pub fn is_ground(&self) -> bool {
        self.state == State::Ground && !self.decoder.is_pending()
    }

    fn clear_params(&mut self) {
        self.intermediates.clear();
        self.params.clear();
        self.colon.clear();
        self.current_param = None;
        self.current_colon = false;
        self.private_marker = None;
    }

    fn clear_string(&mut self) {
        self.string.clear();
        self.string_truncated = false;
    }

    /// Process a chunk of bytes, returning actions
    pub fn parse(&mut self, data: &[u8]) -> Vec<Action> {
        let mut actions = Vec::new();
        let mut decoder = std::mem::take(&mut self.decoder);
        decoder.feed(data, |rune| self.advance(rune, &mut actions));
        self.decoder = decoder;
        actions
    }

    /// Feed one decoded rune through the state machine
    pub fn advance(&mut self, rune: char, out: &mut Vec<Action>) {
        // Transitions valid from any state
        match rune {
            CAN | SUB => {
                if self.state != State::Ground {
                    trace!("sequence cancelled in {:?}", self.state);
                }
                self.clear_params();
                self.clear_string();
                self.state = State::Ground;
                return;
            }
            ESC => {
                self.state = match self.state {
                    State::String(kind) => State::StringEscape(kind),
                    _ => {
                        self.clear_params();
                        self.clear_string();
                        State::Escape
                    }
                };
                return;
            }
            _ => {}
        }

        match self.state {
            State::String(kind) => return self.process_string(kind, rune, out),
            State::StringEscape(kind) => {
                if rune == '\\' {
                    self.terminate_string(kind, Terminator::St, out);
                    self.state = State::Ground;
                    return;
                }
                // Anything but ST abandons the string and starts a new escape
                debug!("{:?} string aborted by ESC {:?}", kind, rune);
                self.clear_string();
                self.state = State::Escape;
            }
            _ => {}
        }

        if is_c0(rune) {
            out.push(Action::Execute(rune as u8));
            return;
        }
        if rune == DEL {
            return;
        }
        if is_c1(rune) {
            return self.process_c1(rune, out);
        }

        match self.state {
            State::Ground => out.push(Action::Print(rune)),
            State::Escape => self.process_escape(rune, out),
            State::EscapeIntermediate => self.process_escape_intermediate(rune, out),
            State::CharsetSelect(slot) => {
                out.push(Action::Esc(EscAction::DesignateCharset {
                    slot,
                    designator: rune,
                }));
                self.state = State::Ground;
            }
            State::CsiEntry => self.process_csi_entry(rune, out),
            State::CsiParam => self.process_csi_param(rune, out),
            State::CsiIntermediate => self.process_csi_intermediate(rune, out),
            State::CsiIgnore => {
                if is_final(rune) {
                    self.state = State::Ground;
                }
            }
            State::String(_) | State::StringEscape(_) => {}
        }
    }

    /// C1 controls behave like their 7-bit ESC equivalents
    fn process_c1(&mut self, rune: char, out: &mut Vec<Action>) {
        self.clear_params();
        match rune as u32 {
            C1_CSI => self.state = State::CsiEntry,
            C1_OSC => self.start_string(StringKind::Osc),
            C1_DCS => self.start_string(StringKind::Dcs),
            C1_SOS => self.start_string(StringKind::Sos),
            C1_PM => self.start_string(StringKind::Pm),
            C1_APC => self.start_string(StringKind::Apc),
            C1_ST => self.state = State::Ground,
            code => {
                out.push(Action::Execute(code as u8));
                self.state = State::Ground;
            }
        }
    }

    fn process_escape(&mut self, rune: char, out: &mut Vec<Action>) {
        let action = match rune {
            '[' => {
                self.state = State::CsiEntry;
                return;
            }
            ']' => return self.start_string(StringKind::Osc),
            'P' => return self.start_string(StringKind::Dcs),
            '_' => return self.start_string(StringKind::Apc),
            '^' => return self.start_string(StringKind::Pm),
            'X' => return self.start_string(StringKind::Sos),
            '(' | ')' | '*' | '+' => {
                self.state = State::CharsetSelect((rune as usize) - ('(' as usize));
                return;
            }
            '-' | '.' | '/' => {
                // 96-character sets for G1..G3
                self.state = State::CharsetSelect((rune as usize) - ('-' as usize) + 1);
                return;
            }
            _ if is_intermediate(rune) => {
                self.intermediates.push(rune);
                self.state = State::EscapeIntermediate;
                return;
            }
            '\\' => None,
            '7' => Some(EscAction::SaveCursor),
            '8' => Some(EscAction::RestoreCursor),
            'D' => Some(EscAction::Index),
            'E' => Some(EscAction::NextLine),
            'H' => Some(EscAction::TabSet),
            'M' => Some(EscAction::ReverseIndex),
            'c' => Some(EscAction::FullReset),
            '=' => Some(EscAction::ApplicationKeypad),
            '>' => Some(EscAction::NormalKeypad),
            'N' => Some(EscAction::SingleShift(2)),
            'O' => Some(EscAction::SingleShift(3)),
            'n' => Some(EscAction::LockingShift(2)),
            'o' => Some(EscAction::LockingShift(3)),
            'Z' => Some(EscAction::Identify),
            _ => Some(EscAction::Unknown(format!("ESC {}", rune))),
        };
        if let Some(action) = action {
            out.push(Action::Esc(action));
        }
        self.state = State::Ground;
    }

    fn process_escape_intermediate(&mut self, rune: char, out: &mut Vec<Action>) {
        if is_intermediate(rune) {
            if self.intermediates.len() < MAX_INTERMEDIATES {
                self.intermediates.push(rune);
            }
            return;
        }
        if ('0'..='~').contains(&rune) {
            let action = match (self.intermediates.as_str(), rune) {
                ("#", '8') => EscAction::AlignmentTest,
                (intermediates, _) => EscAction::Unknown(format!("ESC {}{}", intermediates, rune)),
            };
            out.push(Action::Esc(action));
        }
        self.intermediates.clear();
        self.state = State::Ground;
    }

    fn process_csi_entry(&mut self, rune: char, out: &mut Vec<Action>) {
        match rune {
            '?' | '>' | '<' | '=' => {
                self.private_marker = Some(rune);
                self.state = State::CsiParam;
            }
            '0'..='9' | ';' | ':' => {
                self.state = State::CsiParam;
                self.process_csi_param(rune, out);
            }
            _ if is_intermediate(rune) => {
                self.intermediates.push(rune);
                self.state = State::CsiIntermediate;
            }
            _ if is_final(rune) => self.dispatch_csi(rune, out),
            _ => self.state = State::CsiIgnore,
        }
    }

    fn process_csi_param(&mut self, rune: char, out: &mut Vec<Action>) {
        match rune {
            '0'..='9' => {
                let digit = rune as u32 - '0' as u32;
                let value = self.current_param.unwrap_or(0);
                self.current_param = Some(value.saturating_mul(10).saturating_add(digit));
            }
            ';' => {
                self.finish_param();
                self.current_colon = false;
            }
            ':' => {
                self.finish_param();
                self.current_colon = true;
            }
            _ if is_intermediate(rune) => {
                self.finish_param();
                self.intermediates.push(rune);
                self.state = State::CsiIntermediate;
            }
            _ if is_final(rune) => {
                if self.current_param.is_some() || !self.params.is_empty() {
                    self.finish_param();
                }
                self.dispatch_csi(rune, out);
            }
            // A private marker after the first position, or anything else
            _ => self.state = State::CsiIgnore,
        }
    }

    fn process_csi_intermediate(&mut self, rune: char, out: &mut Vec<Action>) {
        if is_intermediate(rune) {
            if self.intermediates.len() < MAX_INTERMEDIATES {
                self.intermediates.push(rune);
            }
        } else if is_final(rune) {
            self.dispatch_csi(rune, out);
        } else {
            self.state = State::CsiIgnore;
        }
    }

    fn finish_param(&mut self) {
        let value = self.current_param.take().unwrap_or(0);
        if self.params.len() < MAX_CSI_PARAMS {
            self.params.push(value);
            self.colon.push(self.current_colon);
        }
    }

    fn dispatch_csi(&mut self, final_char: char, out: &mut Vec<Action>) {
        let action = CsiAction {
            params: std::mem::take(&mut self.params),
            colon: std::mem::take(&mut self.colon),
            private: self.private_marker.take(),
            intermediates: std::mem::take(&mut self.intermediates),
            final_char,
        };
        trace!("{}", action.describe());
        out.push(Action::Csi(action));
        self.clear_params();
        self.state = State::Ground;
    }

    fn start_string(&mut self, kind: StringKind) {
        self.clear_string();
        self.state = State::String(kind);
    }

    fn process_string(&mut self, kind: StringKind, rune: char, out: &mut Vec<Action>) {
        if rune == BEL && kind == StringKind::Osc {
            self.terminate_string(kind, Terminator::Bel, out);
            self.state = State::Ground;
        } else if rune as u32 == C1_ST {
            self.terminate_string(kind, Terminator::St, out);
            self.state = State::Ground;
        } else if is_c1(rune) {
            debug!("{:?} string aborted by C1 {:#x}", kind, rune as u32);
            self.clear_string();
            self.state = State::Ground;
            self.process_c1(rune, out);
        } else if is_c0(rune) {
            // ignored inside strings
        } else if self.string.len() + rune.len_utf8() <= MAX_STRING_LEN {
            self.string.push(rune);
        } else if !self.string_truncated {
            debug!("{:?} string exceeds {} bytes, truncating", kind, MAX_STRING_LEN);
            self.string_truncated = true;
        }
    }

    fn terminate_string(&mut self, kind: StringKind, terminator: Terminator, out: &mut Vec<Action>) {
        let raw = std::mem::take(&mut self.string);
        self.string_truncated = false;
        match kind {
            StringKind::Osc => {
                out.extend(OscAction::parse(&raw, terminator).into_iter().map(Action::Osc));
            }
            _ => {
                let args = raw.split(';').map(str::to_string).collect();
                out.push(Action::String(StringSequence { kind, raw, args }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::actions::{DynamicColor, SgrAttribute};
    use proptest::prelude::*;

    fn single_csi(actions: &[Action]) -> &CsiAction {
        match actions {
            [Action::Csi(csi)] => csi,
            other => panic!("expected one CSI, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_print() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"Hello");

        assert_eq!(actions.len(), 5);
        assert_eq!(actions[0], Action::Print('H'));
        assert_eq!(actions[4], Action::Print('o'));
    }

    #[test]
    fn test_parser_c0_controls() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"A\nB\rC");

        assert_eq!(
            actions,
            vec![
                Action::Print('A'),
                Action::Execute(b'\n'),
                Action::Print('B'),
                Action::Execute(b'\r'),
                Action::Print('C'),
            ]
        );
    }

    #[test]
    fn test_parser_c0_inside_csi() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[2\x08C");

        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], Action::Execute(0x08));
        match &actions[1] {
            Action::Csi(csi) => {
                assert_eq!(csi.params, vec![2]);
                assert_eq!(csi.final_char, 'C');
            }
            other => panic!("expected CSI, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_csi_cup() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[10;20H");
        let csi = single_csi(&actions);

        assert_eq!(csi.params, vec![10, 20]);
        assert_eq!(csi.final_char, 'H');
        assert_eq!(csi.private, None);
    }

    #[test]
    fn test_parser_csi_private() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[?25;1049h");
        let csi = single_csi(&actions);

        assert_eq!(csi.params, vec![25, 1049]);
        assert!(csi.is_private('?'));
    }

    #[test]
    fn test_parser_csi_intermediate() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[2 q");
        let csi = single_csi(&actions);

        assert_eq!(csi.params, vec![2]);
        assert_eq!(csi.intermediates, " ");
        assert_eq!(csi.final_char, 'q');
    }

    #[test]
    fn test_parser_empty_params() {
        let mut parser = Parser::new();
        assert!(single_csi(&parser.parse(b"\x1b[H")).params.is_empty());
        assert_eq!(single_csi(&parser.parse(b"\x1b[;5H")).params, vec![0, 5]);
        assert_eq!(single_csi(&parser.parse(b"\x1b[3;H")).params, vec![3, 0]);
    }

    #[test]
    fn test_parser_csi_sgr() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[1;31;48;2;255;128;0m");
        let csi = single_csi(&actions);

        assert_eq!(csi.params, vec![1, 31, 48, 2, 255, 128, 0]);
        assert_eq!(
            csi.parse_sgr(),
            vec![
                SgrAttribute::Bold,
                SgrAttribute::Foreground(crate::core::Color::Basic(1)),
                SgrAttribute::Background(crate::core::Color::Rgb(255, 128, 0)),
            ]
        );
    }

    #[test]
    fn test_parser_colon_subparams() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[4:3;1m");
        let csi = single_csi(&actions);

        assert_eq!(csi.params, vec![4, 3, 1]);
        assert_eq!(csi.colon, vec![false, true, false]);
    }

    #[test]
    fn test_parser_param_overflow_saturates() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[99999999999999A");
        assert_eq!(single_csi(&actions).params, vec![u32::MAX]);
    }

    #[test]
    fn test_parser_param_count_capped() {
        let mut parser = Parser::new();
        let mut input = b"\x1b[".to_vec();
        for _ in 0..100 {
            input.extend_from_slice(b"1;");
        }
        input.push(b'm');
        let actions = parser.parse(&input);
        assert_eq!(single_csi(&actions).params.len(), MAX_CSI_PARAMS);
    }

    #[test]
    fn test_parser_malformed_csi_ignored() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[1?2hX");
        assert_eq!(actions, vec![Action::Print('X')]);
    }

    #[test]
    fn test_parser_esc_save_restore() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b7\x1b8");

        assert_eq!(
            actions,
            vec![
                Action::Esc(EscAction::SaveCursor),
                Action::Esc(EscAction::RestoreCursor),
            ]
        );
    }

    #[test]
    fn test_parser_decaln_and_unknown_escape() {
        let mut parser = Parser::new();
        assert_eq!(
            parser.parse(b"\x1b#8"),
            vec![Action::Esc(EscAction::AlignmentTest)]
        );
        assert!(matches!(
            parser.parse(b"\x1bq").as_slice(),
            [Action::Esc(EscAction::Unknown(_))]
        ));
        assert!(parser.parse(b"\x1b\\").is_empty());
    }

    #[test]
    fn test_parser_designate_charset() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b(B\x1b)0");

        assert_eq!(
            actions,
            vec![
                Action::Esc(EscAction::DesignateCharset {
                    slot: 0,
                    designator: 'B'
                }),
                Action::Esc(EscAction::DesignateCharset {
                    slot: 1,
                    designator: '0'
                }),
            ]
        );
    }

    #[test]
    fn test_parser_osc_title_bel_and_st() {
        let mut parser = Parser::new();
        assert_eq!(
            parser.parse(b"\x1b]2;My Title\x07"),
            vec![Action::Osc(OscAction::SetTitle("My Title".to_string()))]
        );
        assert_eq!(
            parser.parse(b"\x1b]2;Other\x1b\\"),
            vec![Action::Osc(OscAction::SetTitle("Other".to_string()))]
        );
    }

    #[test]
    fn test_parser_osc_utf8_title() {
        let mut parser = Parser::new();
        assert_eq!(
            parser.parse("\x1b]2;héllo 世界\x07".as_bytes()),
            vec![Action::Osc(OscAction::SetTitle("héllo 世界".to_string()))]
        );
    }

    #[test]
    fn test_parser_osc_query_keeps_terminator() {
        let mut parser = Parser::new();
        assert_eq!(
            parser.parse(b"\x1b]11;?\x07"),
            vec![Action::Osc(OscAction::QueryDynamicColor {
                target: DynamicColor::Background,
                terminator: Terminator::Bel,
            })]
        );
    }

    #[test]
    fn test_parser_osc_split_across_chunks() {
        let mut parser = Parser::new();
        assert!(parser.parse(b"\x1b]2;ab").is_empty());
        assert!(parser.parse(b"cd\x1b").is_empty());
        assert_eq!(
            parser.parse(b"\\"),
            vec![Action::Osc(OscAction::SetTitle("abcd".to_string()))]
        );
    }

    #[test]
    fn test_parser_dcs_string() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1bP1;2|data\x1b\\");
        assert_eq!(
            actions,
            vec![Action::String(StringSequence {
                kind: StringKind::Dcs,
                raw: "1;2|data".to_string(),
                args: vec!["1".to_string(), "2|data".to_string()],
            })]
        );
    }

    #[test]
    fn test_parser_bel_does_not_end_apc() {
        let mut parser = Parser::new();
        assert!(parser.parse(b"\x1b_abc\x07def").is_empty());
        assert!(matches!(
            parser.parse(b"\x1b\\").as_slice(),
            [Action::String(StringSequence { kind: StringKind::Apc, raw, .. })] if raw == "abcdef"
        ));
    }

    #[test]
    fn test_parser_string_truncated() {
        let mut parser = Parser::new();
        let mut input = b"\x1b]2;".to_vec();
        input.extend(std::iter::repeat(b'x').take(MAX_STRING_LEN + 100));
        input.push(0x07);
        match parser.parse(&input).as_slice() {
            [Action::Osc(OscAction::SetTitle(title))] => {
                assert_eq!(title.len(), MAX_STRING_LEN - 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parser_utf8() {
        let mut parser = Parser::new();
        let actions = parser.parse("Hello 世界".as_bytes());

        assert_eq!(actions.len(), 8);
        assert_eq!(actions[6], Action::Print('世'));
        assert_eq!(actions[7], Action::Print('界'));
    }

    #[test]
    fn test_parser_chunk_boundary() {
        let mut parser = Parser::new();

        assert!(parser.parse(b"\x1b[").is_empty());
        assert!(parser.parse(b"5").is_empty());
        let actions = parser.parse(b"A");
        let csi = single_csi(&actions);
        assert_eq!(csi.params, vec![5]);
        assert_eq!(csi.final_char, 'A');
    }

    #[test]
    fn test_parser_utf8_chunk_boundary() {
        let mut parser = Parser::new();

        // UTF-8 for '世' is E4 B8 96
        assert!(parser.parse(&[0xE4]).is_empty());
        assert!(parser.parse(&[0xB8]).is_empty());
        assert!(!parser.is_ground());
        assert_eq!(parser.parse(&[0x96]), vec![Action::Print('世')]);
        assert!(parser.is_ground());
    }

    #[test]
    fn test_parser_invalid_utf8_prints_replacement() {
        let mut parser = Parser::new();
        assert_eq!(
            parser.parse(&[b'a', 0xFF, b'b']),
            vec![
                Action::Print('a'),
                Action::Print(crate::utf8::REPLACEMENT),
                Action::Print('b'),
            ]
        );
    }

    #[test]
    fn test_parser_cancel_sequence() {
        let mut parser = Parser::new();
        let actions = parser.parse(b"\x1b[5\x18A");
        assert_eq!(actions, vec![Action::Print('A')]);
    }

    #[test]
    fn test_parser_c1_csi() {
        let mut parser = Parser::new();
        let actions = parser.parse("\u{9b}3B".as_bytes());
        let csi = single_csi(&actions);
        assert_eq!(csi.params, vec![3]);
        assert_eq!(csi.final_char, 'B');

        assert_eq!(
            parser.parse("\u{84}".as_bytes()),
            vec![Action::Execute(0x84)]
        );
    }

    #[test]
    fn test_parser_reset_drops_partial_input() {
        let mut parser = Parser::new();
        parser.parse(b"\x1b[12");
        parser.reset();
        assert!(parser.is_ground());
        assert_eq!(parser.parse(b"m"), vec![Action::Print('m')]);
    }

    proptest! {
        #[test]
        fn prop_parser_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let mut parser = Parser::new();
            let _ = parser.parse(&data);
        }

        #[test]
        fn prop_chunking_is_transparent(
            data in proptest::collection::vec(any::<u8>(), 0..256),
            split in 0usize..256,
        ) {
            let split = split.min(data.len());
            let mut whole = Parser::new();
            let expected = whole.parse(&data);

            let mut chunked = Parser::new();
            let mut actual = chunked.parse(&data[..split]);
            actual.extend(chunked.parse(&data[split..]));
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_plain_text_prints(text in "[a-zA-Z0-9 ]{0,64}") {
            let mut parser = Parser::new();
            let actions = parser.parse(text.as_bytes());
            prop_assert_eq!(actions.len(), text.chars().count());
        }
    }
}
