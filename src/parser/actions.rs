//! Actions produced by the parser
//!
//! Actions carry the semantic content of a sequence (which command, which
//! arguments) but apply nothing; the emulator decides what they do to the
//! screen.

use serde::{Deserialize, Serialize};

use crate::core::Color;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Printable rune for the cursor position
    Print(char),
    /// C0 control (0x00-0x1F) or C1 control (0x80-0x9F) to execute
    Execute(u8),
    Csi(CsiAction),
    Esc(EscAction),
    Osc(OscAction),
    /// DCS, APC, PM or SOS string; parsed but not interpreted
    String(StringSequence),
}

/// A complete control sequence `CSI [private] params [intermediates] final`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CsiAction {
    /// Numeric parameters; an empty field is 0
    pub params: Vec<u32>,
    /// `colon[i]` is set when `params[i]` followed a `:` (a sub-parameter)
    pub colon: Vec<bool>,
    /// `?`, `>`, `<` or `=` leading the parameters
    pub private: Option<char>,
    pub intermediates: String,
    pub final_char: char,
}

impl CsiAction {
    /// Parameter `i`, or `default` when it was not given
    pub fn param(&self, i: usize, default: u32) -> u32 {
        self.params.get(i).copied().unwrap_or(default)
    }

    /// Parameter `i`, or `default` when it was not given or is 0
    pub fn param_or_default(&self, i: usize, default: u32) -> u32 {
        match self.params.get(i) {
            Some(&p) if p != 0 => p,
            _ => default,
        }
    }

    pub fn is_private(&self, marker: char) -> bool {
        self.private == Some(marker)
    }

    /// Printable form for logging
    pub fn describe(&self) -> String {
        let params: Vec<String> = self.params.iter().map(u32::to_string).collect();
        format!(
            "CSI {}{}{}{}",
            self.private.map(String::from).unwrap_or_default(),
            params.join(";"),
            self.intermediates,
            self.final_char
        )
    }

    /// Decode an SGR parameter list
    ///
    /// An empty list is a reset. Malformed extended colors consume their
    /// arguments and produce nothing.
    pub fn parse_sgr(&self) -> Vec<SgrAttribute> {
        if self.params.is_empty() {
            return vec![SgrAttribute::Reset];
        }

        let params = &self.params;
        let mut attrs = Vec::new();
        let mut i = 0;
        while i < params.len() {
            // Colon sub-parameters group with the parameter before them
            let group_end = (i + 1..params.len())
                .find(|&j| !self.colon.get(j).copied().unwrap_or(false))
                .unwrap_or(params.len());
            if group_end > i + 1 {
                let sub = &params[i + 1..group_end];
                match params[i] {
                    4 if sub[0] == 0 => attrs.push(SgrAttribute::NoUnderline),
                    4 => attrs.push(SgrAttribute::Underline),
                    38 | 48 => {
                        if let Some(color) = colon_color(sub) {
                            attrs.push(if params[i] == 38 {
                                SgrAttribute::Foreground(color)
                            } else {
                                SgrAttribute::Background(color)
                            });
                        }
                    }
                    _ => {}
                }
                i = group_end;
                continue;
            }

            let p = params[i];
            i += 1;
            let attr = match p {
                0 => SgrAttribute::Reset,
                1 => SgrAttribute::Bold,
                2 => SgrAttribute::Faint,
                3 => SgrAttribute::Italic,
                4 | 21 => SgrAttribute::Underline,
                5 | 6 => SgrAttribute::Blink,
                7 => SgrAttribute::Reverse,
                8 => SgrAttribute::Invisible,
                9 => SgrAttribute::Struck,
                22 => SgrAttribute::NoBoldFaint,
                23 => SgrAttribute::NoItalic,
                24 => SgrAttribute::NoUnderline,
                25 => SgrAttribute::NoBlink,
                27 => SgrAttribute::NoReverse,
                28 => SgrAttribute::NoInvisible,
                29 => SgrAttribute::NoStruck,
                30..=37 => SgrAttribute::Foreground(Color::Basic((p - 30) as u8)),
                39 => SgrAttribute::DefaultForeground,
                40..=47 => SgrAttribute::Background(Color::Basic((p - 40) as u8)),
                49 => SgrAttribute::DefaultBackground,
                90..=97 => SgrAttribute::Foreground(Color::Basic((p - 90 + 8) as u8)),
                100..=107 => SgrAttribute::Background(Color::Basic((p - 100 + 8) as u8)),
                38 | 48 | 58 => {
                    let (color, used) = extended_color(&params[i..]);
                    i += used;
                    match (p, color) {
                        (38, Some(color)) => SgrAttribute::Foreground(color),
                        (48, Some(color)) => SgrAttribute::Background(color),
                        _ => continue,
                    }
                }
                _ => continue,
            };
            attrs.push(attr);
        }
        attrs
    }
}

/// `5;N` or `2;R;G;B` after a 38/48; returns the color and how many
/// parameters were consumed
fn extended_color(args: &[u32]) -> (Option<Color>, usize) {
    match args.first() {
        Some(5) => match args.get(1) {
            Some(&n) => (u8::try_from(n).ok().map(Color::Indexed), 2),
            None => (None, 1),
        },
        Some(2) => {
            let rgb = &args[1..args.len().min(4)];
            let color = match rgb {
                [r, g, b] => match (u8::try_from(*r), u8::try_from(*g), u8::try_from(*b)) {
                    (Ok(r), Ok(g), Ok(b)) => Some(Color::Rgb(r, g, b)),
                    _ => None,
                },
                _ => None,
            };
            (color, 1 + rgb.len())
        }
        Some(_) => (None, 1),
        None => (None, 0),
    }
}

/// `38:5:N`, `38:2:R:G:B` or `38:2:CS:R:G:B`
fn colon_color(sub: &[u32]) -> Option<Color> {
    match sub {
        [5, n] => u8::try_from(*n).ok().map(Color::Indexed),
        [2, r, g, b] | [2, _, r, g, b] => Some(Color::Rgb(
            u8::try_from(*r).ok()?,
            u8::try_from(*g).ok()?,
            u8::try_from(*b).ok()?,
        )),
        _ => None,
    }
}

/// One SGR effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SgrAttribute {
    Reset,
    Bold,
    Faint,
    Italic,
    Underline,
    Blink,
    Reverse,
    Invisible,
    Struck,
    NoBoldFaint,
    NoItalic,
    NoUnderline,
    NoBlink,
    NoReverse,
    NoInvisible,
    NoStruck,
    Foreground(Color),
    Background(Color),
    DefaultForeground,
    DefaultBackground,
}

/// Escape sequences other than CSI and strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscAction {
    /// DECSC
    SaveCursor,
    /// DECRC
    RestoreCursor,
    /// IND
    Index,
    /// NEL
    NextLine,
    /// HTS
    TabSet,
    /// RI
    ReverseIndex,
    /// RIS
    FullReset,
    /// DECKPAM
    ApplicationKeypad,
    /// DECKPNM
    NormalKeypad,
    /// SS2 / SS3
    SingleShift(usize),
    /// LS2 / LS3
    LockingShift(usize),
    /// `ESC ( F` and friends: slot G0..G3 and the designator final
    DesignateCharset { slot: usize, designator: char },
    /// DECALN
    AlignmentTest,
    /// DECID
    Identify,
    Unknown(String),
}

/// String terminator used by a sequence; replies echo it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Terminator {
    Bel,
    #[default]
    St,
}

impl Terminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Terminator::Bel => "\x07",
            Terminator::St => "\x1b\\",
        }
    }
}

/// Target of OSC 10/11/12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicColor {
    Foreground,
    Background,
    Cursor,
}

impl DynamicColor {
    /// OSC number that sets this color
    pub fn osc(self) -> u32 {
        match self {
            DynamicColor::Foreground => 10,
            DynamicColor::Background => 11,
            DynamicColor::Cursor => 12,
        }
    }

    fn from_osc(command: u32) -> Option<Self> {
        match command {
            10 | 110 => Some(DynamicColor::Foreground),
            11 | 111 => Some(DynamicColor::Background),
            12 | 112 => Some(DynamicColor::Cursor),
            _ => None,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            DynamicColor::Foreground => Some(DynamicColor::Background),
            DynamicColor::Background => Some(DynamicColor::Cursor),
            DynamicColor::Cursor => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OscAction {
    SetTitle(String),
    SetIconName(String),
    SetPaletteColor { index: u8, spec: String },
    QueryPaletteColor { index: u8, terminator: Terminator },
    /// `None` resets the whole palette
    ResetPaletteColor(Option<u8>),
    SetDynamicColor { target: DynamicColor, spec: String },
    QueryDynamicColor { target: DynamicColor, terminator: Terminator },
    ResetDynamicColor(DynamicColor),
    /// OSC 52; recorded but never acted on
    Clipboard { selection: String, data: String },
    Unknown { command: Option<u32>, payload: String },
}

impl OscAction {
    /// Interpret an OSC payload (everything between `ESC ]` and the terminator)
    pub fn parse(payload: &str, terminator: Terminator) -> Vec<OscAction> {
        let (command, rest) = match payload.split_once(';') {
            Some((command, rest)) => (command, rest),
            None => (payload, ""),
        };
        let Ok(command) = command.parse::<u32>() else {
            return vec![OscAction::Unknown {
                command: None,
                payload: payload.to_string(),
            }];
        };

        match command {
            0 => vec![
                OscAction::SetIconName(rest.to_string()),
                OscAction::SetTitle(rest.to_string()),
            ],
            1 => vec![OscAction::SetIconName(rest.to_string())],
            2 => vec![OscAction::SetTitle(rest.to_string())],
            4 => {
                let fields: Vec<&str> = rest.split(';').collect();
                fields
                    .chunks(2)
                    .filter_map(|pair| {
                        let [index, spec] = pair else {
                            return None;
                        };
                        let index = index.parse::<u8>().ok()?;
                        Some(if *spec == "?" {
                            OscAction::QueryPaletteColor { index, terminator }
                        } else {
                            OscAction::SetPaletteColor {
                                index,
                                spec: spec.to_string(),
                            }
                        })
                    })
                    .collect()
            }
            10..=12 => {
                // Each further field addresses the next dynamic color
                let mut target = DynamicColor::from_osc(command);
                let mut actions = Vec::new();
                for spec in rest.split(';') {
                    let Some(current) = target else {
                        break;
                    };
                    actions.push(if spec == "?" {
                        OscAction::QueryDynamicColor {
                            target: current,
                            terminator,
                        }
                    } else {
                        OscAction::SetDynamicColor {
                            target: current,
                            spec: spec.to_string(),
                        }
                    });
                    target = current.next();
                }
                actions
            }
            104 if rest.is_empty() => vec![OscAction::ResetPaletteColor(None)],
            104 => rest
                .split(';')
                .filter_map(|index| index.parse::<u8>().ok())
                .map(|index| OscAction::ResetPaletteColor(Some(index)))
                .collect(),
            110..=112 => DynamicColor::from_osc(command)
                .map(OscAction::ResetDynamicColor)
                .into_iter()
                .collect(),
            52 => {
                let (selection, data) = rest.split_once(';').unwrap_or(("", rest));
                vec![OscAction::Clipboard {
                    selection: selection.to_string(),
                    data: data.to_string(),
                }]
            }
            _ => vec![OscAction::Unknown {
                command: Some(command),
                payload: rest.to_string(),
            }],
        }
    }
}

/// Which string sequence introduced a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringKind {
    Osc,
    Dcs,
    Apc,
    Pm,
    Sos,
}

/// Payload of a DCS, APC, PM or SOS string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringSequence {
    pub kind: StringKind,
    pub raw: String,
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csi(params: &[u32]) -> CsiAction {
        CsiAction {
            params: params.to_vec(),
            colon: vec![false; params.len()],
            final_char: 'm',
            ..Default::default()
        }
    }

    #[test]
    fn test_param_defaults() {
        let action = csi(&[0, 5]);
        assert_eq!(action.param(0, 1), 0);
        assert_eq!(action.param_or_default(0, 1), 1);
        assert_eq!(action.param_or_default(1, 1), 5);
        assert_eq!(action.param(2, 7), 7);
    }

    #[test]
    fn test_sgr_empty_is_reset() {
        assert_eq!(csi(&[]).parse_sgr(), vec![SgrAttribute::Reset]);
    }

    #[test]
    fn test_sgr_basic() {
        assert_eq!(
            csi(&[1, 31, 44, 22]).parse_sgr(),
            vec![
                SgrAttribute::Bold,
                SgrAttribute::Foreground(Color::Basic(1)),
                SgrAttribute::Background(Color::Basic(4)),
                SgrAttribute::NoBoldFaint,
            ]
        );
        assert_eq!(
            csi(&[91, 107]).parse_sgr(),
            vec![
                SgrAttribute::Foreground(Color::Basic(9)),
                SgrAttribute::Background(Color::Basic(15)),
            ]
        );
    }

    #[test]
    fn test_sgr_extended_colors() {
        assert_eq!(
            csi(&[38, 5, 196, 48, 2, 1, 2, 3, 4]).parse_sgr(),
            vec![
                SgrAttribute::Foreground(Color::Indexed(196)),
                SgrAttribute::Background(Color::Rgb(1, 2, 3)),
                SgrAttribute::Underline,
            ]
        );
    }

    #[test]
    fn test_sgr_malformed_extended_colors_are_skipped() {
        // Index out of range: both arguments consumed
        assert_eq!(csi(&[38, 5, 300, 1]).parse_sgr(), vec![SgrAttribute::Bold]);
        // Truncated true color
        assert_eq!(csi(&[38, 2, 10, 20]).parse_sgr(), vec![]);
        // Unknown color space consumes its selector
        assert_eq!(csi(&[38, 7, 1]).parse_sgr(), vec![SgrAttribute::Bold]);
        assert_eq!(csi(&[48]).parse_sgr(), vec![]);
    }

    #[test]
    fn test_sgr_colon_subparams() {
        let action = CsiAction {
            params: vec![4, 3, 38, 2, 0, 10, 20, 30, 1],
            colon: vec![false, true, false, true, true, true, true, true, false],
            final_char: 'm',
            ..Default::default()
        };
        assert_eq!(
            action.parse_sgr(),
            vec![
                SgrAttribute::Underline,
                SgrAttribute::Foreground(Color::Rgb(10, 20, 30)),
                SgrAttribute::Bold,
            ]
        );
    }

    #[test]
    fn test_osc_title() {
        assert_eq!(
            OscAction::parse("2;hello;world", Terminator::Bel),
            vec![OscAction::SetTitle("hello;world".to_string())]
        );
        assert_eq!(OscAction::parse("0;t", Terminator::St).len(), 2);
    }

    #[test]
    fn test_osc_palette() {
        assert_eq!(
            OscAction::parse("4;1;#ff0000;2;?", Terminator::Bel),
            vec![
                OscAction::SetPaletteColor {
                    index: 1,
                    spec: "#ff0000".to_string()
                },
                OscAction::QueryPaletteColor {
                    index: 2,
                    terminator: Terminator::Bel
                },
            ]
        );
        assert_eq!(
            OscAction::parse("104", Terminator::St),
            vec![OscAction::ResetPaletteColor(None)]
        );
    }

    #[test]
    fn test_osc_dynamic_colors() {
        assert_eq!(
            OscAction::parse("10;?;#000000", Terminator::St),
            vec![
                OscAction::QueryDynamicColor {
                    target: DynamicColor::Foreground,
                    terminator: Terminator::St
                },
                OscAction::SetDynamicColor {
                    target: DynamicColor::Background,
                    spec: "#000000".to_string()
                },
            ]
        );
        assert_eq!(
            OscAction::parse("112", Terminator::St),
            vec![OscAction::ResetDynamicColor(DynamicColor::Cursor)]
        );
    }

    #[test]
    fn test_osc_unknown() {
        assert_eq!(
            OscAction::parse("777;notify", Terminator::St),
            vec![OscAction::Unknown {
                command: Some(777),
                payload: "notify".to_string()
            }]
        );
        assert!(matches!(
            OscAction::parse("abc", Terminator::St).as_slice(),
            [OscAction::Unknown { command: None, .. }]
        ));
    }

    #[test]
    fn test_describe() {
        let action = CsiAction {
            params: vec![1, 2004],
            colon: vec![false, false],
            private: Some('?'),
            intermediates: String::new(),
            final_char: 'h',
        };
        assert_eq!(action.describe(), "CSI ?1;2004h");
    }
}
