//! Terminal mode flags
//!
//! Every ANSI and DEC private mode the emulator honors is one bit of
//! [`TermMode`]. Mouse reporting is several mutually exclusive bits, so
//! [`TermMode::mouse_mode`] and [`TermMode::mouse_encoding`] fold them back
//! into enums for the input encoders.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TermMode: u32 {
        /// DECTCEM (?25)
        const SHOW_CURSOR        = 1 << 0;
        /// DECCKM (?1)
        const APP_CURSOR         = 1 << 1;
        /// DECKPAM / DECKPNM
        const APP_KEYPAD         = 1 << 2;
        /// DECAWM (?7)
        const LINE_WRAP          = 1 << 3;
        /// DECOM (?6)
        const ORIGIN             = 1 << 4;
        /// IRM (4)
        const INSERT             = 1 << 5;
        /// Alternate screen active (?47, ?1047, ?1049)
        const ALT_SCREEN         = 1 << 6;
        /// X10 mouse, press only (?9)
        const MOUSE_X10          = 1 << 7;
        /// Normal tracking (?1000)
        const MOUSE_REPORT       = 1 << 8;
        /// Button-event tracking (?1002)
        const MOUSE_MOTION       = 1 << 9;
        /// Any-event tracking (?1003)
        const MOUSE_ALL          = 1 << 10;
        /// SGR coordinates (?1006)
        const SGR_MOUSE          = 1 << 11;
        /// UTF-8 coordinates (?1005)
        const UTF8_MOUSE         = 1 << 12;
        /// urxvt coordinates (?1015)
        const URXVT_MOUSE        = 1 << 13;
        /// Focus in/out reports (?1004)
        const FOCUS_IN_OUT       = 1 << 14;
        /// ?2004
        const BRACKETED_PASTE    = 1 << 15;
        /// Wheel sends cursor keys on the alternate screen (?1007)
        const ALTERNATE_SCROLL   = 1 << 16;
        /// LNM (20)
        const LINE_FEED_NEW_LINE = 1 << 17;
        /// DECSCNM (?5)
        const REVERSE_VIDEO      = 1 << 18;
        /// KAM (2); keyboard input is dropped while set
        const KEYBOARD_LOCK      = 1 << 19;
        /// SRM (12); set means no local echo, which is all we support
        const SEND_RECEIVE       = 1 << 20;
        /// ?12, cursor blink requested by the application
        const CURSOR_BLINK       = 1 << 21;

        const ANY_MOUSE = Self::MOUSE_X10.bits()
            | Self::MOUSE_REPORT.bits()
            | Self::MOUSE_MOTION.bits()
            | Self::MOUSE_ALL.bits();

        const ANY_MOUSE_ENCODING = Self::SGR_MOUSE.bits()
            | Self::UTF8_MOUSE.bits()
            | Self::URXVT_MOUSE.bits();
    }
}

impl Default for TermMode {
    fn default() -> Self {
        Self::LINE_WRAP | Self::SHOW_CURSOR | Self::SEND_RECEIVE
    }
}

/// Mouse reporting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseMode {
    /// No mouse reporting
    #[default]
    None,
    /// Report button press only
    X10,
    /// Report press and release
    Normal,
    /// Also report motion while a button is held
    ButtonMotion,
    /// Report all motion
    AnyMotion,
}

/// Mouse coordinate encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseEncoding {
    /// Single byte coordinates, limited to 223
    #[default]
    X10,
    Utf8,
    /// `CSI < b ; x ; y M/m`
    Sgr,
    /// `CSI b ; x ; y M`
    Urxvt,
}

impl TermMode {
    /// Switch to a mouse tracking mode; the modes exclude each other
    pub fn set_mouse_mode(&mut self, bit: TermMode, enable: bool) {
        self.remove(Self::ANY_MOUSE);
        if enable {
            self.insert(bit & Self::ANY_MOUSE);
        }
    }

    /// Switch coordinate encoding; the encodings exclude each other
    pub fn set_mouse_encoding(&mut self, bit: TermMode, enable: bool) {
        self.remove(Self::ANY_MOUSE_ENCODING);
        if enable {
            self.insert(bit & Self::ANY_MOUSE_ENCODING);
        }
    }

    pub fn mouse_mode(&self) -> MouseMode {
        if self.contains(Self::MOUSE_ALL) {
            MouseMode::AnyMotion
        } else if self.contains(Self::MOUSE_MOTION) {
            MouseMode::ButtonMotion
        } else if self.contains(Self::MOUSE_REPORT) {
            MouseMode::Normal
        } else if self.contains(Self::MOUSE_X10) {
            MouseMode::X10
        } else {
            MouseMode::None
        }
    }

    pub fn mouse_encoding(&self) -> MouseEncoding {
        if self.contains(Self::SGR_MOUSE) {
            MouseEncoding::Sgr
        } else if self.contains(Self::URXVT_MOUSE) {
            MouseEncoding::Urxvt
        } else if self.contains(Self::UTF8_MOUSE) {
            MouseEncoding::Utf8
        } else {
            MouseEncoding::X10
        }
    }
}
