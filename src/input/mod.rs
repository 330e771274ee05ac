//! Input Encoding Module
//!
//! Handles encoding of keyboard and mouse input into terminal escape sequences.
//! This module translates host input events into the byte sequences expected by
//! terminal applications.
//!
//! # Keyboard Encoding
//!
//! Different keys produce different sequences depending on:
//! - Application cursor mode (DECCKM)
//! - Application keypad mode (DECKPAM/DECKPNM)
//! - Modifier keys (Shift, Ctrl, Alt)
//!
//! # Mouse Encoding
//!
//! Mouse events are encoded according to the active mouse mode:
//! - X10: Button press only
//! - Normal (VT200): Button press and release
//! - Button / any event: motion as well
//!
//! and the active coordinate encoding (default, UTF-8, SGR, urxvt).

use crate::core::{MouseEncoding, MouseMode, TermMode};

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
    };
    pub const ALT: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: true,
    };

    /// Get the modifier parameter for CSI sequences (1 + bitmask)
    /// Shift=1, Alt=2, Ctrl=4
    pub fn as_csi_param(&self) -> u8 {
        let mut param = 1;
        if self.shift {
            param += 1;
        }
        if self.alt {
            param += 2;
        }
        if self.ctrl {
            param += 4;
        }
        param
    }

    /// Check if any modifier is pressed
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

/// Keys the host can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Text-producing key, after the host's keyboard layout
    Char(char),

    // Cursor keys
    Up,
    Down,
    Left,
    Right,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Editing
    Backspace,
    Tab,
    Enter,
    Escape,

    // Keypad (when not in application mode, these are same as regular keys)
    KeypadEnter,
    KeypadPlus,
    KeypadMinus,
    KeypadMultiply,
    KeypadDivide,
    KeypadDecimal,
    Keypad0,
    Keypad1,
    Keypad2,
    Keypad3,
    Keypad4,
    Keypad5,
    Keypad6,
    Keypad7,
    Keypad8,
    Keypad9,

    /// A bare modifier or any other key with no terminal encoding
    Unmapped,
}

/// A key press from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// Encode a key event for the current terminal modes; empty when the key
/// sends nothing
pub fn encode_key_event(event: &KeyEvent, mode: TermMode) -> Vec<u8> {
    encode_key(
        event.key,
        event.modifiers,
        mode.contains(TermMode::APP_CURSOR),
        mode.contains(TermMode::APP_KEYPAD),
    )
}

/// Encode a key press into terminal escape sequence
pub fn encode_key(
    key: Key,
    modifiers: Modifiers,
    application_cursor: bool,
    application_keypad: bool,
) -> Vec<u8> {
    match key {
        Key::Char(c) => encode_char(c, modifiers),
        Key::Unmapped => Vec::new(),

        // Cursor keys
        Key::Up => encode_cursor_key(b'A', modifiers, application_cursor),
        Key::Down => encode_cursor_key(b'B', modifiers, application_cursor),
        Key::Right => encode_cursor_key(b'C', modifiers, application_cursor),
        Key::Left => encode_cursor_key(b'D', modifiers, application_cursor),

        // Navigation keys
        Key::Home => encode_special_key(1, b'~', modifiers),
        Key::Insert => encode_special_key(2, b'~', modifiers),
        Key::Delete => encode_special_key(3, b'~', modifiers),
        Key::End => encode_special_key(4, b'~', modifiers),
        Key::PageUp => encode_special_key(5, b'~', modifiers),
        Key::PageDown => encode_special_key(6, b'~', modifiers),

        // Function keys
        Key::F1 => encode_function_key(b'P', modifiers),
        Key::F2 => encode_function_key(b'Q', modifiers),
        Key::F3 => encode_function_key(b'R', modifiers),
        Key::F4 => encode_function_key(b'S', modifiers),
        Key::F5 => encode_special_key(15, b'~', modifiers),
        Key::F6 => encode_special_key(17, b'~', modifiers),
        Key::F7 => encode_special_key(18, b'~', modifiers),
        Key::F8 => encode_special_key(19, b'~', modifiers),
        Key::F9 => encode_special_key(20, b'~', modifiers),
        Key::F10 => encode_special_key(21, b'~', modifiers),
        Key::F11 => encode_special_key(23, b'~', modifiers),
        Key::F12 => encode_special_key(24, b'~', modifiers),

        // Editing keys
        Key::Backspace => {
            if modifiers.ctrl {
                vec![0x08] // Ctrl+Backspace = BS
            } else if modifiers.alt {
                vec![0x1b, 0x7f] // Alt+Backspace = ESC DEL
            } else {
                vec![0x7f] // DEL
            }
        }
        Key::Tab => {
            if modifiers.shift {
                b"\x1b[Z".to_vec() // Shift+Tab = CSI Z (backtab)
            } else {
                vec![0x09] // HT
            }
        }
        Key::Enter => {
            if modifiers.alt {
                vec![0x1b, 0x0d] // Alt+Enter
            } else {
                vec![0x0d] // CR
            }
        }
        Key::Escape => vec![0x1b],

        // Keypad keys
        Key::KeypadEnter => encode_keypad(b'M', b'\r', application_keypad),
        Key::KeypadPlus => encode_keypad(b'k', b'+', application_keypad),
        Key::KeypadMinus => encode_keypad(b'm', b'-', application_keypad),
        Key::KeypadMultiply => encode_keypad(b'j', b'*', application_keypad),
        Key::KeypadDivide => encode_keypad(b'o', b'/', application_keypad),
        Key::KeypadDecimal => encode_keypad(b'n', b'.', application_keypad),
        Key::Keypad0 => encode_keypad(b'p', b'0', application_keypad),
        Key::Keypad1 => encode_keypad(b'q', b'1', application_keypad),
        Key::Keypad2 => encode_keypad(b'r', b'2', application_keypad),
        Key::Keypad3 => encode_keypad(b's', b'3', application_keypad),
        Key::Keypad4 => encode_keypad(b't', b'4', application_keypad),
        Key::Keypad5 => encode_keypad(b'u', b'5', application_keypad),
        Key::Keypad6 => encode_keypad(b'v', b'6', application_keypad),
        Key::Keypad7 => encode_keypad(b'w', b'7', application_keypad),
        Key::Keypad8 => encode_keypad(b'x', b'8', application_keypad),
        Key::Keypad9 => encode_keypad(b'y', b'9', application_keypad),
    }
}

/// Encode a cursor key (arrow keys)
fn encode_cursor_key(code: u8, modifiers: Modifiers, application_mode: bool) -> Vec<u8> {
    if modifiers.any() {
        // With modifiers: CSI 1 ; modifier code
        let param = modifiers.as_csi_param();
        format!("\x1b[1;{}{}", param, code as char).into_bytes()
    } else if application_mode {
        // Application mode: SS3 code
        vec![0x1b, b'O', code]
    } else {
        // Normal mode: CSI code
        vec![0x1b, b'[', code]
    }
}

/// Encode a special key (Home, End, PgUp, PgDn, Insert, Delete, F5-F12)
fn encode_special_key(number: u8, final_byte: u8, modifiers: Modifiers) -> Vec<u8> {
    if modifiers.any() {
        let param = modifiers.as_csi_param();
        format!("\x1b[{};{}{}", number, param, final_byte as char).into_bytes()
    } else {
        format!("\x1b[{}{}", number, final_byte as char).into_bytes()
    }
}

/// F1-F4 use SS3 unless modified
fn encode_function_key(code: u8, modifiers: Modifiers) -> Vec<u8> {
    if modifiers.any() {
        let param = modifiers.as_csi_param();
        format!("\x1b[1;{}{}", param, code as char).into_bytes()
    } else {
        vec![0x1b, b'O', code]
    }
}

fn encode_keypad(app_code: u8, normal_code: u8, application_mode: bool) -> Vec<u8> {
    if application_mode {
        vec![0x1b, b'O', app_code]
    } else {
        vec![normal_code]
    }
}

/// Control byte for Ctrl plus `c`, when there is one
fn control_byte(c: char) -> Option<u8> {
    match c {
        'a'..='z' | 'A'..='Z' => Some((c.to_ascii_uppercase() as u8) - b'@'),
        '@' | ' ' | '2' => Some(0x00),
        '[' | '3' => Some(0x1b),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '7' | '/' => Some(0x1f),
        '?' | '8' => Some(0x7f),
        _ => None,
    }
}

/// Encode a character with modifiers
pub fn encode_char(c: char, modifiers: Modifiers) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(5);
    if modifiers.alt {
        // Alt sends an ESC prefix
        bytes.push(0x1b);
    }
    match control_byte(c).filter(|_| modifiers.ctrl) {
        Some(byte) => bytes.push(byte),
        None => crate::utf8::encode_into(c, &mut bytes),
    }
    bytes
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    /// Motion with no button held
    None,
    WheelUp,
    WheelDown,
    WheelLeft,
    WheelRight,
}

impl MouseButton {
    pub fn is_wheel(&self) -> bool {
        matches!(
            self,
            MouseButton::WheelUp
                | MouseButton::WheelDown
                | MouseButton::WheelLeft
                | MouseButton::WheelRight
        )
    }

    fn code(&self) -> u32 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
            MouseButton::None => 3,
            MouseButton::WheelUp => 64,
            MouseButton::WheelDown => 65,
            MouseButton::WheelLeft => 66,
            MouseButton::WheelRight => 67,
        }
    }
}

/// Mouse event type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press,
    Release,
    Move,
}

/// A mouse event in cell coordinates of the visible grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub button: MouseButton,
    pub col: usize,
    pub row: usize,
    pub modifiers: Modifiers,
    /// 1 for a single click, 2 for double, 3 for triple
    pub click_count: u32,
}

impl MouseEvent {
    pub fn new(kind: MouseEventKind, button: MouseButton, col: usize, row: usize) -> Self {
        Self {
            kind,
            button,
            col,
            row,
            modifiers: Modifiers::NONE,
            click_count: 1,
        }
    }

    pub fn press(button: MouseButton, col: usize, row: usize) -> Self {
        Self::new(MouseEventKind::Press, button, col, row)
    }

    pub fn release(button: MouseButton, col: usize, row: usize) -> Self {
        Self::new(MouseEventKind::Release, button, col, row)
    }

    pub fn motion(button: MouseButton, col: usize, row: usize) -> Self {
        Self::new(MouseEventKind::Move, button, col, row)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_clicks(mut self, click_count: u32) -> Self {
        self.click_count = click_count;
        self
    }
}

/// Encode a mouse event; `None` when the active mode does not report it
pub fn encode_mouse(event: &MouseEvent, mode: MouseMode, encoding: MouseEncoding) -> Option<Vec<u8>> {
    match mode {
        MouseMode::None => return None,
        MouseMode::X10 => {
            // X10 only reports button presses, without modifiers
            if event.kind != MouseEventKind::Press || event.button.is_wheel() {
                return None;
            }
        }
        MouseMode::Normal => {
            if event.kind == MouseEventKind::Move {
                return None;
            }
        }
        MouseMode::ButtonMotion => {
            // Motion only while a button is held
            if event.kind == MouseEventKind::Move && event.button == MouseButton::None {
                return None;
            }
        }
        MouseMode::AnyMotion => {}
    }
    // Wheels have no release
    if event.kind == MouseEventKind::Release && event.button.is_wheel() {
        return None;
    }

    let mut code = event.button.code();
    if mode != MouseMode::X10 {
        if event.modifiers.shift {
            code |= 4;
        }
        if event.modifiers.alt {
            code |= 8;
        }
        if event.modifiers.ctrl {
            code |= 16;
        }
    }
    if event.kind == MouseEventKind::Move {
        code |= 32;
    }
    // Only SGR can say which button was released
    let legacy_code = if event.kind == MouseEventKind::Release {
        (code & !0b11) | 3
    } else {
        code
    };

    let col = event.col as u32 + 1;
    let row = event.row as u32 + 1;

    match encoding {
        MouseEncoding::X10 => {
            // CSI M Cb Cx Cy, each offset by 32 and limited to one byte
            let byte = |v: u32| (v.min(223) + 32) as u8;
            Some(vec![0x1b, b'[', b'M', byte(legacy_code), byte(col), byte(row)])
        }
        MouseEncoding::Utf8 => {
            // Like X10, but values past 95 are sent as UTF-8 runes
            let mut out = b"\x1b[M".to_vec();
            for v in [legacy_code, col.min(2015), row.min(2015)] {
                let rune = char::from_u32(v + 32)?;
                crate::utf8::encode_into(rune, &mut out);
            }
            Some(out)
        }
        MouseEncoding::Sgr => {
            // CSI < Pb ; Px ; Py M/m
            let final_char = if event.kind == MouseEventKind::Release {
                'm'
            } else {
                'M'
            };
            Some(format!("\x1b[<{};{};{}{}", code, col, row, final_char).into_bytes())
        }
        MouseEncoding::Urxvt => {
            // CSI Pb ; Px ; Py M
            Some(format!("\x1b[{};{};{}M", legacy_code + 32, col, row).into_bytes())
        }
    }
}

/// Encode focus in/out events
pub fn encode_focus(focused: bool) -> Vec<u8> {
    if focused {
        b"\x1b[I".to_vec() // CSI I = focus in
    } else {
        b"\x1b[O".to_vec() // CSI O = focus out
    }
}

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

/// Encode pasted text, wrapping it when bracketed paste is on
///
/// Bracket markers inside the text are removed so the payload cannot end
/// the paste early.
pub fn encode_paste(text: &str, bracketed: bool) -> Vec<u8> {
    if !bracketed {
        return text.as_bytes().to_vec();
    }
    let payload = text.replace(PASTE_END, "").replace(PASTE_START, "");
    let mut out = Vec::with_capacity(payload.len() + PASTE_START.len() + PASTE_END.len());
    out.extend_from_slice(PASTE_START.as_bytes());
    out.extend_from_slice(payload.as_bytes());
    out.extend_from_slice(PASTE_END.as_bytes());
    out
}
