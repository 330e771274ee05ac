//! Character set designation and translation
//!
//! Four slots G0..G3 hold a designated set; SO/SI pick which one maps onto
//! GL and SS2/SS3 borrow G2/G3 for a single rune. Only the sets still seen
//! in practice are implemented: US ASCII, UK and DEC special graphics.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Charset {
    #[default]
    Ascii,
    /// Line drawing
    DecSpecialGraphics,
    /// Like ASCII with `#` replaced by `£`
    Uk,
}

impl Charset {
    /// Map the final byte of `ESC ( F` and friends to a set
    ///
    /// Unknown designations fall back to ASCII.
    pub fn from_designator(final_char: char) -> Charset {
        match final_char {
            '0' | '2' => Charset::DecSpecialGraphics,
            'A' => Charset::Uk,
            _ => Charset::Ascii,
        }
    }

    pub fn translate(self, rune: char) -> char {
        match self {
            Charset::Ascii => rune,
            Charset::DecSpecialGraphics => dec_special_graphics(rune),
            Charset::Uk if rune == '#' => '£',
            Charset::Uk => rune,
        }
    }
}

fn dec_special_graphics(rune: char) -> char {
    match rune {
        '`' => '◆',
        'a' => '▒',
        'b' => '␉',
        'c' => '␌',
        'd' => '␍',
        'e' => '␊',
        'f' => '°',
        'g' => '±',
        'h' => '␤',
        'i' => '␋',
        'j' => '┘',
        'k' => '┐',
        'l' => '┌',
        'm' => '└',
        'n' => '┼',
        'o' => '⎺',
        'p' => '⎻',
        'q' => '─',
        'r' => '⎼',
        's' => '⎽',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'x' => '│',
        'y' => '≤',
        'z' => '≥',
        '{' => 'π',
        '|' => '≠',
        '}' => '£',
        '~' => '·',
        _ => rune,
    }
}

/// Designated sets plus the GL selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharsetState {
    slots: [Charset; 4],
    /// Slot mapped onto GL (0 after SI, 1 after SO)
    active: usize,
    /// Slot borrowed for the next rune only
    single_shift: Option<usize>,
}

impl CharsetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Designate `charset` into slot G0..G3; out-of-range slots are ignored
    pub fn designate(&mut self, slot: usize, charset: Charset) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = charset;
        }
    }

    pub fn slot(&self, slot: usize) -> Charset {
        self.slots.get(slot).copied().unwrap_or_default()
    }

    /// Map slot G0..G3 onto GL (SI, SO, LS2, LS3)
    pub fn invoke(&mut self, slot: usize) {
        if slot < self.slots.len() {
            self.active = slot;
            self.single_shift = None;
        }
    }

    /// SS2 / SS3
    pub fn single_shift(&mut self, slot: usize) {
        if slot < self.slots.len() {
            self.single_shift = Some(slot);
        }
    }

    pub fn current(&self) -> Charset {
        self.slots[self.single_shift.unwrap_or(self.active)]
    }

    /// Translate a printable rune, consuming any pending single shift
    pub fn translate(&mut self, rune: char) -> char {
        let charset = self.current();
        self.single_shift = None;
        charset.translate(rune)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ascii() {
        let mut state = CharsetState::new();
        assert_eq!(state.current(), Charset::Ascii);
        assert_eq!(state.translate('q'), 'q');
    }

    #[test]
    fn test_dec_graphics_in_g0() {
        let mut state = CharsetState::new();
        state.designate(0, Charset::from_designator('0'));
        assert_eq!(state.translate('q'), '─');
        assert_eq!(state.translate('x'), '│');
        assert_eq!(state.translate('l'), '┌');
        assert_eq!(state.translate('A'), 'A');
    }

    #[test]
    fn test_shift_out_and_in() {
        let mut state = CharsetState::new();
        state.designate(1, Charset::DecSpecialGraphics);
        assert_eq!(state.translate('j'), 'j');
        state.invoke(1);
        assert_eq!(state.translate('j'), '┘');
        state.invoke(0);
        assert_eq!(state.translate('j'), 'j');
    }

    #[test]
    fn test_single_shift_applies_once() {
        let mut state = CharsetState::new();
        state.designate(2, Charset::Uk);
        state.single_shift(2);
        assert_eq!(state.translate('#'), '£');
        assert_eq!(state.translate('#'), '#');
    }

    #[test]
    fn test_designators() {
        assert_eq!(Charset::from_designator('B'), Charset::Ascii);
        assert_eq!(Charset::from_designator('A'), Charset::Uk);
        assert_eq!(Charset::from_designator('2'), Charset::DecSpecialGraphics);
        assert_eq!(Charset::from_designator('%'), Charset::Ascii);
    }

    #[test]
    fn test_out_of_range_slot_ignored() {
        let mut state = CharsetState::new();
        state.designate(7, Charset::Uk);
        state.invoke(9);
        assert_eq!(state.current(), Charset::Ascii);
        assert_eq!(state.slot(7), Charset::Ascii);
    }
}
