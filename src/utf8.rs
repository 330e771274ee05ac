//! UTF-8 codec for terminal byte streams
//!
//! PTY output arrives in arbitrary chunks, so a multi-byte sequence can be
//! split across two reads. [`decode`] reports such a tail as
//! [`Decoded::Incomplete`] so the caller can keep the bytes for the next
//! chunk, and [`Utf8Decoder`] does that bookkeeping for the parser.
//!
//! Invalid input never stalls the stream: a bad sequence yields U+FFFD and
//! consumes exactly one byte, so decoding resynchronizes on the next byte.

/// The Unicode replacement character
pub const REPLACEMENT: char = '\u{FFFD}';

/// Longest UTF-8 sequence
pub const MAX_LEN: usize = 4;

/// Outcome of decoding the front of a byte window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A valid rune and the number of bytes it occupied
    Rune { rune: char, len: usize },
    /// The window ends inside a sequence that may still be valid; nothing consumed
    Incomplete,
    /// Invalid sequence; yields U+FFFD and consumes one byte
    Invalid,
}

impl Decoded {
    /// Bytes consumed from the window
    pub fn consumed(&self) -> usize {
        match self {
            Decoded::Rune { len, .. } => *len,
            Decoded::Incomplete => 0,
            Decoded::Invalid => 1,
        }
    }

    /// The rune produced, if any (U+FFFD for invalid input)
    pub fn rune(&self) -> Option<char> {
        match self {
            Decoded::Rune { rune, .. } => Some(*rune),
            Decoded::Incomplete => None,
            Decoded::Invalid => Some(REPLACEMENT),
        }
    }
}

/// Expected sequence length for a lead byte, or `None` if it cannot start one
fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        // 0xC0 and 0xC1 can only produce overlong encodings
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// Smallest code point that may be encoded with `len` bytes
fn min_for_len(len: usize) -> u32 {
    match len {
        2 => 0x80,
        3 => 0x800,
        4 => 0x1_0000,
        _ => 0,
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Decode one rune from the front of `bytes`
pub fn decode(bytes: &[u8]) -> Decoded {
    let Some(&lead) = bytes.first() else {
        return Decoded::Incomplete;
    };

    let Some(len) = sequence_len(lead) else {
        return Decoded::Invalid;
    };
    if len == 1 {
        return Decoded::Rune {
            rune: lead as char,
            len: 1,
        };
    }

    let mut cp = u32::from(lead) & (0x7F >> len);
    for i in 1..len {
        let Some(&byte) = bytes.get(i) else {
            return Decoded::Incomplete;
        };
        if !is_continuation(byte) {
            return Decoded::Invalid;
        }
        cp = (cp << 6) | u32::from(byte & 0x3F);
    }

    if cp < min_for_len(len) {
        return Decoded::Invalid;
    }
    // char::from_u32 rejects surrogates and anything past U+10FFFF
    match char::from_u32(cp) {
        Some(rune) => Decoded::Rune { rune, len },
        None => Decoded::Invalid,
    }
}

/// A rune encoded into a stack buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedRune {
    buf: [u8; MAX_LEN],
    len: usize,
}

impl EncodedRune {
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::ops::Deref for EncodedRune {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Encode a rune as UTF-8
pub fn encode(rune: char) -> EncodedRune {
    let mut buf = [0u8; MAX_LEN];
    let len = rune.encode_utf8(&mut buf).len();
    EncodedRune { buf, len }
}

/// Append the UTF-8 encoding of `rune` to `out`
pub fn encode_into(rune: char, out: &mut Vec<u8>) {
    out.extend_from_slice(encode(rune).as_bytes());
}

/// Streaming decoder that carries a partial sequence across chunks
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    pending: [u8; MAX_LEN],
    pending_len: usize,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any partially received sequence
    pub fn reset(&mut self) {
        self.pending_len = 0;
    }

    /// Whether bytes of an unfinished sequence are being held
    pub fn is_pending(&self) -> bool {
        self.pending_len > 0
    }

    /// Decode `data`, calling `emit` for every rune produced
    pub fn feed(&mut self, mut data: &[u8], mut emit: impl FnMut(char)) {
        // Finish a sequence left over from the previous chunk one byte at a
        // time; the window never grows past MAX_LEN.
        while self.pending_len > 0 {
            let Some((&byte, rest)) = data.split_first() else {
                return;
            };
            self.pending[self.pending_len] = byte;
            self.pending_len += 1;

            match decode(&self.pending[..self.pending_len]) {
                Decoded::Incomplete => {
                    data = rest;
                }
                Decoded::Rune { rune, .. } => {
                    emit(rune);
                    self.pending_len = 0;
                    data = rest;
                }
                Decoded::Invalid => {
                    // Every held byte becomes a replacement, matching an
                    // unsplit decode; the new byte is reconsidered below.
                    for _ in 1..self.pending_len {
                        emit(REPLACEMENT);
                    }
                    self.pending_len = 0;
                }
            }
        }

        while !data.is_empty() {
            match decode(data) {
                Decoded::Rune { rune, len } => {
                    emit(rune);
                    data = &data[len..];
                }
                Decoded::Invalid => {
                    emit(REPLACEMENT);
                    data = &data[1..];
                }
                Decoded::Incomplete => {
                    self.pending[..data.len()].copy_from_slice(data);
                    self.pending_len = data.len();
                    return;
                }
            }
        }
    }
}
