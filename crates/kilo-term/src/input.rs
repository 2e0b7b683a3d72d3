// SPDX-License-Identifier: MIT
//
// Terminal input decoding.
//
// Turns raw stdin bytes into Unicode scalars. Escape sequences are NOT
// interpreted here: ESC, `[`, `A` come out as three separate chars and the
// editor's key interpreter decides what they mean. That keeps this layer
// dumb and lets the keymap own every multi-key binding.
//
// A multi-byte character can be split across two `read()` calls, so the
// decoder keeps the incomplete tail and prepends it to the next chunk.
// Bytes that can never start or continue a valid sequence are dropped.

// ─── Utf8Decoder ────────────────────────────────────────────────────────────

/// Incremental UTF-8 decoder over stdin byte chunks.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    /// Leading bytes of a character whose remaining bytes haven't arrived.
    pending: Vec<u8>,
}

/// Outcome of decoding at one position in the buffer.
enum Decoded {
    /// A complete scalar and the number of bytes it consumed.
    Char(char, usize),
    /// Need more bytes to decide.
    Incomplete,
    /// Invalid byte(s) to skip.
    Skip(usize),
}

impl Utf8Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an incomplete character is waiting for more bytes.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Feed a chunk and return every scalar that is now complete.
    pub fn decode(&mut self, data: &[u8]) -> Vec<char> {
        self.pending.extend_from_slice(data);
        let mut chars = Vec::with_capacity(self.pending.len());
        let mut pos = 0;

        while pos < self.pending.len() {
            match decode_one(&self.pending[pos..]) {
                Decoded::Char(ch, len) => {
                    chars.push(ch);
                    pos += len;
                }
                Decoded::Incomplete => break,
                Decoded::Skip(len) => {
                    tracing::trace!(byte = self.pending[pos], "dropping invalid utf-8 byte");
                    pos += len;
                }
            }
        }

        self.pending.drain(..pos);
        chars
    }
}

fn decode_one(buf: &[u8]) -> Decoded {
    let expected = utf8_char_len(buf[0]);

    if expected == 0 {
        return Decoded::Skip(1);
    }

    // Validate whatever continuation bytes we have so far, so a bad
    // byte is rejected right away instead of waiting for more input.
    let available = buf.len().min(expected);
    for &b in &buf[1..available] {
        if b & 0xC0 != 0x80 {
            return Decoded::Skip(1);
        }
    }
    if buf.len() < expected {
        return Decoded::Incomplete;
    }

    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Decoded::Skip(1), |ch| Decoded::Char(ch, expected))
}

/// Expected byte length of a UTF-8 sequence from its lead byte.
/// Returns 0 for continuation or invalid lead bytes.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
