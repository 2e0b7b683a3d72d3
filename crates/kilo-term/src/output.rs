// SPDX-License-Identifier: MIT
//
// Output buffering for whole-frame writes.
//
// OutputBuffer accumulates all ANSI bytes of a frame in memory so the
// entire frame can be written in a single write() call. The terminal never
// sees a half-drawn screen: no tearing, no cursor flicker between rows.

use std::io::{self, Write};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
///
/// Instead of dozens of small writes per frame (cursor moves, row text,
/// erase-line sequences), everything goes into this buffer first. A single
/// flush at frame end writes it all at once.
///
/// Default capacity: 16 KB, enough for most frames without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The accumulated frame as text. Frames are composed from `&str`
    /// pieces, so this is lossless in practice.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    /// Append a string slice.
    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    /// Append a single character as UTF-8.
    #[inline]
    pub fn push_char(&mut self, ch: char) {
        let mut enc = [0u8; 4];
        self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_is_empty() {
        let out = OutputBuffer::new();
        assert!(out.is_empty());
        assert_eq!(out.len(), 0);
    }

    #[test]
    fn write_trait_appends() {
        let mut out = OutputBuffer::new();
        out.write_all(b"\x1b[H").unwrap();
        write!(out, "{}", 42).unwrap();
        assert_eq!(out.as_bytes(), b"\x1b[H42");
    }

    #[test]
    fn push_str_and_char() {
        let mut out = OutputBuffer::new();
        out.push_str("ab");
        out.push_char('é');
        out.push_char('~');
        assert_eq!(out.to_string_lossy(), "abé~");
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut out = OutputBuffer::new();
        out.push_str("hello");
        let cap = out.buf.capacity();
        out.clear();
        assert!(out.is_empty());
        assert_eq!(out.buf.capacity(), cap);
    }

    #[test]
    fn flush_to_writes_whole_frame_and_clears() {
        let mut out = OutputBuffer::new();
        out.push_str("\x1b[?25l");
        out.push_str("frame");
        out.push_str("\x1b[?25h");

        let mut sink = Vec::new();
        out.flush_to(&mut sink).unwrap();

        assert_eq!(sink, b"\x1b[?25lframe\x1b[?25h");
        assert!(out.is_empty());
    }

    #[test]
    fn flush_to_empty_is_noop() {
        let mut out = OutputBuffer::new();
        let mut sink = Vec::new();
        out.flush_to(&mut sink).unwrap();
        assert!(sink.is_empty());
    }
}
