//! A single line of text, stored raw and cooked.
//!
//! `raw` is exactly what the file holds. `cooked` is what the terminal
//! gets: tabs expanded to the next multiple of [`TAB_STOP`] display columns,
//! other ASCII control characters replaced by `?` so they can never be
//! interpreted by the terminal. Cooked text is derived; every mutation of
//! `raw` recomputes it.
//!
//! Column vocabulary:
//! - **cx**: char index into `raw` (what [`Position::x`](crate::position::Position) holds)
//! - **rx**: display column in `cooked` (what the screen shows)

use unicode_width::UnicodeWidthChar;

/// Display columns per tab stop.
pub const TAB_STOP: usize = 8;

/// Byte offset of the `at`-th char, or the string length past the end.
fn byte_index_at(s: &str, at: usize) -> usize {
    s.char_indices().nth(at).map_or(s.len(), |(i, _)| i)
}

/// Display width of a non-tab char once cooked.
fn cooked_width(ch: char) -> usize {
    if ch.is_ascii_control() {
        1
    } else {
        ch.width().unwrap_or(0)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Row {
    raw: String,
    cooked: String,
    /// Length of `raw` in chars.
    len: usize,
}

impl Row {
    pub fn new(line: impl Into<String>) -> Self {
        let mut row = Self {
            raw: line.into(),
            cooked: String::new(),
            len: 0,
        };
        row.cook();
        row
    }

    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[inline]
    #[must_use]
    pub fn cooked(&self) -> &str {
        &self.cooked
    }

    /// Length in chars.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn cook(&mut self) {
        self.cooked.clear();
        self.len = 0;
        let mut rx = 0;
        for ch in self.raw.chars() {
            if ch == '\t' {
                let stop = rx + TAB_STOP - (rx % TAB_STOP);
                while rx < stop {
                    self.cooked.push(' ');
                    rx += 1;
                }
            } else if ch.is_ascii_control() {
                self.cooked.push('?');
                rx += 1;
            } else {
                self.cooked.push(ch);
                rx += cooked_width(ch);
            }
            self.len += 1;
        }
    }

    /// Display column of char index `cx`. Indexes past the end count as
    /// the end of the row.
    #[must_use]
    pub fn rx_from_cx(&self, cx: usize) -> usize {
        self.raw.chars().take(cx).fold(0, |rx, ch| {
            if ch == '\t' {
                rx + TAB_STOP - (rx % TAB_STOP)
            } else {
                rx + cooked_width(ch)
            }
        })
    }

    /// The part of the cooked row between display columns `offset` and
    /// `offset + width`. A wide char cut by either edge is dropped; a
    /// char cut on the left edge leaves blank cells so the rest stays
    /// aligned.
    #[must_use]
    pub fn visible(&self, offset: usize, width: usize) -> String {
        let end = offset + width;
        let mut out = String::new();
        let mut col = 0;
        for ch in self.cooked.chars() {
            let w = cooked_width(ch);
            let next = col + w;
            if next > end {
                break;
            }
            if col >= offset {
                out.push(ch);
            } else if next > offset {
                for _ in offset..next {
                    out.push(' ');
                }
            }
            col = next;
        }
        out
    }

    // -- editing (all positions are char indices into raw) --

    /// Insert `ch` at `at`, or append when `at >= len()`.
    pub fn insert_char(&mut self, at: usize, ch: char) {
        let idx = byte_index_at(&self.raw, at);
        self.raw.insert(idx, ch);
        self.cook();
    }

    /// Remove and return the char at `at`.
    pub fn delete_char(&mut self, at: usize) -> Option<char> {
        if at >= self.len {
            return None;
        }
        let idx = byte_index_at(&self.raw, at);
        let ch = self.raw.remove(idx);
        self.cook();
        Some(ch)
    }

    /// Append `s` to the end.
    pub fn append(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.raw.push_str(s);
        self.cook();
    }

    /// Split at char index `at`: `self` keeps `[..at]`, the returned row
    /// holds `[at..]`.
    pub fn split_off(&mut self, at: usize) -> Self {
        let idx = byte_index_at(&self.raw, at);
        let tail = self.raw.split_off(idx);
        self.cook();
        Self::new(tail)
    }

    /// Char index of the first occurrence of `query` starting at or after
    /// char `from`.
    #[must_use]
    pub fn find_from(&self, query: &str, from: usize) -> Option<usize> {
        if from > self.len {
            return None;
        }
        let start = byte_index_at(&self.raw, from);
        self.raw[start..]
            .find(query)
            .map(|b| from + self.raw[start..start + b].chars().count())
    }

    /// Char index of the last occurrence of `query` that starts strictly
    /// before char `before`.
    #[must_use]
    pub fn rfind_before(&self, query: &str, before: usize) -> Option<usize> {
        self.raw
            .char_indices()
            .take(before)
            .enumerate()
            .filter(|(_, (b, _))| self.raw[*b..].starts_with(query))
            .last()
            .map(|(cx, _)| cx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
