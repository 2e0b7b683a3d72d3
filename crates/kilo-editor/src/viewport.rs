//! Viewport: which part of the buffer is on screen, and the frame that
//! shows it.
//!
//! The screen is split into the text area (all rows but the last two), a
//! status bar and a message bar:
//!
//! ```text
//! ┌───────────────────────────────┐
//! │ text rows, scrolled by        │ ← rows
//! │ row_offset / col_offset       │
//! │ ~                             │
//! ├───────────────────────────────┤
//! │ name - 12 lines    NORMAL | 3/12 │ ← inverse video
//! │ message or prompt             │
//! └───────────────────────────────┘
//! ```
//!
//! The viewport holds only scroll state. It doesn't own the buffer or the
//! cursor; [`render`](Viewport::render) takes a [`Frame`] describing
//! everything that goes on screen and composes the whole thing into an
//! [`OutputBuffer`] before anything is written.

use std::io;

use kilo_term::ansi::{self, Color};
use kilo_term::output::OutputBuffer;
use kilo_term::terminal::Size;
use unicode_width::UnicodeWidthChar;

use crate::buffer::Buffer;
use crate::mode::Mode;
use crate::position::Position;
use crate::row::Row;

/// Shown in the welcome banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Longest file name the status bar shows.
const NAME_WIDTH: usize = 20;

/// Everything one frame shows besides the scroll state.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub buffer: &'a Buffer,
    pub cursor: Position,
    pub mode: Mode,
    /// Message bar text: the open prompt, or a status message still alive.
    pub message: Option<&'a str>,
    pub highlight_digits: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Text rows on screen.
    rows: usize,
    /// Screen columns.
    cols: usize,
    row_offset: usize,
    col_offset: usize,
}

impl Viewport {
    /// A viewport with `rows` text rows and `cols` columns.
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_offset: 0,
            col_offset: 0,
        }
    }

    /// A viewport for a whole terminal, keeping two rows for the bars.
    #[must_use]
    pub const fn for_terminal(size: Size) -> Self {
        Self::new(size.text_rows(), size.cols as usize)
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    #[inline]
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    /// Put the offsets back, e.g. when a search is cancelled.
    pub const fn set_offsets(&mut self, row_offset: usize, col_offset: usize) {
        self.row_offset = row_offset;
        self.col_offset = col_offset;
    }

    // -- Scrolling ----------------------------------------------------------

    /// Shift the offsets by the least amount that puts the cursor on screen.
    pub fn scroll(&mut self, buffer: &Buffer, cursor: Position) {
        let rx = cursor_rx(buffer, cursor);

        if self.rows > 0 {
            if cursor.y < self.row_offset {
                self.row_offset = cursor.y;
            }
            if cursor.y >= self.row_offset + self.rows {
                self.row_offset = cursor.y - self.rows + 1;
            }
        }
        if self.cols > 0 {
            if rx < self.col_offset {
                self.col_offset = rx;
            }
            if rx >= self.col_offset + self.cols {
                self.col_offset = rx - self.cols + 1;
            }
        }
    }

    // -- Rendering ----------------------------------------------------------

    /// Compose one full frame into `out`.
    ///
    /// # Errors
    ///
    /// Only if writing to `out` fails, which an in-memory buffer never does.
    pub fn render(&self, frame: &Frame<'_>, out: &mut OutputBuffer) -> io::Result<()> {
        ansi::cursor_hide(out)?;
        ansi::cursor_home(out)?;

        self.draw_rows(frame, out)?;
        self.draw_status_bar(frame, out)?;
        self.draw_message_bar(frame, out)?;

        ansi::cursor_to(
            out,
            cursor_rx(frame.buffer, frame.cursor).saturating_sub(self.col_offset),
            frame.cursor.y.saturating_sub(self.row_offset),
        )?;
        ansi::cursor_show(out)
    }

    fn draw_rows(&self, frame: &Frame<'_>, out: &mut OutputBuffer) -> io::Result<()> {
        let buffer = frame.buffer;
        for y in 0..self.rows {
            match buffer.row(y + self.row_offset) {
                Some(row) => self.draw_text(row, frame.highlight_digits, out)?,
                None if buffer.is_empty() && y == self.rows / 3 => self.draw_banner(out),
                None => out.push_char('~'),
            }
            ansi::erase_line(out)?;
            out.push_str("\r\n");
        }
        Ok(())
    }

    fn draw_text(&self, row: &Row, highlight: bool, out: &mut OutputBuffer) -> io::Result<()> {
        let visible = row.visible(self.col_offset, self.cols);
        if !highlight {
            out.push_str(&visible);
            return Ok(());
        }

        let mut in_number = false;
        for ch in visible.chars() {
            let digit = ch.is_ascii_digit();
            if digit != in_number {
                ansi::fg(out, if digit { Color::Red } else { Color::Default })?;
                in_number = digit;
            }
            out.push_char(ch);
        }
        if in_number {
            ansi::fg(out, Color::Default)?;
        }
        Ok(())
    }

    fn draw_banner(&self, out: &mut OutputBuffer) {
        let banner = format!("Kilo editor -- version {VERSION}");
        let banner: String = banner.chars().take(self.cols).collect();
        let mut padding = (self.cols - banner.chars().count()) / 2;
        if padding > 0 {
            out.push_char('~');
            padding -= 1;
        }
        for _ in 0..padding {
            out.push_char(' ');
        }
        out.push_str(&banner);
    }

    fn draw_status_bar(&self, frame: &Frame<'_>, out: &mut OutputBuffer) -> io::Result<()> {
        let buffer = frame.buffer;
        let name = buffer.display_name();
        let left = format!(
            "{name:.NAME_WIDTH$} - {} lines{}",
            buffer.row_count(),
            if buffer.is_dirty() { " (modified)" } else { "" },
        );
        let right = format!(
            "{} | {}/{}",
            frame.mode,
            frame.cursor.y + 1,
            buffer.row_count()
        );

        ansi::inverse(out)?;
        let (left, mut len) = fit(&left, self.cols);
        out.push_str(&left);
        let right_len = fit(&right, usize::MAX).1;
        while len < self.cols {
            if self.cols - len == right_len {
                out.push_str(&right);
                break;
            }
            out.push_char(' ');
            len += 1;
        }
        ansi::reset(out)?;
        out.push_str("\r\n");
        Ok(())
    }

    fn draw_message_bar(&self, frame: &Frame<'_>, out: &mut OutputBuffer) -> io::Result<()> {
        ansi::erase_line(out)?;
        if let Some(message) = frame.message {
            out.push_str(&fit(message, self.cols).0);
        }
        Ok(())
    }
}

/// Display column of `cursor` in its row; 0 on the past-the-end row.
#[must_use]
pub fn cursor_rx(buffer: &Buffer, cursor: Position) -> usize {
    buffer.row(cursor.y).map_or(0, |row| row.rx_from_cx(cursor.x))
}

/// The longest prefix of `s` at most `cols` terminal cells wide, and its
/// width.
fn fit(s: &str, cols: usize) -> (String, usize) {
    let mut width = 0;
    let mut shown = String::new();
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > cols {
            break;
        }
        width += w;
        shown.push(ch);
    }
    (shown, width)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
