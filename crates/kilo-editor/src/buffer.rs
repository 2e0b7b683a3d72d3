//! Text buffer: the rows being edited plus file metadata.
//!
//! A `Buffer` is an ordered list of [`Row`]s, an optional file path and a
//! dirty flag. Positions are `(x, y)` with `x` a char index into the raw
//! row. `y == row_count()` is the empty line past the end; typing there
//! appends a row.
//!
//! # Design choices
//!
//! - **Edits return movements.** The buffer never owns a cursor. Every edit
//!   answers with the [`Movement`]s that leave the cursor where the user
//!   expects, and the caller applies them through
//!   [`Cursor::apply`](crate::cursor::Cursor::apply).
//!
//! - **Loading never fails.** A missing or unreadable file opens as an empty
//!   buffer bound to that path, so `kilo new.txt` creates the file on save.
//!   Invalid UTF-8 is replaced lossily.
//!
//! - **Saves are atomic.** The text goes to a temp file next to the target
//!   and is renamed over it, so a failed write never truncates the original.
//!   Every row is written with a CRLF terminator.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::Result;
use crate::position::{Movement, Position};
use crate::row::Row;

/// Terminator written after every row on save.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Status bar name for a buffer without a path.
pub const NO_NAME: &str = "[No Name]";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    rows: Vec<Row>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// An empty buffer with no path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `text` into rows on `\n` or `\r\n`. Only the terminator's
    /// `\r` is dropped. A final newline does not produce an extra empty row.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rows: text.lines().map(Row::new).collect(),
            path: None,
            dirty: false,
        }
    }

    /// Load `path`. If it can't be read the buffer starts empty, still bound
    /// to `path`.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let mut buffer = match fs::read(path) {
            Ok(bytes) => {
                let buffer = Self::from_text(&String::from_utf8_lossy(&bytes));
                tracing::info!(path = %path.display(), rows = buffer.row_count(), "loaded file");
                buffer
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read file, starting empty");
                Self::new()
            }
        };
        buffer.path = Some(path.to_path_buf());
        buffer
    }

    // -- Access -------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn row(&self, y: usize) -> Option<&Row> {
        self.rows.get(y)
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length in chars of row `y`; 0 for the past-the-end row.
    #[inline]
    #[must_use]
    pub fn row_len(&self, y: usize) -> usize {
        self.rows.get(y).map_or(0, Row::len)
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The path as shown in the status bar, or `[No Name]`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| NO_NAME.to_string(), |p| p.display().to_string())
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `ch` at `pos`. On the past-the-end row an empty row is
    /// appended first. Returns `None` if `pos` is below the past-the-end row.
    pub fn insert_char(&mut self, ch: char, pos: Position) -> Option<Movement> {
        if pos.y == self.rows.len() {
            self.rows.push(Row::default());
        }
        let row = self.rows.get_mut(pos.y)?;
        row.insert_char(pos.x.min(row.len()), ch);
        self.dirty = true;
        Some(Movement::Right(1))
    }

    /// Break the row at `pos`: the text before `pos.x` becomes a new row at
    /// `pos.y` and the rest moves down. On the past-the-end row an empty row
    /// is appended. The cursor lands at the start of the remainder.
    pub fn insert_newline_after(&mut self, pos: Position) -> Vec<Movement> {
        let row_count = self.rows.len();
        match self.rows.get_mut(pos.y) {
            Some(row) => {
                let tail = row.split_off(pos.x.min(row.len()));
                let head = std::mem::replace(row, tail);
                self.rows.insert(pos.y, head);
            }
            None if pos.y == row_count => self.rows.push(Row::default()),
            None => return Vec::new(),
        }
        self.dirty = true;
        vec![Movement::Down(1), Movement::Left(pos.x)]
    }

    /// Backspace at `pos`: remove the char before it, or join the row onto
    /// the previous one at column 0. No-op at the origin and on the
    /// past-the-end row.
    pub fn delete_char_before(&mut self, pos: Position) -> Vec<Movement> {
        if pos.y >= self.rows.len() {
            return Vec::new();
        }
        if pos.x > 0 {
            let row = &mut self.rows[pos.y];
            if row.delete_char(pos.x - 1).is_none() {
                return Vec::new();
            }
            self.dirty = true;
            return vec![Movement::Left(1)];
        }
        if pos.y == 0 {
            return Vec::new();
        }

        let row = self.rows.remove(pos.y);
        let prev = &mut self.rows[pos.y - 1];
        let prev_len = prev.len();
        prev.append(row.raw());
        self.dirty = true;
        vec![Movement::Up(1), Movement::Right(prev_len)]
    }

    /// Forward delete at `pos`: remove the char under it, or join the next
    /// row when `pos` is at the end of its row. The cursor doesn't move.
    /// Returns whether anything changed.
    pub fn delete_char_at(&mut self, pos: Position) -> bool {
        let Some(row) = self.rows.get_mut(pos.y) else {
            return false;
        };
        if pos.x < row.len() {
            row.delete_char(pos.x);
        } else if pos.y + 1 < self.rows.len() {
            let next = self.rows.remove(pos.y + 1);
            self.rows[pos.y].append(next.raw());
        } else {
            return false;
        }
        self.dirty = true;
        true
    }

    // -- File I/O -----------------------------------------------------------

    /// The bytes a save writes: every row followed by CRLF.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = self
            .rows
            .iter()
            .map(|r| r.raw().len() + LINE_TERMINATOR.len())
            .sum();
        let mut bytes = Vec::with_capacity(len);
        for row in &self.rows {
            bytes.extend_from_slice(row.raw().as_bytes());
            bytes.extend_from_slice(LINE_TERMINATOR.as_bytes());
        }
        bytes
    }

    /// Write the buffer to `path` atomically and clear the dirty flag.
    /// Returns the number of bytes written. The stored path is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::error::Error::Io) if the temp file can't
    /// be created, written or renamed over `path`.
    pub fn save(&mut self, path: &Path) -> Result<usize> {
        let bytes = self.to_bytes();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        // The temp file is created 0600; keep the target's mode instead.
        if let Ok(meta) = fs::metadata(path) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(std::io::Error::from)?;

        self.dirty = false;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved file");
        Ok(bytes.len())
    }

    /// [`save`](Self::save), then bind the buffer to `path`. The path is
    /// only recorded when the write succeeded.
    ///
    /// # Errors
    ///
    /// Same as [`save`](Self::save).
    pub fn save_as(&mut self, path: &Path) -> Result<usize> {
        let written = self.save(path)?;
        self.path = Some(path.to_path_buf());
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_rows(buf: &Buffer) -> Vec<&str> {
        buf.rows().iter().map(Row::raw).collect()
    }

    // -- construction --

    #[test]
    fn from_text_splits_lines_and_strips_cr() {
        let buf = Buffer::from_text("one\r\ntwo\nthree");
        assert_eq!(raw_rows(&buf), vec!["one", "two", "three"]);
        assert!(!buf.is_dirty());
    }

    #[test]
    fn from_text_keeps_cr_that_is_not_a_terminator() {
        let buf = Buffer::from_text("a\r\r\nb");
        assert_eq!(raw_rows(&buf), vec!["a\r", "b"]);
    }

    #[test]
    fn trailing_newline_adds_no_row() {
        assert_eq!(Buffer::from_text("a\nb\n").row_count(), 2);
        assert!(Buffer::from_text("").is_empty());
    }

    #[test]
    fn display_name_defaults() {
        assert_eq!(Buffer::new().display_name(), "[No Name]");
    }

    // -- insert_char --

    #[test]
    fn insert_on_past_the_end_row_appends() {
        let mut buf = Buffer::new();
        assert_eq!(buf.insert_char('a', Position::ZERO), Some(Movement::Right(1)));
        assert_eq!(raw_rows(&buf), vec!["a"]);
        assert!(buf.is_dirty());
    }

    #[test]
    fn insert_below_past_the_end_is_none() {
        let mut buf = Buffer::from_text("x");
        assert_eq!(buf.insert_char('a', Position::new(0, 5)), None);
        assert_eq!(raw_rows(&buf), vec!["x"]);
    }

    #[test]
    fn insert_then_backspace_is_identity() {
        let original = Buffer::from_text("héllo\nworld");
        for x in 0..=5 {
            let mut buf = original.clone();
            let pos = Position::new(x, 0);
            buf.insert_char('Z', pos);
            let moves = buf.delete_char_before(Position::new(x + 1, 0));
            assert_eq!(moves, vec![Movement::Left(1)]);
            assert_eq!(buf.rows(), original.rows(), "x = {x}");
        }
    }

    #[test]
    fn typed_run_then_as_many_backspaces_is_identity() {
        let original = Buffer::from_text("héllo\nworld");
        let mut buf = original.clone();
        let mut pos = Position::new(2, 0);
        let typed = "a\t界 b";
        for ch in typed.chars() {
            assert_eq!(buf.insert_char(ch, pos), Some(Movement::Right(1)));
            pos.x += 1;
        }
        assert_eq!(buf.row(0).map(Row::raw), Some("héa\t界 bllo"));

        for _ in typed.chars() {
            assert_eq!(buf.delete_char_before(pos), vec![Movement::Left(1)]);
            pos.x -= 1;
        }
        assert_eq!(buf.rows(), original.rows());
        assert_eq!(pos, Position::new(2, 0));
    }

    // -- insert_newline_after --

    #[test]
    fn newline_splits_row() {
        let mut buf = Buffer::from_text("hello world");
        let moves = buf.insert_newline_after(Position::new(5, 0));
        assert_eq!(moves, vec![Movement::Down(1), Movement::Left(5)]);
        assert_eq!(raw_rows(&buf), vec!["hello", " world"]);
        assert!(buf.is_dirty());
    }

    #[test]
    fn newline_at_column_zero_inserts_empty_row_above() {
        let mut buf = Buffer::from_text("abc");
        buf.insert_newline_after(Position::new(0, 0));
        assert_eq!(raw_rows(&buf), vec!["", "abc"]);
    }

    #[test]
    fn newline_on_past_the_end_row_appends_empty_row() {
        let mut buf = Buffer::from_text("abc");
        let moves = buf.insert_newline_after(Position::new(0, 1));
        assert_eq!(moves, vec![Movement::Down(1), Movement::Left(0)]);
        assert_eq!(raw_rows(&buf), vec!["abc", ""]);
    }

    #[test]
    fn split_then_join_is_identity() {
        let original = Buffer::from_text("first\nse\tcond\nthird");
        for x in 0..=7 {
            let mut buf = original.clone();
            buf.insert_newline_after(Position::new(x, 1));
            let moves = buf.delete_char_before(Position::new(0, 2));
            assert_eq!(moves, vec![Movement::Up(1), Movement::Right(x.min(7))]);
            assert_eq!(buf.rows(), original.rows(), "x = {x}");
        }
    }

    // -- delete_char_before --

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut buf = Buffer::from_text("abc");
        assert!(buf.delete_char_before(Position::ZERO).is_empty());
        assert!(!buf.is_dirty());
    }

    #[test]
    fn backspace_on_past_the_end_row_is_noop() {
        let mut buf = Buffer::from_text("abc");
        assert!(buf.delete_char_before(Position::new(0, 1)).is_empty());
        assert_eq!(raw_rows(&buf), vec!["abc"]);
    }

    #[test]
    fn backspace_joins_rows() {
        let mut buf = Buffer::from_text("foo\nbar");
        let moves = buf.delete_char_before(Position::new(0, 1));
        assert_eq!(moves, vec![Movement::Up(1), Movement::Right(3)]);
        assert_eq!(raw_rows(&buf), vec!["foobar"]);
    }

    // -- delete_char_at --

    #[test]
    fn forward_delete_removes_char_under_cursor() {
        let mut buf = Buffer::from_text("abc");
        assert!(buf.delete_char_at(Position::new(1, 0)));
        assert_eq!(raw_rows(&buf), vec!["ac"]);
    }

    #[test]
    fn forward_delete_at_end_joins_next_row() {
        let mut buf = Buffer::from_text("ab\ncd");
        assert!(buf.delete_char_at(Position::new(2, 0)));
        assert_eq!(raw_rows(&buf), vec!["abcd"]);
    }

    #[test]
    fn forward_delete_at_end_of_last_row_is_noop() {
        let mut buf = Buffer::from_text("ab");
        assert!(!buf.delete_char_at(Position::new(2, 0)));
        assert!(!buf.delete_char_at(Position::new(0, 1)));
        assert!(!buf.is_dirty());
    }

    // -- file I/O --

    #[test]
    fn to_bytes_terminates_every_row_with_crlf() {
        let buf = Buffer::from_text("a\nb");
        assert_eq!(buf.to_bytes(), b"a\r\nb\r\n");
        assert!(Buffer::new().to_bytes().is_empty());
    }

    #[test]
    fn save_writes_crlf_and_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut buf = Buffer::from_text("hello\nworld");
        buf.insert_char('!', Position::new(5, 0));
        let written = buf.save(&path).unwrap();

        assert_eq!(written, 15);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello!\r\nworld\r\n");
        assert!(!buf.is_dirty());
        assert_eq!(buf.path(), None);
    }

    #[test]
    fn save_as_records_path_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.txt");

        let mut buf = Buffer::from_text("x\n\ty");
        buf.save_as(&path).unwrap();
        assert_eq!(buf.path(), Some(path.as_path()));

        let loaded = Buffer::load(&path);
        assert_eq!(loaded.rows(), buf.rows());
        assert!(!loaded.is_dirty());
    }

    #[test]
    fn failed_save_as_keeps_no_path_and_stays_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.txt");

        let mut buf = Buffer::new();
        buf.insert_char('a', Position::ZERO);
        assert!(buf.save_as(&path).is_err());
        assert_eq!(buf.path(), None);
        assert!(buf.is_dirty());
    }

    #[test]
    fn load_missing_file_is_empty_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");

        let buf = Buffer::load(&path);
        assert!(buf.is_empty());
        assert!(!buf.is_dirty());
        assert_eq!(buf.path(), Some(path.as_path()));
        assert_eq!(buf.display_name(), path.display().to_string());
    }

    #[cfg(unix)]
    #[test]
    fn save_keeps_existing_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.sh");
        fs::write(&path, "echo hi\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        let mut buf = Buffer::load(&path);
        buf.insert_char('#', Position::ZERO);
        buf.save(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);
        assert_eq!(fs::read_to_string(&path).unwrap(), "#echo hi\r\n");
    }

    #[test]
    fn load_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.txt");
        fs::write(&path, b"ok\n\xffbad\r\n").unwrap();

        let buf = Buffer::load(&path);
        assert_eq!(raw_rows(&buf), vec!["ok", "\u{fffd}bad"]);
    }
}
