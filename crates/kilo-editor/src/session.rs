//! Session: the editor as one owned object driven by the event loop.
//!
//! The session owns every piece of editor state (buffer, cursor,
//! viewport, mode, key interpreter, search memory, prompt, status message,
//! quit guard) and is the only thing that mutates them. The event loop
//! hands it scalars and ticks through [`App`]; it answers with frames.
//!
//! # Input routing
//!
//! ```text
//! scalar ─┬─ prompt open? ──▶ Prompt::feed ──▶ change / submit / cancel
//!         └─ otherwise ─────▶ KeyInterpreter ──▶ Action ──▶ dispatch
//! ```
//!
//! Saving an unnamed buffer and searching both open a prompt. The prompt
//! is modal but not blocking: the loop keeps ticking and rendering while
//! the user types into it.

use std::path::{Path, PathBuf};
use std::time::Instant;

use kilo_term::event_loop::{App, Flow};
use kilo_term::output::OutputBuffer;
use kilo_term::terminal::Size;

use crate::buffer::Buffer;
use crate::config::Config;
use crate::cursor::Cursor;
use crate::interpreter::KeyInterpreter;
use crate::keymap::Action;
use crate::mode::Mode;
use crate::position::{Movement, Position};
use crate::prompt::{Prompt, PromptEvent, PromptKind};
use crate::search::{SearchDirection, SearchEngine};
use crate::status::{QuitDecision, QuitGuard, StatusMessage};
use crate::viewport::{Frame, Viewport};

/// Shown at startup.
pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | / = find | i = insert";

pub struct Session {
    config: Config,
    buffer: Buffer,
    cursor: Cursor,
    viewport: Viewport,
    mode: Mode,
    interpreter: KeyInterpreter,
    search: SearchEngine,
    prompt: Option<Prompt>,
    status: Option<StatusMessage>,
    quit_guard: QuitGuard,
    /// Time of the latest input or tick; decides message visibility.
    now: Instant,
}

impl Session {
    /// A session editing `buffer` on a terminal of `size`.
    #[must_use]
    pub fn new(buffer: Buffer, size: Size, config: Config) -> Self {
        let now = Instant::now();
        Self {
            buffer,
            cursor: Cursor::new(),
            viewport: Viewport::for_terminal(size),
            mode: Mode::Normal,
            interpreter: KeyInterpreter::with_timeout(config.key_timeout),
            search: SearchEngine::new(),
            prompt: None,
            status: Some(StatusMessage::new(HELP_MESSAGE, now)),
            quit_guard: QuitGuard::new(config.quit_times),
            now,
            config,
        }
    }

    /// Open `path` (or an empty unnamed buffer).
    #[must_use]
    pub fn open(path: Option<&Path>, size: Size, config: Config) -> Self {
        let buffer = path.map_or_else(Buffer::new, Buffer::load);
        Self::new(buffer, size, config)
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor.position()
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    #[must_use]
    pub const fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    /// The status message, if still visible.
    #[must_use]
    pub fn status_text(&self) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|m| m.is_visible(self.now, self.config.message_lifetime))
            .map(StatusMessage::text)
    }

    fn set_status(&mut self, text: impl Into<String>) {
        let msg = StatusMessage::new(text, self.now);
        tracing::debug!(message = msg.text(), "status");
        self.status = Some(msg);
    }

    // -- Dispatch -----------------------------------------------------------

    fn dispatch(&mut self, action: Action) -> Flow {
        tracing::debug!(?action, mode = %self.mode, at = %self.cursor(), "dispatch");
        if action != Action::Quit {
            self.quit_guard.reset();
        }

        let pos = self.cursor();
        match action {
            Action::MoveCursorLeft => self.move_cursor(Movement::Left(1)),
            Action::MoveCursorDown => self.move_cursor(Movement::Down(1)),
            Action::MoveCursorUp => self.move_cursor(Movement::Up(1)),
            Action::MoveCursorRight => self.move_cursor(Movement::Right(1)),
            Action::MoveCursorToBeginningOfLine => self.cursor.to_line_start(),
            Action::MoveCursorToEndOfLine => self.cursor.to_line_end(&self.buffer),
            Action::MovePageUp => {
                let top = Position::new(pos.x, self.viewport.row_offset());
                self.cursor.set(top, &self.buffer);
                self.move_cursor(Movement::Up(self.viewport.rows()));
            }
            Action::MovePageDown => {
                let bottom = (self.viewport.row_offset() + self.viewport.rows())
                    .saturating_sub(1)
                    .min(self.buffer.row_count());
                self.cursor.set(Position::new(pos.x, bottom), &self.buffer);
                self.move_cursor(Movement::Down(self.viewport.rows()));
            }
            Action::EnterInsertMode => self.mode = Mode::Insert,
            Action::EnterNormalMode => self.mode = Mode::Normal,
            Action::Insert(ch) => {
                if let Some(movement) = self.buffer.insert_char(ch, pos) {
                    self.move_cursor(movement);
                }
            }
            Action::Newline => {
                let moves = self.buffer.insert_newline_after(pos);
                self.cursor.apply_all(moves, &self.buffer);
            }
            Action::DeleteBackward => {
                let moves = self.buffer.delete_char_before(pos);
                self.cursor.apply_all(moves, &self.buffer);
            }
            Action::Delete => {
                self.buffer.delete_char_at(pos);
            }
            Action::Save => self.save(),
            Action::Find => self.open_find(),
            Action::FindNext => {
                if let Some(found) = self.search.find_next(&self.buffer, pos) {
                    self.cursor.set(found, &self.buffer);
                }
            }
            Action::FindPrevious => {
                if let Some(found) = self.search.find_previous(&self.buffer, pos) {
                    self.cursor.set(found, &self.buffer);
                }
            }
            Action::Quit => return self.quit(),
        }
        Flow::Continue
    }

    fn move_cursor(&mut self, movement: Movement) {
        self.cursor.apply(movement, &self.buffer);
    }

    fn quit(&mut self) -> Flow {
        match self.quit_guard.request(self.buffer.is_dirty()) {
            QuitDecision::Quit => {
                tracing::info!(dirty = self.buffer.is_dirty(), "quit");
                Flow::Quit
            }
            QuitDecision::Confirm(remaining) => {
                self.set_status(format!(
                    "WARNING!!! File has unsaved changes. Press Ctrl-Q {remaining} more times to quit."
                ));
                Flow::Continue
            }
        }
    }

    // -- Save ---------------------------------------------------------------

    fn save(&mut self) {
        match self.buffer.path().map(Path::to_path_buf) {
            Some(path) => self.write_to(&path, false),
            None => {
                tracing::debug!("save as prompt opened");
                self.prompt = Some(Prompt::new(PromptKind::SaveAs));
            }
        }
    }

    fn write_to(&mut self, path: &Path, bind_path: bool) {
        let result = if bind_path {
            self.buffer.save_as(path)
        } else {
            self.buffer.save(path)
        };
        match result {
            Ok(written) => self.set_status(format!("{written} bytes written to disk")),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "save failed");
                self.set_status(format!("Can't save! I/O error: {e}"));
            }
        }
    }

    // -- Prompt -------------------------------------------------------------

    fn open_find(&mut self) {
        tracing::debug!("search prompt opened");
        self.prompt = Some(Prompt::new(PromptKind::Find {
            cursor: self.cursor(),
            row_offset: self.viewport.row_offset(),
            col_offset: self.viewport.col_offset(),
        }));
    }

    fn feed_prompt(&mut self, mut prompt: Prompt, ch: char) {
        let kind = prompt.kind();
        match (prompt.feed(ch), kind) {
            (PromptEvent::Ignored, _) => self.prompt = Some(prompt),
            (PromptEvent::Changed(query), PromptKind::Find { cursor, .. }) => {
                self.incremental_find(&query, cursor);
                self.prompt = Some(prompt);
            }
            (PromptEvent::Changed(_), PromptKind::SaveAs) => self.prompt = Some(prompt),
            (PromptEvent::Submit(input), PromptKind::SaveAs) => {
                tracing::debug!(path = %input, "save as submitted");
                self.write_to(&PathBuf::from(input), true);
            }
            (PromptEvent::Submit(query), PromptKind::Find { .. }) => {
                tracing::debug!(query = %query, "search submitted");
            }
            (PromptEvent::Cancel, PromptKind::SaveAs) => {
                tracing::debug!("save as cancelled");
                self.set_status("Save aborted");
            }
            (
                PromptEvent::Cancel,
                PromptKind::Find {
                    cursor,
                    row_offset,
                    col_offset,
                },
            ) => {
                tracing::debug!("search cancelled");
                self.cursor.set(cursor, &self.buffer);
                self.viewport.set_offsets(row_offset, col_offset);
            }
        }
    }

    /// Jump to the first match at or after where the search started. An
    /// empty query or no match puts the cursor back there.
    fn incremental_find(&mut self, query: &str, origin: Position) {
        let target = self
            .search
            .find(&self.buffer, query, SearchDirection::Forward, origin)
            .unwrap_or(origin);
        self.cursor.set(target, &self.buffer);
    }
}

impl App for Session {
    fn on_input(&mut self, ch: char, now: Instant) -> Flow {
        self.now = now;
        let flow = match self.prompt.take() {
            Some(prompt) => {
                self.feed_prompt(prompt, ch);
                Flow::Continue
            }
            None => self
                .interpreter
                .process_at(ch, self.mode, now)
                .map_or(Flow::Continue, |action| self.dispatch(action)),
        };
        self.viewport.scroll(&self.buffer, self.cursor());
        flow
    }

    fn on_tick(&mut self, now: Instant) {
        self.now = now;
        self.interpreter.expire(now);
    }

    fn render(&mut self, out: &mut OutputBuffer) {
        self.viewport.scroll(&self.buffer, self.cursor());
        let prompt_line = self.prompt.as_ref().map(Prompt::line);
        let message = prompt_line.as_deref().or_else(|| self.status_text());
        let frame = Frame {
            buffer: &self.buffer,
            cursor: self.cursor(),
            mode: self.mode,
            message,
            highlight_digits: self.config.highlight_digits,
        };
        if let Err(e) = self.viewport.render(&frame, out) {
            tracing::warn!(error = %e, "frame composition failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
