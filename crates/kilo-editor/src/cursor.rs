//! Cursor: a position plus movement that respects buffer boundaries.
//!
//! The cursor never owns the buffer; movement takes it as a parameter. After
//! every move the position satisfies the buffer invariant:
//!
//! - `y <= row_count` (the past-the-end row is reachable)
//! - `x <= len(row y)`, and `x == 0` on the past-the-end row
//!
//! Vertical moves snap `x` to the target row's length. Horizontal moves stop
//! at the row edges; they never wrap to a neighbouring row.

use crate::buffer::Buffer;
use crate::position::{Movement, Position};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pos: Position,
}

impl Cursor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
        }
    }

    /// A cursor at `pos`, clamped into `buffer`.
    #[must_use]
    pub fn at(pos: Position, buffer: &Buffer) -> Self {
        let mut cursor = Self { pos };
        cursor.clamp(buffer);
        cursor
    }

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn x(&self) -> usize {
        self.pos.x
    }

    #[inline]
    #[must_use]
    pub const fn y(&self) -> usize {
        self.pos.y
    }

    /// Apply one movement.
    pub fn apply(&mut self, movement: Movement, buffer: &Buffer) {
        match movement {
            Movement::Up(n) => {
                self.pos.y = self.pos.y.saturating_sub(n);
                self.snap_x(buffer);
            }
            Movement::Down(n) => {
                self.pos.y = self.pos.y.saturating_add(n).min(buffer.row_count());
                self.snap_x(buffer);
            }
            Movement::Left(n) => self.pos.x = self.pos.x.saturating_sub(n),
            Movement::Right(n) => {
                self.pos.x = self.pos.x.saturating_add(n).min(buffer.row_len(self.pos.y));
            }
        }
        self.debug_check(buffer);
    }

    /// Apply movements in order.
    pub fn apply_all(&mut self, movements: impl IntoIterator<Item = Movement>, buffer: &Buffer) {
        for movement in movements {
            self.apply(movement, buffer);
        }
    }

    /// Jump to the start of the current row.
    pub const fn to_line_start(&mut self) {
        self.pos.x = 0;
    }

    /// Jump past the last char of the current row.
    pub fn to_line_end(&mut self, buffer: &Buffer) {
        self.pos.x = buffer.row_len(self.pos.y);
    }

    /// Move to `pos`, clamped into `buffer`.
    pub fn set(&mut self, pos: Position, buffer: &Buffer) {
        self.pos = pos;
        self.clamp(buffer);
    }

    /// Pull the cursor back inside `buffer` after an external change.
    pub fn clamp(&mut self, buffer: &Buffer) {
        self.pos.y = self.pos.y.min(buffer.row_count());
        self.snap_x(buffer);
    }

    fn snap_x(&mut self, buffer: &Buffer) {
        self.pos.x = self.pos.x.min(buffer.row_len(self.pos.y));
    }

    fn debug_check(&self, buffer: &Buffer) {
        debug_assert!(self.pos.y <= buffer.row_count(), "cursor below past-the-end row");
        debug_assert!(
            self.pos.x <= buffer.row_len(self.pos.y),
            "cursor past end of row"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
