//! Text positions and cursor movements.
//!
//! All coordinates are **0-indexed**. `x` is a char index into the raw row
//! (not a byte offset, not a display column), `y` is the row index.
//! `y == row_count` is a legal position: the empty row past the end where
//! typing appends a new line.
//!
//! Display layers (status bar) convert to 1-indexed for the user. That
//! conversion never belongs here.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A position in the buffer: column `x`, row `y`.
///
/// # Ordering
///
/// Row first, then column: `Position { x: 5, y: 0 }` < `Position { x: 0, y: 1 }`.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    /// The origin: column 0, row 0.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.y, self.x)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.y + 1, self.x + 1)
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// A direction plus a distance in rows or chars.
///
/// Buffer edits don't touch the cursor. They return the movements that put
/// the cursor where the edit leaves it, and the caller applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Up(usize),
    Down(usize),
    Left(usize),
    Right(usize),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ordering_is_row_major() {
        assert!(Position::new(5, 0) < Position::new(0, 1));
        assert!(Position::new(2, 3) < Position::new(3, 3));
        assert_eq!(Position::new(1, 1).cmp(&Position::new(1, 1)), std::cmp::Ordering::Equal);
    }

    #[test]
    fn sort_positions() {
        let mut ps = vec![Position::new(0, 2), Position::new(9, 0), Position::new(1, 2)];
        ps.sort();
        assert_eq!(ps, vec![Position::new(9, 0), Position::new(0, 2), Position::new(1, 2)]);
    }

    #[test]
    fn display_is_one_indexed_row_then_column() {
        assert_eq!(Position::new(6, 2).to_string(), "3:7");
        assert_eq!(Position::ZERO.to_string(), "1:1");
    }

    #[test]
    fn debug_is_zero_indexed() {
        assert_eq!(format!("{:?}", Position::new(4, 1)), "Pos(1:4)");
    }

    #[test]
    fn default_is_origin() {
        assert_eq!(Position::default(), Position::ZERO);
    }
}
