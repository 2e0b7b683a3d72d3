//! Search: bidirectional, wrap-around substring search.
//!
//! Matching is literal and case-sensitive over raw row text. Columns are
//! char indices, the same unit as [`Position::x`].
//!
//! # Wrap-around
//!
//! A forward search scans from the start position to the end of the buffer,
//! then continues from the top back down to the start position. A backward
//! search does the mirror image. Either way every possible match is
//! considered exactly once, so a query that occurs once in the buffer is
//! found from any starting point.
//!
//! # Repeat
//!
//! [`SearchEngine`] remembers the last query and where it landed. `n`/`N`
//! re-issue it relative to the cursor. A lookup that found nothing is
//! remembered too, so repeating it is a well-defined no-op.

use crate::buffer::Buffer;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchDirection {
    Forward,
    Backward,
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find `query` in `buffer` starting at `from`, wrapping around the buffer.
///
/// Forward accepts a match starting exactly at `from`. Backward only accepts
/// matches starting strictly before `from` on the first pass. Returns `None`
/// for an empty query or when nothing matches anywhere.
#[must_use]
pub fn search(
    buffer: &Buffer,
    query: &str,
    direction: SearchDirection,
    from: Position,
) -> Option<Position> {
    if query.is_empty() {
        return None;
    }
    match direction {
        SearchDirection::Forward => search_forward(buffer, query, from),
        SearchDirection::Backward => search_backward(buffer, query, from),
    }
}

fn search_forward(buffer: &Buffer, query: &str, from: Position) -> Option<Position> {
    let rows = buffer.rows();

    // From the start position to the end of the buffer.
    if let Some(x) = rows.get(from.y).and_then(|row| row.find_from(query, from.x)) {
        return Some(Position::new(x, from.y));
    }
    for (y, row) in rows.iter().enumerate().skip(from.y + 1) {
        if let Some(x) = row.find_from(query, 0) {
            return Some(Position::new(x, y));
        }
    }

    // Wrap: from the top down to the start position.
    for (y, row) in rows.iter().enumerate().take(from.y) {
        if let Some(x) = row.find_from(query, 0) {
            return Some(Position::new(x, y));
        }
    }
    rows.get(from.y)
        .and_then(|row| row.find_from(query, 0))
        .filter(|&x| x < from.x)
        .map(|x| Position::new(x, from.y))
}

fn search_backward(buffer: &Buffer, query: &str, from: Position) -> Option<Position> {
    let rows = buffer.rows();

    // Nearest match left of the start position.
    if let Some(x) = rows.get(from.y).and_then(|row| row.rfind_before(query, from.x)) {
        return Some(Position::new(x, from.y));
    }
    for y in (0..from.y.min(rows.len())).rev() {
        if let Some(x) = rows[y].rfind_before(query, rows[y].len()) {
            return Some(Position::new(x, y));
        }
    }

    // Wrap: from the bottom up to the start position.
    for y in (from.y + 1..rows.len()).rev() {
        if let Some(x) = rows[y].rfind_before(query, rows[y].len()) {
            return Some(Position::new(x, y));
        }
    }
    rows.get(from.y)
        .and_then(|row| row.rfind_before(query, row.len()))
        .filter(|&x| x >= from.x)
        .map(|x| Position::new(x, from.y))
}

// ---------------------------------------------------------------------------
// SearchEngine
// ---------------------------------------------------------------------------

/// The last lookup: what was searched for and where it landed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchState {
    pub target: String,
    pub position: Option<Position>,
}

/// Search with memory for repeat-forward / repeat-backward.
#[derive(Debug, Default)]
pub struct SearchEngine {
    state: Option<SearchState>,
}

impl SearchEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self { state: None }
    }

    /// The last lookup, if any query has been issued.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> Option<&SearchState> {
        self.state.as_ref()
    }

    /// Look up `query` and remember the outcome. An empty query returns
    /// `None` and leaves the remembered state alone.
    pub fn find(
        &mut self,
        buffer: &Buffer,
        query: &str,
        direction: SearchDirection,
        from: Position,
    ) -> Option<Position> {
        if query.is_empty() {
            return None;
        }
        let position = search(buffer, query, direction, from);
        tracing::debug!(query, ?direction, %from, found = ?position, "search");
        self.state = Some(SearchState {
            target: query.to_string(),
            position,
        });
        position
    }

    /// Repeat the last query forward, starting one column right of `cursor`.
    pub fn find_next(&mut self, buffer: &Buffer, cursor: Position) -> Option<Position> {
        let target = self.state.as_ref()?.target.clone();
        let from = Position::new(cursor.x + 1, cursor.y);
        self.find(buffer, &target, SearchDirection::Forward, from)
    }

    /// Repeat the last query backward from exactly `cursor`.
    pub fn find_previous(&mut self, buffer: &Buffer, cursor: Position) -> Option<Position> {
        let target = self.state.as_ref()?.target.clone();
        self.find(buffer, &target, SearchDirection::Backward, cursor)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
