//! Transient feedback: the message bar text and the quit confirmation.

use std::time::{Duration, Instant};

/// How long a status message stays on screen.
pub const DEFAULT_MESSAGE_LIFETIME: Duration = Duration::from_secs(5);

/// Default number of `^Q` presses needed to quit with unsaved changes.
pub const DEFAULT_QUIT_TIMES: u32 = 3;

// ---------------------------------------------------------------------------
// StatusMessage
// ---------------------------------------------------------------------------

/// Text for the message bar, stamped with when it was set. Visibility is
/// decided at render time; nothing ever clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    text: String,
    created: Instant,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>, created: Instant) -> Self {
        Self {
            text: text.into(),
            created,
        }
    }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the message is younger than `lifetime` at `now`.
    #[must_use]
    pub fn is_visible(&self, now: Instant, lifetime: Duration) -> bool {
        now.saturating_duration_since(self.created) < lifetime
    }
}

// ---------------------------------------------------------------------------
// QuitGuard
// ---------------------------------------------------------------------------

/// Repeated-confirmation counter for quitting with unsaved changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuitGuard {
    times: u32,
    remaining: u32,
}

/// What a quit request should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitDecision {
    Quit,
    /// Not yet; this many more presses are needed.
    Confirm(u32),
}

impl QuitGuard {
    #[must_use]
    pub const fn new(times: u32) -> Self {
        Self {
            times,
            remaining: times,
        }
    }

    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Register a quit press. A clean buffer quits at once; a dirty one
    /// counts down and quits when the count reaches zero.
    pub const fn request(&mut self, dirty: bool) -> QuitDecision {
        if !dirty {
            return QuitDecision::Quit;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            QuitDecision::Quit
        } else {
            QuitDecision::Confirm(self.remaining)
        }
    }

    /// Any other action starts the count over.
    pub const fn reset(&mut self) {
        self.remaining = self.times;
    }
}

impl Default for QuitGuard {
    fn default() -> Self {
        Self::new(DEFAULT_QUIT_TIMES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- message --

    #[test]
    fn message_visible_for_lifetime() {
        let t0 = Instant::now();
        let msg = StatusMessage::new("hi", t0);
        assert!(msg.is_visible(t0, DEFAULT_MESSAGE_LIFETIME));
        assert!(msg.is_visible(t0 + Duration::from_millis(4999), DEFAULT_MESSAGE_LIFETIME));
        assert!(!msg.is_visible(t0 + Duration::from_secs(5), DEFAULT_MESSAGE_LIFETIME));
        assert_eq!(msg.text(), "hi");
    }

    // -- quit guard --

    #[test]
    fn clean_buffer_quits_immediately() {
        let mut guard = QuitGuard::default();
        assert_eq!(guard.request(false), QuitDecision::Quit);
    }

    #[test]
    fn dirty_buffer_needs_three_presses() {
        let mut guard = QuitGuard::default();
        assert_eq!(guard.request(true), QuitDecision::Confirm(2));
        assert_eq!(guard.request(true), QuitDecision::Confirm(1));
        assert_eq!(guard.request(true), QuitDecision::Quit);
    }

    #[test]
    fn reset_restores_full_count() {
        let mut guard = QuitGuard::default();
        guard.request(true);
        guard.request(true);
        guard.reset();
        assert_eq!(guard.remaining(), 3);
        assert_eq!(guard.request(true), QuitDecision::Confirm(2));
    }

    #[test]
    fn single_press_guard() {
        let mut guard = QuitGuard::new(1);
        assert_eq!(guard.request(true), QuitDecision::Quit);
    }
}
