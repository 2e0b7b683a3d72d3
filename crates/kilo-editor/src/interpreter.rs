//! Key interpreter: turns a live stream of scalars into actions.
//!
//! Scalars accumulate until the accumulated sequence is bound in the current
//! mode's [`Keymap`]. A match emits its action and clears the accumulator.
//! Anything else (a strict prefix like `ESC [`, or a sequence nothing can
//! complete) stays pending until the one-second deadline passes, then is
//! dropped silently.
//!
//! The deadline is a plain `Instant`, not a timer. There is at most one;
//! each keystroke that doesn't resolve pushes it back. The event loop calls
//! [`KeyInterpreter::expire`] on every tick, and [`process_at`] expires a
//! stale deadline itself before appending, so a late keystroke never joins
//! an abandoned sequence even if no tick ran in between.
//!
//! [`process_at`]: KeyInterpreter::process_at

use std::time::{Duration, Instant};

use crate::keymap::{Action, Binding, Keymaps, Lookup};
use crate::mode::Mode;

/// How long an unresolved sequence waits for its next scalar.
pub const DEFAULT_KEY_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct KeyInterpreter {
    keymaps: Keymaps,
    pending: Vec<char>,
    deadline: Option<Instant>,
    timeout: Duration,
}

impl KeyInterpreter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_KEY_TIMEOUT)
    }

    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            keymaps: Keymaps::new(),
            pending: Vec::new(),
            deadline: None,
            timeout,
        }
    }

    /// Scalars received but not yet resolved.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &[char] {
        &self.pending
    }

    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// [`process_at`](Self::process_at) with the current time.
    pub fn process(&mut self, ch: char, mode: Mode) -> Option<Action> {
        self.process_at(ch, mode, Instant::now())
    }

    /// Feed one scalar received at `now`. Returns the action if the
    /// accumulated sequence is now bound; a consumed binding returns `None`
    /// but still clears the accumulator.
    pub fn process_at(&mut self, ch: char, mode: Mode, now: Instant) -> Option<Action> {
        self.expire(now);
        self.pending.push(ch);

        match self.keymaps.for_mode(mode).lookup(&self.pending) {
            Lookup::Exact(binding) => {
                self.pending.clear();
                self.deadline = None;
                match binding {
                    Binding::Action(action) => Some(action),
                    Binding::Consume => None,
                }
            }
            Lookup::Prefix | Lookup::None => {
                self.deadline = Some(now + self.timeout);
                None
            }
        }
    }

    /// Drop the pending sequence if its deadline has passed. Returns whether
    /// anything was dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                tracing::trace!(pending = ?self.pending, "key sequence timed out");
                self.pending.clear();
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for KeyInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{ESC, ctrl};
    use pretty_assertions::assert_eq;

    fn feed(ki: &mut KeyInterpreter, keys: &str, mode: Mode, now: Instant) -> Vec<Option<Action>> {
        keys.chars().map(|ch| ki.process_at(ch, mode, now)).collect()
    }

    // -- immediacy --

    #[test]
    fn single_key_resolves_immediately() {
        let mut ki = KeyInterpreter::new();
        let t0 = Instant::now();
        assert_eq!(ki.process_at('h', Mode::Normal, t0), Some(Action::MoveCursorLeft));
        assert!(ki.pending().is_empty());
        assert_eq!(ki.deadline(), None);
    }

    #[test]
    fn control_key_resolves_immediately() {
        let mut ki = KeyInterpreter::new();
        assert_eq!(ki.process(ctrl(b'q'), Mode::Normal), Some(Action::Quit));
    }

    // -- lookahead --

    #[test]
    fn delete_sequence_resolves_on_fourth_scalar() {
        let mut ki = KeyInterpreter::new();
        let t0 = Instant::now();
        assert_eq!(
            feed(&mut ki, "\x1b[3~", Mode::Normal, t0),
            vec![None, None, None, Some(Action::Delete)]
        );
        assert!(ki.pending().is_empty());
        assert_eq!(ki.deadline(), None);
    }

    #[test]
    fn each_unresolved_scalar_pushes_deadline() {
        let mut ki = KeyInterpreter::new();
        let t0 = Instant::now();
        ki.process_at(ESC, Mode::Normal, t0);
        assert_eq!(ki.deadline(), Some(t0 + DEFAULT_KEY_TIMEOUT));

        let t1 = t0 + Duration::from_millis(400);
        ki.process_at('[', Mode::Normal, t1);
        assert_eq!(ki.deadline(), Some(t1 + DEFAULT_KEY_TIMEOUT));
        assert_eq!(ki.pending(), &[ESC, '[']);
    }

    // -- timeout --

    #[test]
    fn lone_escape_times_out_then_h_still_resolves() {
        let mut ki = KeyInterpreter::new();
        let t0 = Instant::now();
        assert_eq!(ki.process_at(ESC, Mode::Normal, t0), None);

        assert!(!ki.expire(t0 + Duration::from_millis(999)));
        assert_eq!(ki.pending(), &[ESC]);

        assert!(ki.expire(t0 + DEFAULT_KEY_TIMEOUT));
        assert!(ki.pending().is_empty());
        assert_eq!(ki.deadline(), None);

        let t2 = t0 + Duration::from_secs(2);
        assert_eq!(ki.process_at('h', Mode::Normal, t2), Some(Action::MoveCursorLeft));
    }

    #[test]
    fn stale_deadline_expires_before_append() {
        let mut ki = KeyInterpreter::new();
        let t0 = Instant::now();
        ki.process_at(ESC, Mode::Normal, t0);
        // No tick ran; the next key arrives long after the deadline.
        let late = t0 + Duration::from_secs(5);
        assert_eq!(ki.process_at('h', Mode::Normal, late), Some(Action::MoveCursorLeft));
    }

    #[test]
    fn dead_end_is_held_until_timeout() {
        let mut ki = KeyInterpreter::new();
        let t0 = Instant::now();
        assert_eq!(ki.process_at('z', Mode::Normal, t0), None);
        // Still inside the window: 'h' joins "z" and nothing matches.
        assert_eq!(ki.process_at('h', Mode::Normal, t0), None);
        assert_eq!(ki.pending(), &['z', 'h']);

        let later = t0 + Duration::from_secs(1);
        assert_eq!(ki.process_at('h', Mode::Normal, later), Some(Action::MoveCursorLeft));
    }

    #[test]
    fn expire_without_deadline_is_noop() {
        let mut ki = KeyInterpreter::new();
        assert!(!ki.expire(Instant::now()));
    }

    // -- insert mode --

    #[test]
    fn insert_mode_keys() {
        let mut ki = KeyInterpreter::new();
        let t0 = Instant::now();
        assert_eq!(
            feed(&mut ki, "a\r\x7f\x1b", Mode::Insert, t0),
            vec![
                Some(Action::Insert('a')),
                Some(Action::Newline),
                Some(Action::DeleteBackward),
                Some(Action::EnterNormalMode),
            ]
        );
    }

    #[test]
    fn consumed_key_clears_accumulator() {
        let mut ki = KeyInterpreter::new();
        let t0 = Instant::now();
        assert_eq!(ki.process_at(ctrl(b'l'), Mode::Insert, t0), None);
        assert!(ki.pending().is_empty());
        assert_eq!(ki.deadline(), None);
    }

    #[test]
    fn custom_timeout() {
        let mut ki = KeyInterpreter::with_timeout(Duration::from_millis(50));
        let t0 = Instant::now();
        ki.process_at(ESC, Mode::Normal, t0);
        assert!(ki.expire(t0 + Duration::from_millis(50)));
    }
}
