//! Key bindings: scalar sequences mapped to editor actions.
//!
//! Each mode has one [`Keymap`], a trie keyed by input scalars and built once.
//! Walking the trie answers the only question the interpreter asks about an
//! accumulated sequence: is it bound, could it still become bound, or
//! neither. That costs one step per scalar, independent of how many
//! bindings exist.
//!
//! # Normal mode
//!
//! | Keys                    | Action                 |
//! |-------------------------|------------------------|
//! | `h` `j` `k` `l`, arrows | move left/down/up/right |
//! | `H`, `ESC [ H`          | start of line          |
//! | `L`, `ESC [ F`          | end of line            |
//! | `^B`, `ESC [ 5 ~`       | page up                |
//! | `^F`, `ESC [ 6 ~`       | page down              |
//! | `i`                     | insert mode            |
//! | `x`, `ESC [ 3 ~`        | delete under cursor    |
//! | `/`, `^G`               | find                   |
//! | `n` / `N`               | next / previous match  |
//! | `^S`                    | save                   |
//! | `^Q`                    | quit                   |
//!
//! # Insert mode
//!
//! `ESC` back to normal, `^M` newline, `^H`/`DEL` backspace, `^L` swallowed,
//! anything else inserts itself.

use std::collections::HashMap;

use crate::mode::Mode;

/// The scalar produced by holding Ctrl with an ASCII letter.
#[inline]
#[must_use]
pub const fn ctrl(key: u8) -> char {
    (key & 0x1F) as char
}

pub const ESC: char = '\x1b';
pub const DEL: char = '\x7f';

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Everything a key can ask the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveCursorLeft,
    MoveCursorDown,
    MoveCursorUp,
    MoveCursorRight,
    MoveCursorToBeginningOfLine,
    MoveCursorToEndOfLine,
    MovePageUp,
    MovePageDown,
    EnterInsertMode,
    EnterNormalMode,
    Insert(char),
    Newline,
    DeleteBackward,
    Delete,
    Save,
    Find,
    FindNext,
    FindPrevious,
    Quit,
}

/// What a complete sequence is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Action(Action),
    /// Swallow the sequence without doing anything.
    Consume,
}

/// Result of looking up an accumulated sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Exact(Binding),
    /// Not bound yet, but a longer binding starts with it.
    Prefix,
    None,
}

// ---------------------------------------------------------------------------
// Keymap
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Node {
    binding: Option<Binding>,
    children: HashMap<char, Node>,
}

#[derive(Debug, Default)]
pub struct Keymap {
    root: Node,
    /// Binding for any single scalar the trie doesn't know.
    fallback: Option<fn(char) -> Action>,
}

impl Keymap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `keys` (one scalar per char) to `binding`, replacing any
    /// previous binding of the same sequence.
    pub fn bind(&mut self, keys: &str, binding: Binding) {
        let node = keys
            .chars()
            .fold(&mut self.root, |node, ch| node.children.entry(ch).or_default());
        node.binding = Some(binding);
    }

    pub fn bind_action(&mut self, keys: &str, action: Action) {
        self.bind(keys, Binding::Action(action));
    }

    pub fn set_fallback(&mut self, fallback: fn(char) -> Action) {
        self.fallback = Some(fallback);
    }

    /// Classify `keys`. A bound node answers `Exact` even when longer
    /// bindings extend it.
    #[must_use]
    pub fn lookup(&self, keys: &[char]) -> Lookup {
        let mut node = &self.root;
        for ch in keys {
            match node.children.get(ch) {
                Some(next) => node = next,
                None => return self.fall_back(keys),
            }
        }
        match node.binding {
            Some(binding) => Lookup::Exact(binding),
            None if !node.children.is_empty() => Lookup::Prefix,
            None => self.fall_back(keys),
        }
    }

    fn fall_back(&self, keys: &[char]) -> Lookup {
        match (keys, self.fallback) {
            ([ch], Some(f)) => Lookup::Exact(Binding::Action(f(*ch))),
            _ => Lookup::None,
        }
    }

    /// The normal-mode table.
    #[must_use]
    pub fn normal() -> Self {
        use Action::{
            Delete, EnterInsertMode, Find, FindNext, FindPrevious, MoveCursorDown,
            MoveCursorLeft, MoveCursorRight, MoveCursorToBeginningOfLine, MoveCursorToEndOfLine,
            MoveCursorUp, MovePageDown, MovePageUp, Quit, Save,
        };

        let mut map = Self::new();
        for (keys, action) in [
            ("h", MoveCursorLeft),
            ("j", MoveCursorDown),
            ("k", MoveCursorUp),
            ("l", MoveCursorRight),
            ("H", MoveCursorToBeginningOfLine),
            ("L", MoveCursorToEndOfLine),
            ("i", EnterInsertMode),
            ("x", Delete),
            ("/", Find),
            ("n", FindNext),
            ("N", FindPrevious),
            ("\x1b[A", MoveCursorUp),
            ("\x1b[B", MoveCursorDown),
            ("\x1b[C", MoveCursorRight),
            ("\x1b[D", MoveCursorLeft),
            ("\x1b[H", MoveCursorToBeginningOfLine),
            ("\x1b[F", MoveCursorToEndOfLine),
            ("\x1b[3~", Delete),
            ("\x1b[5~", MovePageUp),
            ("\x1b[6~", MovePageDown),
        ] {
            map.bind_action(keys, action);
        }
        for (key, action) in [
            (b'q', Quit),
            (b'b', MovePageUp),
            (b'f', MovePageDown),
            (b's', Save),
            (b'g', Find),
        ] {
            map.bind_action(&ctrl(key).to_string(), action);
        }
        map
    }

    /// The insert-mode table.
    #[must_use]
    pub fn insert() -> Self {
        let mut map = Self::new();
        map.bind_action(&ESC.to_string(), Action::EnterNormalMode);
        map.bind_action("\r", Action::Newline);
        map.bind_action(&ctrl(b'h').to_string(), Action::DeleteBackward);
        map.bind_action(&DEL.to_string(), Action::DeleteBackward);
        map.bind(&ctrl(b'l').to_string(), Binding::Consume);
        map.set_fallback(Action::Insert);
        map
    }
}

/// One keymap per mode, built once.
#[derive(Debug)]
pub struct Keymaps {
    normal: Keymap,
    insert: Keymap,
}

impl Keymaps {
    #[must_use]
    pub fn new() -> Self {
        Self {
            normal: Keymap::normal(),
            insert: Keymap::insert(),
        }
    }

    #[must_use]
    pub const fn for_mode(&self, mode: Mode) -> &Keymap {
        match mode {
            Mode::Normal => &self.normal,
            Mode::Insert => &self.insert,
        }
    }
}

impl Default for Keymaps {
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
    use pretty_assertions::assert_eq;

    fn keys(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn action(a: Action) -> Lookup {
        Lookup::Exact(Binding::Action(a))
    }

    // -- ctrl --

    #[test]
    fn ctrl_keeps_low_five_bits() {
        assert_eq!(ctrl(b'q'), '\x11');
        assert_eq!(ctrl(b'h'), '\x08');
        assert_eq!(ctrl(b'm'), '\r');
        assert_eq!(ctrl(b'Q'), ctrl(b'q'));
    }

    // -- trie --

    #[test]
    fn prefix_exact_and_dead_end() {
        let mut map = Keymap::new();
        map.bind_action("ab", Action::Save);
        assert_eq!(map.lookup(&keys("a")), Lookup::Prefix);
        assert_eq!(map.lookup(&keys("ab")), action(Action::Save));
        assert_eq!(map.lookup(&keys("abc")), Lookup::None);
        assert_eq!(map.lookup(&keys("b")), Lookup::None);
        assert_eq!(map.lookup(&[]), Lookup::Prefix);
    }

    #[test]
    fn rebinding_replaces() {
        let mut map = Keymap::new();
        map.bind_action("a", Action::Save);
        map.bind_action("a", Action::Quit);
        assert_eq!(map.lookup(&keys("a")), action(Action::Quit));
    }

    #[test]
    fn fallback_only_for_single_scalars() {
        let mut map = Keymap::new();
        map.set_fallback(Action::Insert);
        assert_eq!(map.lookup(&keys("z")), action(Action::Insert('z')));
        assert_eq!(map.lookup(&keys("zz")), Lookup::None);
    }

    // -- normal table --

    #[test]
    fn normal_single_keys_resolve() {
        let map = Keymap::normal();
        assert_eq!(map.lookup(&keys("h")), action(Action::MoveCursorLeft));
        assert_eq!(map.lookup(&keys("L")), action(Action::MoveCursorToEndOfLine));
        assert_eq!(map.lookup(&[ctrl(b'q')]), action(Action::Quit));
        assert_eq!(map.lookup(&[ctrl(b'f')]), action(Action::MovePageDown));
        assert_eq!(map.lookup(&[ctrl(b'g')]), action(Action::Find));
    }

    #[test]
    fn normal_delete_sequence_needs_all_four() {
        let map = Keymap::normal();
        assert_eq!(map.lookup(&keys("\x1b")), Lookup::Prefix);
        assert_eq!(map.lookup(&keys("\x1b[")), Lookup::Prefix);
        assert_eq!(map.lookup(&keys("\x1b[3")), Lookup::Prefix);
        assert_eq!(map.lookup(&keys("\x1b[3~")), action(Action::Delete));
    }

    #[test]
    fn normal_unbound_key_is_dead_end() {
        let map = Keymap::normal();
        assert_eq!(map.lookup(&keys("z")), Lookup::None);
        assert_eq!(map.lookup(&keys("\x1b[9")), Lookup::None);
    }

    // -- insert table --

    #[test]
    fn insert_table() {
        let map = Keymap::insert();
        assert_eq!(map.lookup(&[ESC]), action(Action::EnterNormalMode));
        assert_eq!(map.lookup(&['\r']), action(Action::Newline));
        assert_eq!(map.lookup(&[ctrl(b'h')]), action(Action::DeleteBackward));
        assert_eq!(map.lookup(&[DEL]), action(Action::DeleteBackward));
        assert_eq!(map.lookup(&[ctrl(b'l')]), Lookup::Exact(Binding::Consume));
        assert_eq!(map.lookup(&['h']), action(Action::Insert('h')));
        assert_eq!(map.lookup(&['\t']), action(Action::Insert('\t')));
        assert_eq!(map.lookup(&['日']), action(Action::Insert('日')));
    }

    #[test]
    fn keymaps_pick_by_mode() {
        let maps = Keymaps::new();
        assert_eq!(maps.for_mode(Mode::Normal).lookup(&['i']), action(Action::EnterInsertMode));
        assert_eq!(maps.for_mode(Mode::Insert).lookup(&['i']), action(Action::Insert('i')));
    }
}
