//! Modal editing.
//!
//! | Mode   | Keys mean                     |
//! |--------|-------------------------------|
//! | Normal | commands (`h j k l`, `i`, …)  |
//! | Insert | text, except ESC/Enter/Backspace |

use std::fmt;

/// The current editing mode.
///
/// Pure data. The keymap for each mode lives in [`crate::keymap`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
}

impl Mode {
    /// Name shown in the status bar.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
