//! Single-line input shown in the message bar.
//!
//! While a prompt is open the session feeds it every scalar instead of the
//! key interpreter. Each scalar yields a [`PromptEvent`]: the content
//! changed, the user submitted, the user cancelled, or the key meant
//! nothing here. The prompt itself never touches the buffer; the session
//! decides what a change or a submit means for its [`PromptKind`].

use crate::keymap::{DEL, ESC, ctrl};
use crate::position::Position;

/// What the prompt is collecting, plus what to restore on cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// A path for a buffer that has none.
    SaveAs,
    /// An incremental search query.
    Find {
        cursor: Position,
        row_offset: usize,
        col_offset: usize,
    },
}

impl PromptKind {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SaveAs => "Save as",
            Self::Find { .. } => "Search",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    Changed(String),
    Submit(String),
    Cancel,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    kind: PromptKind,
    input: String,
}

impl Prompt {
    #[must_use]
    pub const fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> PromptKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The message bar line.
    #[must_use]
    pub fn line(&self) -> String {
        format!("{}: {} (ESC to cancel)", self.kind.label(), self.input)
    }

    /// Feed one scalar. Enter on an empty line does nothing.
    pub fn feed(&mut self, ch: char) -> PromptEvent {
        match ch {
            ESC => PromptEvent::Cancel,
            '\r' => {
                if self.input.is_empty() {
                    PromptEvent::Ignored
                } else {
                    PromptEvent::Submit(self.input.clone())
                }
            }
            DEL => self.backspace(),
            c if c == ctrl(b'h') => self.backspace(),
            c if c.is_control() => PromptEvent::Ignored,
            c => {
                self.input.push(c);
                PromptEvent::Changed(self.input.clone())
            }
        }
    }

    fn backspace(&mut self) -> PromptEvent {
        if self.input.pop().is_some() {
            PromptEvent::Changed(self.input.clone())
        } else {
            PromptEvent::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn save_as() -> Prompt {
        Prompt::new(PromptKind::SaveAs)
    }

    #[test]
    fn typing_reports_changes() {
        let mut p = save_as();
        assert_eq!(p.feed('a'), PromptEvent::Changed("a".into()));
        assert_eq!(p.feed('é'), PromptEvent::Changed("aé".into()));
        assert_eq!(p.input(), "aé");
    }

    #[test]
    fn backspace_and_delete_remove_last_char() {
        let mut p = save_as();
        p.feed('a');
        p.feed('b');
        assert_eq!(p.feed(DEL), PromptEvent::Changed("a".into()));
        assert_eq!(p.feed(ctrl(b'h')), PromptEvent::Changed(String::new()));
        assert_eq!(p.feed(DEL), PromptEvent::Ignored);
    }

    #[test]
    fn enter_submits_non_empty_input() {
        let mut p = save_as();
        assert_eq!(p.feed('\r'), PromptEvent::Ignored);
        p.feed('x');
        assert_eq!(p.feed('\r'), PromptEvent::Submit("x".into()));
    }

    #[test]
    fn escape_cancels() {
        let mut p = save_as();
        p.feed('x');
        assert_eq!(p.feed(ESC), PromptEvent::Cancel);
    }

    #[test]
    fn other_control_chars_ignored() {
        let mut p = save_as();
        assert_eq!(p.feed(ctrl(b'q')), PromptEvent::Ignored);
        assert_eq!(p.feed('\t'), PromptEvent::Ignored);
        assert_eq!(p.input(), "");
    }

    #[test]
    fn prompt_lines() {
        let mut p = save_as();
        p.feed('f');
        assert_eq!(p.line(), "Save as: f (ESC to cancel)");

        let find = Prompt::new(PromptKind::Find {
            cursor: Position::ZERO,
            row_offset: 0,
            col_offset: 0,
        });
        assert_eq!(find.line(), "Search:  (ESC to cancel)");
    }
}
