//! Editor error type.
//!
//! Two classes matter to the caller: environment failures that make the
//! editor unusable (fatal, reported once on stderr) and file I/O failures
//! from saving (shown in the message bar, never fatal).

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The terminal can't be driven: size unknown, raw mode refused.
    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),

    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
