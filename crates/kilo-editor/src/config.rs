//! Runtime options.
//!
//! There are no configuration files. The binary fills a [`Config`] from its
//! command line; everything else uses the defaults here.

use std::time::Duration;

use crate::interpreter::DEFAULT_KEY_TIMEOUT;
use crate::status::{DEFAULT_MESSAGE_LIFETIME, DEFAULT_QUIT_TIMES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// `^Q` presses needed to quit with unsaved changes.
    pub quit_times: u32,
    /// How long a status message stays visible.
    pub message_lifetime: Duration,
    /// How long an unfinished key sequence waits for its next scalar.
    pub key_timeout: Duration,
    /// Paint digit runs red.
    pub highlight_digits: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quit_times: DEFAULT_QUIT_TIMES,
            message_lifetime: DEFAULT_MESSAGE_LIFETIME,
            key_timeout: DEFAULT_KEY_TIMEOUT,
            highlight_digits: true,
        }
    }
}
