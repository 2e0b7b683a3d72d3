//! # kilo-editor — Editor core for kilo
//!
//! Everything between the byte stream and the frame:
//!
//! - **[`position`]** — `Position` (x, y) and `Movement`, 0-indexed
//! - **[`row`]** — `Row` with raw text, tab-expanded render text, and column mapping
//! - **[`buffer`]** — `Buffer` of rows with editing, loading, and atomic save
//! - **[`cursor`]** — Cursor movement clamped to the buffer
//! - **[`mode`]** — `Normal` and `Insert`
//! - **[`keymap`]** — Per-mode key tries mapping scalar sequences to actions
//! - **[`interpreter`]** — Multi-key sequence matching with a timeout
//! - **[`search`]** — Wrap-around search with repeat
//! - **[`prompt`]** — Single-line input in the message bar
//! - **[`status`]** — Timed status messages and the quit confirmation
//! - **[`viewport`]** — Scrolling and frame composition
//! - **[`session`]** — The editor itself, driven by kilo-term's event loop

pub mod buffer;
pub mod config;
pub mod cursor;
pub mod error;
pub mod interpreter;
pub mod keymap;
pub mod mode;
pub mod position;
pub mod prompt;
pub mod row;
pub mod search;
pub mod session;
pub mod status;
pub mod viewport;
