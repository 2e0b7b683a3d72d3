// SPDX-License-Identifier: MIT
//
// kilo-term — terminal plumbing for the kilo editor.
//
// Raw mode via termios, a background stdin reader, UTF-8 scalar decoding,
// a handful of ANSI sequences, and a frame buffer that reaches the terminal
// in a single write. No TUI framework: the editor composes its own frames
// and this crate just gets bytes in and out.

pub mod ansi;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
