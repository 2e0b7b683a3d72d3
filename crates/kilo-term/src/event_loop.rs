// SPDX-License-Identifier: MIT
//
// Event loop: the editor's heartbeat.
//
// Stdin bytes flow in from the background reader, get decoded into
// scalars, and are handed to the application one at a time. After every
// iteration the application gets a tick with the current time and then
// renders a complete frame, which goes to the terminal in one write.
//
// # The hybrid model
//
// The loop blocks on the stdin channel with a 10ms timeout:
//
//   1. Keystrokes arrive on the channel immediately. No polling latency.
//   2. When nothing happens, `recv_timeout` parks the thread.
//   3. The timeout gives the application a steady tick, which is what
//      expires an unfinished key sequence after its deadline passes.
//
// There is no dirty tracking: the status message fades on wall-clock
// time, so every iteration redraws. A frame is a few KB at most.
//
// Reader disconnect (stdin EOF) ends the loop cleanly.

use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::input::Utf8Decoder;
use crate::output::OutputBuffer;
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop after handling input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Per iteration the loop calls [`on_input`](App::on_input) for each
/// decoded scalar (if any arrived), then [`on_tick`](App::on_tick), then
/// [`render`](App::render).
pub trait App {
    /// Handle one input scalar received at `now`.
    fn on_input(&mut self, ch: char, now: Instant) -> Flow;

    /// Called every iteration, even when no input arrived.
    fn on_tick(&mut self, _now: Instant) {}

    /// Compose a whole frame into `out`. The buffer is empty on entry.
    fn render(&mut self, out: &mut OutputBuffer);
}

// ─── Loop Config ─────────────────────────────────────────────────────────────

/// Timing configuration for the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Timeout for the channel `recv_timeout` call (milliseconds).
    /// Default: 10ms.
    pub tick_interval_ms: u64,
}

impl LoopConfig {
    #[inline]
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the terminal and the loop timing. [`run`](Self::run) enters raw
/// mode, spawns the stdin reader, and returns when the application
/// answers [`Flow::Quit`] or stdin closes.
///
/// ```no_run
/// use std::time::Instant;
/// use kilo_term::event_loop::{App, EventLoop, Flow};
/// use kilo_term::output::OutputBuffer;
///
/// struct Echo(String);
///
/// impl App for Echo {
///     fn on_input(&mut self, ch: char, _now: Instant) -> Flow {
///         if ch == 'q' {
///             return Flow::Quit;
///         }
///         self.0.push(ch);
///         Flow::Continue
///     }
///
///     fn render(&mut self, out: &mut OutputBuffer) {
///         out.push_str("\x1b[H");
///         out.push_str(&self.0);
///     }
/// }
///
/// let mut event_loop = EventLoop::new()?;
/// event_loop.run(&mut Echo(String::new()))?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    config: LoopConfig,
}

impl EventLoop {
    /// Create an event loop with default timing.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal size cannot be determined.
    pub fn new() -> io::Result<Self> {
        Self::with_config(LoopConfig::default())
    }

    /// Create an event loop with custom timing.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal size cannot be determined.
    pub fn with_config(config: LoopConfig) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            config,
        })
    }

    /// The terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run until the application quits or stdin closes.
    ///
    /// Raw mode is restored and the screen cleared on the way out, even
    /// when the loop itself failed.
    ///
    /// # Errors
    ///
    /// Returns an error if entering raw mode, spawning the reader, writing
    /// a frame, or restoring the terminal fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;

        let (mut reader, rx) = match StdinReader::spawn() {
            Ok(spawned) => spawned,
            Err(e) => {
                self.terminal.leave()?;
                return Err(e);
            }
        };

        tracing::debug!(tick_ms = self.config.tick_interval_ms, "event loop started");
        let result = drive(app, &rx, self.config, &mut io::stdout());

        reader.stop();
        self.terminal.leave()?;
        tracing::debug!("event loop finished");

        result
    }
}

/// The loop body, generic over the input channel and the output sink so it
/// can be driven without a terminal.
///
/// # Errors
///
/// Returns an error if writing a frame to `sink` fails.
pub fn drive(
    app: &mut impl App,
    rx: &Receiver<Vec<u8>>,
    config: LoopConfig,
    sink: &mut impl Write,
) -> io::Result<()> {
    let mut decoder = Utf8Decoder::new();
    let mut out = OutputBuffer::new();
    let timeout = config.tick_interval();

    // First frame before any input.
    app.render(&mut out);
    out.flush_to(sink)?;

    loop {
        match rx.recv_timeout(timeout) {
            Ok(bytes) => {
                let now = Instant::now();
                for ch in decoder.decode(&bytes) {
                    if app.on_input(ch, now) == Flow::Quit {
                        return Ok(());
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                if decoder.has_pending() {
                    tracing::debug!("stdin closed mid-character");
                }
                return Ok(());
            }
        }

        app.on_tick(Instant::now());

        out.clear();
        app.render(&mut out);
        out.flush_to(sink)?;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
