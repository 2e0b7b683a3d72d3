// SPDX-License-Identifier: MIT
//
// Raw mode and window size.
//
// kilo draws on the main screen. Entering flips stdin to raw mode; leaving
// clears the screen, shows the cursor and puts the saved termios back. If
// the editor panics while raw, a hook writes the restore bytes straight to
// fd 1 (the stdout lock may be held by a half-written frame) and resets
// termios from a global copy before the default hook prints.
#![allow(unsafe_code)]

use std::io::{self, Write};
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Rows left for text below the status bar and message bar.
    #[inline]
    #[must_use]
    pub const fn text_rows(self) -> usize {
        (self.rows as usize).saturating_sub(2)
    }
}

/// `ioctl(TIOCGWINSZ)` on stdout. A zero-sized answer counts as failure.
///
/// # Errors
///
/// Returns an error when stdout is not a terminal or reports no size.
#[cfg(unix)]
pub fn window_size() -> io::Result<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    if unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) } != 0 {
        return Err(io::Error::last_os_error());
    }
    if ws.ws_col == 0 || ws.ws_row == 0 {
        return Err(io::Error::other("terminal reports a zero size"));
    }
    Ok(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
pub fn window_size() -> io::Result<Size> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "no window size on this platform"))
}

// ─── Panic restore ──────────────────────────────────────────────────────────

/// Reset attributes, clear, home, show the cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[m\x1b[2J\x1b[H\x1b[?25h";

/// termios to put back from the panic hook, set while raw mode is on.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_after_panic();
            previous(info);
        }));
    });
}

#[cfg(unix)]
fn restore_after_panic() {
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }
    if let Ok(saved) = SAVED_TERMIOS.lock() {
        if let Some(termios) = saved.as_ref() {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, termios);
            }
        }
    }
}

#[cfg(not(unix))]
fn restore_after_panic() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(EMERGENCY_RESTORE);
    let _ = stdout.flush();
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// The controlling terminal. Raw mode is undone on [`leave`](Self::leave)
/// and on drop.
pub struct Terminal {
    size: Size,
    /// termios from before [`enter`](Self::enter); `Some` while raw.
    #[cfg(unix)]
    saved: Option<libc::termios>,
    #[cfg(not(unix))]
    saved: Option<()>,
}

impl Terminal {
    /// Handle for the current terminal. Raw mode stays off until
    /// [`enter`](Self::enter).
    ///
    /// # Errors
    ///
    /// Fails when the window size can't be read.
    pub fn new() -> io::Result<Self> {
        let size = window_size()?;
        tracing::debug!(cols = size.cols, rows = size.rows, "terminal size");
        Ok(Self::with_size(size))
    }

    #[must_use]
    pub const fn with_size(size: Size) -> Self {
        Self { size, saved: None }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.saved.is_some()
    }

    /// Switch stdin to raw mode. Calling it twice is harmless.
    ///
    /// # Errors
    ///
    /// Fails when stdin is not a terminal or termios refuses the change.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.is_active() {
            return Ok(());
        }
        install_panic_hook();
        self.saved = Some(enable_raw_mode()?);
        tracing::debug!("raw mode on");
        Ok(())
    }

    /// Clear the screen, show the cursor and restore termios. A no-op
    /// when raw mode is off.
    ///
    /// # Errors
    ///
    /// Fails when writing to stdout or restoring termios fails.
    pub fn leave(&mut self) -> io::Result<()> {
        let Some(saved) = self.saved.take() else {
            return Ok(());
        };

        // termios goes back even if the screen can't be cleared.
        let cleared = clear_for_exit();
        disable_raw_mode(&saved)?;
        tracing::debug!("raw mode off");
        cleared
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

fn clear_for_exit() -> io::Result<()> {
    let mut out = io::stdout().lock();
    ansi::reset(&mut out)?;
    ansi::clear_screen(&mut out)?;
    ansi::cursor_home(&mut out)?;
    ansi::cursor_show(&mut out)?;
    out.flush()
}

// ─── termios ────────────────────────────────────────────────────────────────

/// Apply the raw flag set and return the termios it replaced.
#[cfg(unix)]
fn enable_raw_mode() -> io::Result<libc::termios> {
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let original = termios;

    termios.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    termios.c_oflag &= !libc::OPOST;
    termios.c_cflag |= libc::CS8;
    termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
    // read() returns as soon as one byte is there.
    termios.c_cc[libc::VMIN] = 1;
    termios.c_cc[libc::VTIME] = 0;

    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    if let Ok(mut saved) = SAVED_TERMIOS.lock() {
        *saved = Some(original);
    }
    Ok(original)
}

#[cfg(unix)]
fn disable_raw_mode(original: &libc::termios) -> io::Result<()> {
    if let Ok(mut saved) = SAVED_TERMIOS.lock() {
        *saved = None;
    }
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn enable_raw_mode() -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "raw mode needs termios"))
}

#[cfg(not(unix))]
fn disable_raw_mode(_original: &()) -> io::Result<()> {
    Ok(())
}
