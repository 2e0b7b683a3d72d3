// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader: moves raw bytes from the terminal to a channel.
//
// `read()` on stdin blocks, and the event loop must keep ticking so the
// key interpreter's deadline can expire. A dedicated thread does the
// blocking, the main loop sits in `recv_timeout()` on the channel. The
// thread never touches editor state.
//
// Shutdown: the thread polls stdin with a short timeout and checks an
// `AtomicBool` between polls, so it never stays stuck in `read()`.
// EOF closes the channel, which ends the event loop.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// A keypress is 1-4 bytes, a paste can be kilobytes. 4 KB covers both.
const READ_BUF_SIZE: usize = 4096;

/// How often the reader thread checks the stop flag (milliseconds).
const POLL_TIMEOUT_MS: i32 = 50;

/// Background stdin reader thread.
///
/// The thread runs until [`stop`](Self::stop) is called, the handle is
/// dropped, or stdin reaches EOF.
///
/// ```no_run
/// use kilo_term::reader::StdinReader;
///
/// let (reader, rx) = StdinReader::spawn()?;
/// while let Ok(bytes) = rx.recv() {
///     println!("got {} bytes", bytes.len());
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Spawn the background reader thread.
    ///
    /// Each received `Vec<u8>` is a non-empty chunk of raw stdin data.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS cannot spawn the thread.
    pub fn spawn() -> io::Result<(Self, Receiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || Self::reader_loop(tx, stop_flag))?;

        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Signal the reader thread to stop and wait for it to exit. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    #[cfg(unix)]
    #[allow(clippy::needless_pass_by_value)] // Owned values moved into thread closure.
    fn reader_loop(tx: mpsc::Sender<Vec<u8>>, stop: Arc<AtomicBool>) {
        use std::os::unix::io::AsRawFd;

        let stdin_fd = io::stdin().as_raw_fd();
        let mut buf = [0u8; READ_BUF_SIZE];

        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }

            let ready = unsafe {
                let mut pfd = libc::pollfd {
                    fd: stdin_fd,
                    events: libc::POLLIN,
                    revents: 0,
                };
                libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
            };

            if ready < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                tracing::warn!(error = %err, "stdin poll failed");
                break;
            }
            if ready == 0 {
                continue;
            }

            let n = unsafe { libc::read(stdin_fd, buf.as_mut_ptr().cast(), buf.len()) };

            if n == 0 {
                tracing::debug!("stdin reached EOF");
                break;
            }
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                tracing::warn!(error = %err, "stdin read failed");
                break;
            }

            #[allow(clippy::cast_sign_loss)] // n > 0 checked above.
            let chunk = buf[..n as usize].to_vec();

            if tx.send(chunk).is_err() {
                break;
            }
        }
    }

    /// Non-unix fallback using blocking reads with no poll.
    #[cfg(not(unix))]
    #[allow(clippy::needless_pass_by_value)]
    fn reader_loop(tx: mpsc::Sender<Vec<u8>>, stop: Arc<AtomicBool>) {
        use std::io::Read;

        let stdin = io::stdin();
        let mut buf = [0u8; READ_BUF_SIZE];

        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }

            match stdin.lock().read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn spawn_and_stop() {
        // stdin is not a terminal under the test harness; the reader
        // must still start and stop without hanging.
        let (mut reader, _rx) = StdinReader::spawn().unwrap();
        reader.stop();
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut reader, _rx) = StdinReader::spawn().unwrap();
        reader.stop();
        reader.stop();
    }

    #[test]
    fn drop_stops_reader() {
        let (reader, _rx) = StdinReader::spawn().unwrap();
        drop(reader);
    }

    #[test]
    fn channel_closes_on_stop() {
        let (mut reader, rx) = StdinReader::spawn().unwrap();
        reader.stop();

        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
