use anyhow::{Context, Result};
use nix::sys::termios::{self, SetArg, Termios};
use std::io::IsTerminal;
use std::os::fd::{BorrowedFd, RawFd};

/// Puts a terminal into raw mode for the guard's lifetime so single key
/// presses reach the key decoder unbuffered and unechoed.
pub struct RawModeGuard {
    fd: RawFd,
    original: Termios,
}

impl RawModeGuard {
    /// Enter raw mode on `fd`, or return `None` when it is not a terminal
    /// (input piped from a file or another process).
    pub fn enter_if_tty(fd: RawFd) -> Result<Option<Self>> {
        let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
        if !borrowed.is_terminal() {
            return Ok(None);
        }
        let original = termios::tcgetattr(borrowed).context("tcgetattr on stdin")?;
        let mut raw = original.clone();
        termios::cfmakeraw(&mut raw);
        termios::tcsetattr(borrowed, SetArg::TCSANOW, &raw).context("tcsetattr raw mode")?;
        Ok(Some(Self { fd, original }))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let borrowed = unsafe { BorrowedFd::borrow_raw(self.fd) };
        let _ = termios::tcsetattr(borrowed, SetArg::TCSANOW, &self.original);
    }
}
