//! Terminal control: who owns the controlling terminal.
//!
//! The terminal's foreground process group receives keyboard-generated
//! signals and may read from the terminal. The shell hands it to a job before
//! waiting on that job and takes it back afterwards. [`ForegroundGuard`]
//! makes the take-back unconditional: it fires on drop, so early returns and
//! error paths in callers restore the shell's group too.
//!
//! When standard input is not a terminal (pipes, tests, embedding) every
//! operation here is a no-op and the shell runs without job-control handoff.

use std::io::IsTerminal;
use std::os::fd::BorrowedFd;

use nix::errno::Errno;
use nix::libc::STDIN_FILENO;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{getpgrp, tcgetpgrp, tcsetpgrp, Pid};

/// Descriptor of the controlling terminal.
pub(crate) fn terminal_fd() -> BorrowedFd<'static> {
    // SAFETY: fd 0 is never closed by the shell.
    unsafe { BorrowedFd::borrow_raw(STDIN_FILENO) }
}

/// How a foreground wait resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    /// Exited with this status.
    Exited(i32),
    /// Killed by this signal number.
    Signaled(i32),
    /// Stopped by this signal number.
    Stopped(i32),
}

/// Controls the terminal's foreground process group.
#[derive(Debug, Clone)]
pub struct TerminalControl {
    shell_pgid: Pid,
    enabled: bool,
}

impl TerminalControl {
    /// Enable terminal handoff if standard input is a terminal.
    pub fn detect() -> Self {
        let enabled = std::io::stdin().is_terminal();
        tracing::debug!(enabled, "terminal control");
        Self {
            shell_pgid: getpgrp(),
            enabled,
        }
    }

    /// Terminal control that never touches the terminal.
    pub fn disabled() -> Self {
        Self {
            shell_pgid: getpgrp(),
            enabled: false,
        }
    }

    /// True if the shell actually hands the terminal to jobs.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The shell's own process group.
    pub fn shell_pgid(&self) -> Pid {
        self.shell_pgid
    }

    /// Current foreground group of the terminal, if there is one.
    pub fn foreground_group(&self) -> Option<Pid> {
        if !self.enabled {
            return None;
        }
        tcgetpgrp(terminal_fd()).ok()
    }

    /// Make `pgid` the terminal's foreground process group.
    pub fn set_foreground_group(&self, pgid: Pid) -> nix::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        tracing::debug!(pgid = pgid.as_raw(), "tcsetpgrp");
        tcsetpgrp(terminal_fd(), pgid)
    }

    /// Give the terminal back to the shell's group.
    pub fn reclaim_terminal(&self) -> nix::Result<()> {
        self.set_foreground_group(self.shell_pgid)
    }

    /// Guard that reclaims the terminal when dropped.
    ///
    /// Take the guard before granting the terminal to anyone, so the shell
    /// gets it back even if the grant itself half-succeeded.
    pub fn restore_on_drop(&self) -> ForegroundGuard<'_> {
        ForegroundGuard { terminal: self }
    }

    /// Grant the terminal to `pgid`, returning the guard that takes it back.
    pub fn give_terminal_to(&self, pgid: Pid) -> nix::Result<ForegroundGuard<'_>> {
        let guard = self.restore_on_drop();
        self.set_foreground_group(pgid)?;
        Ok(guard)
    }
}

/// Restores the shell's foreground group on drop.
#[must_use = "the terminal is reclaimed as soon as the guard is dropped"]
pub struct ForegroundGuard<'a> {
    terminal: &'a TerminalControl,
}

impl Drop for ForegroundGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.terminal.reclaim_terminal() {
            tracing::warn!("failed to reclaim terminal: {}", e);
        }
    }
}

/// Block until `pid` exits, is killed, or stops.
///
/// Continue notifications are not waited for; `EINTR` is retried.
pub fn wait_for_foreground(pid: Pid) -> nix::Result<WaitResult> {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(WaitResult::Exited(code)),
            Ok(WaitStatus::Signaled(_, sig, _)) => return Ok(WaitResult::Signaled(sig as i32)),
            Ok(WaitStatus::Stopped(_, sig)) => return Ok(WaitResult::Stopped(sig as i32)),
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_terminal_is_inert() {
        let term = TerminalControl::disabled();
        assert!(!term.is_enabled());
        assert_eq!(term.shell_pgid(), getpgrp());
        assert_eq!(term.foreground_group(), None);
        assert!(term.set_foreground_group(Pid::from_raw(1)).is_ok());
        assert!(term.reclaim_terminal().is_ok());

        let guard = term.give_terminal_to(Pid::from_raw(1)).unwrap();
        drop(guard);
    }

    #[test]
    fn wait_on_non_child_fails() {
        // pid 1 is never our child.
        assert_eq!(wait_for_foreground(Pid::from_raw(1)), Err(Errno::ECHILD));
    }
}
