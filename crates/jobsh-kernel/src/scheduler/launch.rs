//! Process launcher: fork, group, redirect, exec.
//!
//! Launch protocol for one command:
//!
//! ```text
//!   parent                                child
//!   ──────                                ─────
//!   prepare C strings
//!   fork ───────────────────────────────▶ setpgid(0, 0)
//!   setpgid(child, child)                 tcsetpgrp (foreground only)
//!                                         default job-control signals
//!   foreground: hand terminal, wait       open/dup2 redirections
//!   background: add RUNNING job           execv(full path, [basename, ..])
//! ```
//!
//! Everything the child needs is built before the fork, so after the fork the
//! child only issues syscalls. A failing child reports on fd 2 and leaves with
//! `_exit(1)`; it never touches its copy of the job table.

use std::ffi::{CStr, CString};
use std::fs::File;
use std::io::Write;
use std::mem::ManuallyDrop;
use std::os::fd::{FromRawFd, RawFd};

use jobsh_types::JobEvent;
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::libc::{STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::sys::signal::{killpg, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::waitpid;
use nix::unistd::{close, dup2, execv, fork, getpgrp, setpgid, tcsetpgrp, ForkResult, Pid};
use thiserror::Error;

use super::job::{JobId, JobState, JobTableError};
use crate::parser::CommandLine;
use crate::paths::{basename, locate_program};
use crate::signals;
use crate::terminal::{terminal_fd, wait_for_foreground, WaitResult};
use crate::tools::ExecContext;

/// Launch failures. None of these leave a job behind.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{0}: command not found")]
    CommandNotFound(String),
    #[error("{0}: argument contains a nul byte")]
    NulByte(String),
    #[error("fork: {0}")]
    Fork(Errno),
    #[error("waitpid: {0}")]
    Wait(Errno),
    #[error("could not track job: {0}")]
    Table(#[from] JobTableError),
}

/// A command ready to fork: all strings converted, program resolved.
#[derive(Debug, Clone)]
pub struct PreparedCommand {
    /// Full path handed to `execv`.
    path: CString,
    /// `argv[0]` is the basename of `path`.
    argv: Vec<CString>,
    input: Option<CString>,
    output: Option<(CString, bool)>,
    foreground: bool,
    /// Job display name.
    name: String,
}

fn c_string(s: &str) -> Result<CString, LaunchError> {
    CString::new(s).map_err(|_| LaunchError::NulByte(s.to_string()))
}

fn c_path(path: &std::path::Path) -> Result<CString, LaunchError> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| LaunchError::NulByte(path.display().to_string()))
}

impl PreparedCommand {
    /// Resolve the program through `path_var` and build the exec arguments.
    pub fn new(cmd: &CommandLine, path_var: &str) -> Result<Self, LaunchError> {
        let program = cmd.program();
        let resolved = locate_program(program, path_var)
            .ok_or_else(|| LaunchError::CommandNotFound(program.to_string()))?;
        let full_path = resolved.to_string_lossy().to_string();
        let name = basename(&full_path).to_string();

        let mut argv = Vec::with_capacity(cmd.argv.len());
        argv.push(c_string(&name)?);
        for arg in cmd.args() {
            argv.push(c_string(arg)?);
        }

        Ok(Self {
            path: c_path(&resolved)?,
            argv,
            input: cmd.input.as_deref().map(c_path).transpose()?,
            output: cmd
                .output
                .as_ref()
                .map(|o| c_path(&o.path).map(|p| (p, o.append)))
                .transpose()?,
            foreground: cmd.foreground,
            name,
        })
    }

    /// Job display name (program basename).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground
    }
}

/// What happened to a launched command from the shell's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Foreground program exited on its own; no job was created.
    Completed { pid: Pid, status: i32 },
    /// A job event: background start, foreground stop, or foreground kill.
    Event(JobEvent),
}

/// Fork and exec `cmd`, updating the job table in `ctx`.
#[tracing::instrument(level = "debug", skip_all, fields(command = %cmd.name, foreground = cmd.foreground))]
pub fn launch(cmd: &PreparedCommand, ctx: &mut ExecContext<'_>) -> Result<LaunchOutcome, LaunchError> {
    let take_terminal = cmd.foreground && ctx.terminal.is_enabled();

    // SAFETY: the child only performs syscalls on data prepared above and
    // then execs or exits.
    let child = match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => child,
        Ok(ForkResult::Child) => exec_child(cmd, take_terminal),
        Err(e) => return Err(LaunchError::Fork(e)),
    };

    // Both sides set the group so neither races the other. EACCES means the
    // child already exec'd, which is fine.
    if let Err(e) = setpgid(child, child) {
        if e != Errno::EACCES {
            tracing::debug!(pid = child.as_raw(), "parent setpgid: {}", e);
        }
    }

    if cmd.foreground {
        wait_foreground(cmd, child, ctx)
    } else {
        let id = ctx.counter.next_id();
        track(ctx, id, child, JobState::Running, &cmd.name)?;
        tracing::debug!(job = %id, pid = child.as_raw(), "background job started");
        Ok(LaunchOutcome::Event(JobEvent::Started {
            id,
            pid: child.as_raw(),
        }))
    }
}

fn wait_foreground(
    cmd: &PreparedCommand,
    child: Pid,
    ctx: &mut ExecContext<'_>,
) -> Result<LaunchOutcome, LaunchError> {
    let terminal = ctx.terminal;
    let restore = terminal.restore_on_drop();
    if let Err(e) = terminal.set_foreground_group(child) {
        tracing::warn!(pid = child.as_raw(), "tcsetpgrp: {}", e);
    }

    let status = wait_for_foreground(child);
    drop(restore);

    let pid = child.as_raw();
    match status.map_err(LaunchError::Wait)? {
        WaitResult::Exited(status) => Ok(LaunchOutcome::Completed { pid: child, status }),
        WaitResult::Signaled(signal) => {
            // Reported like a job but never inserted.
            let id = ctx.counter.next_id();
            Ok(LaunchOutcome::Event(JobEvent::Signaled { id, pid, signal }))
        }
        WaitResult::Stopped(signal) => {
            let id = ctx.counter.next_id();
            track(ctx, id, child, JobState::Stopped, &cmd.name)?;
            Ok(LaunchOutcome::Event(JobEvent::Stopped { id, pid, signal }))
        }
    }
}

/// Insert a freshly launched job. A child the table refuses is killed and
/// collected so it never runs untracked.
fn track(
    ctx: &mut ExecContext<'_>,
    id: JobId,
    child: Pid,
    state: JobState,
    name: &str,
) -> Result<(), LaunchError> {
    if let Err(e) = ctx.jobs.add(id, child, state, name) {
        tracing::warn!(job = %id, pid = child.as_raw(), "discarding untracked child: {}", e);
        let _ = killpg(child, Signal::SIGKILL);
        let _ = waitpid(child, None);
        return Err(e.into());
    }
    Ok(())
}

/// Child side of the fork. Never returns.
fn exec_child(cmd: &PreparedCommand, take_terminal: bool) -> ! {
    if let Err(e) = setpgid(Pid::from_raw(0), Pid::from_raw(0)) {
        child_fail("setpgid", e);
    }

    if take_terminal {
        if let Err(e) = tcsetpgrp(terminal_fd(), getpgrp()) {
            child_fail("tcsetpgrp", e);
        }
    }

    if let Err(e) = signals::restore_default_signals() {
        child_fail("sigaction", e);
    }

    if let Some(input) = &cmd.input {
        if let Err(e) = redirect(input, OFlag::O_RDONLY, STDIN_FILENO) {
            child_fail("open", e);
        }
    }

    if let Some((output, append)) = &cmd.output {
        let mode = if *append { OFlag::O_APPEND } else { OFlag::O_TRUNC };
        if let Err(e) = redirect(output, OFlag::O_CREAT | OFlag::O_WRONLY | mode, STDOUT_FILENO) {
            child_fail("open", e);
        }
    }

    match execv(&cmd.path, &cmd.argv) {
        Ok(never) => match never {},
        Err(e) => child_fail("execv", e),
    }
}

/// Open `path` and install it as descriptor `target`.
fn redirect(path: &CStr, flags: OFlag, target: RawFd) -> nix::Result<()> {
    let fd = open(path, flags, Mode::S_IRUSR | Mode::S_IWUSR)?;
    if fd != target {
        dup2(fd, target)?;
        close(fd)?;
    }
    Ok(())
}

/// Report a pre-exec failure and leave the child.
fn child_fail(what: &str, err: Errno) -> ! {
    // SAFETY: fd 2 belongs to the child; ManuallyDrop keeps it open.
    let mut stderr = ManuallyDrop::new(unsafe { File::from_raw_fd(STDERR_FILENO) });
    for part in [b"jobsh: ".as_slice(), what.as_bytes(), b": ", err.desc().as_bytes(), b"\n"] {
        let _ = stderr.write_all(part);
    }
    // SAFETY: _exit skips atexit handlers and stdio flushing, which belong
    // to the parent's copy of the process.
    unsafe { nix::libc::_exit(1) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn prepared(line: &str) -> Result<PreparedCommand, LaunchError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        PreparedCommand::new(&parse(&words).unwrap(), "/bin:/usr/bin")
    }

    #[test]
    fn test_prepare_resolves_and_basenames() {
        let cmd = prepared("sh -c true > out &").unwrap();
        assert_eq!(cmd.name(), "sh");
        assert_eq!(cmd.argv[0].to_str().unwrap(), "sh");
        assert_eq!(cmd.argv.len(), 3);
        assert!(cmd.path.to_str().unwrap().ends_with("/sh"));
        assert_eq!(cmd.output.as_ref().map(|(_, append)| *append), Some(false));
        assert!(!cmd.is_foreground());
    }

    #[test]
    fn test_prepare_keeps_explicit_path() {
        let cmd = prepared("/opt/tools/run.sh x").unwrap();
        assert_eq!(cmd.path.to_str().unwrap(), "/opt/tools/run.sh");
        assert_eq!(cmd.name(), "run.sh");
    }

    #[test]
    fn test_prepare_unknown_command() {
        let err = prepared("definitely_not_a_real_command_12345").unwrap_err();
        assert!(matches!(err, LaunchError::CommandNotFound(_)));
        assert_eq!(err.to_string(), "definitely_not_a_real_command_12345: command not found");
    }
}
