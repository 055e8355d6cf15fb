//! Execution context for builtins and the launcher.

use nix::unistd::Pid;

use crate::scheduler::{JobCounter, JobId, JobTable};
use crate::terminal::TerminalControl;

/// Marker character in front of a job number (`%1`).
pub const JOB_MARKER: char = '%';

/// Kernel state a command may touch.
///
/// Borrowed from the [`Kernel`](crate::Kernel) for the duration of one
/// command; nothing here outlives the command.
pub struct ExecContext<'a> {
    /// Live jobs.
    pub jobs: &'a mut JobTable,
    /// Job id source.
    pub counter: &'a mut JobCounter,
    /// Terminal ownership.
    pub terminal: &'a TerminalControl,
    exit_code: Option<i32>,
}

impl<'a> ExecContext<'a> {
    pub fn new(
        jobs: &'a mut JobTable,
        counter: &'a mut JobCounter,
        terminal: &'a TerminalControl,
    ) -> Self {
        Self {
            jobs,
            counter,
            terminal,
            exit_code: None,
        }
    }

    /// Ask the kernel to terminate the shell after this command.
    pub fn request_exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }

    /// Exit status requested by the command, if any.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Resolve a job selector such as `%2` to its job id and pid.
    ///
    /// A leading `%` is stripped before the number is read. Anything that
    /// does not name a live job resolves to `None`.
    pub fn resolve_job(&self, selector: &str) -> Option<(JobId, Pid)> {
        let id = parse_job_selector(selector)?;
        let pid = self.jobs.lookup_pid_by_jid(id).ok()?;
        Some((id, pid))
    }
}

/// Parse `%N` (or bare `N`) into a job id.
pub fn parse_job_selector(selector: &str) -> Option<JobId> {
    let digits = selector.strip_prefix(JOB_MARKER).unwrap_or(selector);
    digits.parse::<u64>().ok().map(JobId)
}
