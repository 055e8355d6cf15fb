//! fg: Resume a job in the foreground.

use jobsh_types::{ExecResult, JobEvent};
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};

use crate::scheduler::JobState;
use crate::terminal::{wait_for_foreground, WaitResult};
use crate::tools::{syntax_error, Builtin, ExecContext};

/// Fg builtin: continue a job with the terminal and wait for it.
pub struct Fg;

impl Builtin for Fg {
    fn name(&self) -> &str {
        "fg"
    }

    #[tracing::instrument(level = "debug", skip(self, ctx))]
    fn execute(&self, args: &[String], ctx: &mut ExecContext<'_>) -> ExecResult {
        let Some(selector) = args.first() else {
            return syntax_error("fg");
        };

        let Some((id, pid)) = ctx.resolve_job(selector) else {
            return ExecResult::failure(1, "job not found\n");
        };

        let terminal = ctx.terminal;
        let restore = terminal.restore_on_drop();

        // Give terminal to the job's process group before it runs
        if let Err(e) = terminal.set_foreground_group(pid) {
            return ExecResult::failure(1, format!("fg: tcsetpgrp: {}\n", e));
        }

        if let Err(e) = killpg(pid, Signal::SIGCONT) {
            return ExecResult::failure(1, format!("fg: kill: {}\n", e));
        }

        if let Err(e) = ctx.jobs.update_state(pid, JobState::Running) {
            tracing::warn!(job = %id, "could not update job state: {}", e);
        }

        let status = wait_for_foreground(pid);
        drop(restore);

        let pid_raw = pid.as_raw();
        let (code, event) = match status {
            Ok(WaitResult::Exited(status)) => {
                (status as i64, JobEvent::Exited { id, pid: pid_raw, status })
            }
            Ok(WaitResult::Signaled(signal)) => {
                (128 + signal as i64, JobEvent::Signaled { id, pid: pid_raw, signal })
            }
            Ok(WaitResult::Stopped(signal)) => {
                (128 + signal as i64, JobEvent::Stopped { id, pid: pid_raw, signal })
            }
            Err(Errno::ECHILD) => {
                // Already collected elsewhere; nothing left to track.
                let _ = ctx.jobs.remove(pid);
                return ExecResult::failure(1, format!("fg: waitpid: {}\n", Errno::ECHILD));
            }
            Err(e) => return ExecResult::failure(1, format!("fg: waitpid: {}\n", e)),
        };

        let update = if event.is_terminal() {
            ctx.jobs.remove(pid).map(|_| ())
        } else {
            ctx.jobs.update_state(pid, JobState::Stopped)
        };
        if let Err(e) = update {
            tracing::warn!(job = %id, "job table update failed: {}", e);
        }

        ExecResult::from_output(code, "", "").with_err_line(event.to_string())
    }
}
