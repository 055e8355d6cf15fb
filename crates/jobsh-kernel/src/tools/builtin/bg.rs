//! bg: Resume a job in the background.

use jobsh_types::ExecResult;
use nix::sys::signal::{killpg, Signal};

use crate::tools::{syntax_error, Builtin, ExecContext};

/// Bg builtin: send SIGCONT to a job's process group without waiting.
///
/// The job's state is not checked and not changed here; the reaper sees the
/// continue notification and marks the job running.
pub struct Bg;

impl Builtin for Bg {
    fn name(&self) -> &str {
        "bg"
    }

    fn execute(&self, args: &[String], ctx: &mut ExecContext<'_>) -> ExecResult {
        let Some(selector) = args.first() else {
            return syntax_error("bg");
        };

        let Some((id, pid)) = ctx.resolve_job(selector) else {
            return ExecResult::failure(1, "job not found\n");
        };

        // No terminal transfer, the job stays in the background
        if let Err(e) = killpg(pid, Signal::SIGCONT) {
            return ExecResult::failure(1, format!("bg: kill: {}\n", e));
        }
        tracing::debug!(job = %id, pid = pid.as_raw(), "continued in background");

        ExecResult::success("")
    }
}
