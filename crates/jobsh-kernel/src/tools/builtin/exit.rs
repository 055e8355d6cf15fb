//! exit: Leave the shell.

use jobsh_types::ExecResult;

use crate::tools::{Builtin, ExecContext};

/// Exit builtin: release the job table and terminate with status 0.
///
/// The kernel performs the release once it sees the exit request.
pub struct Exit;

impl Builtin for Exit {
    fn name(&self) -> &str {
        "exit"
    }

    fn execute(&self, _args: &[String], ctx: &mut ExecContext<'_>) -> ExecResult {
        ctx.request_exit(0);
        ExecResult::success("")
    }
}
