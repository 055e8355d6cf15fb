//! cd: Change working directory.

use jobsh_types::ExecResult;

use crate::tools::{syntax_error, Builtin, ExecContext};

/// Cd builtin: change the shell's current directory.
pub struct Cd;

impl Builtin for Cd {
    fn name(&self) -> &str {
        "cd"
    }

    fn execute(&self, args: &[String], _ctx: &mut ExecContext<'_>) -> ExecResult {
        let Some(dir) = args.first() else {
            return syntax_error("cd");
        };

        match std::env::set_current_dir(dir) {
            Ok(()) => ExecResult::success(""),
            Err(e) => ExecResult::failure(1, format!("cd: {}: {}\n", dir, e)),
        }
    }
}
