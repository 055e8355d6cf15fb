//! ln: Create a hard link.

use jobsh_types::ExecResult;

use crate::tools::{syntax_error, Builtin, ExecContext};

/// Ln builtin: `ln <target> <link_name>` creates a hard link.
pub struct Ln;

impl Builtin for Ln {
    fn name(&self) -> &str {
        "ln"
    }

    fn execute(&self, args: &[String], _ctx: &mut ExecContext<'_>) -> ExecResult {
        let [target, link_name, ..] = args else {
            return syntax_error("ln");
        };

        match std::fs::hard_link(target, link_name) {
            Ok(()) => ExecResult::success(""),
            Err(e) => ExecResult::failure(1, format!("ln: {}: {}\n", link_name, e)),
        }
    }
}
