//! Core builtin trait.

use jobsh_types::ExecResult;

use super::context::ExecContext;

/// A command implemented inside the shell.
///
/// Builtins run in the shell process itself, so they can mutate the job
/// table and drive terminal ownership. Redirections and `&` on a builtin
/// line are parsed away and have no effect.
pub trait Builtin {
    /// The builtin's name (used for lookup).
    fn name(&self) -> &str;

    /// Run with the words after the builtin's name.
    fn execute(&self, args: &[String], ctx: &mut ExecContext<'_>) -> ExecResult;
}

/// Standard "missing arguments" failure for a builtin.
pub fn syntax_error(name: &str) -> ExecResult {
    ExecResult::failure(2, format!("{}: syntax error\n", name))
}
