//! rm: Remove a file.

use jobsh_types::ExecResult;

use crate::tools::{syntax_error, Builtin, ExecContext};

/// Rm builtin: unlink a single file.
pub struct Rm;

impl Builtin for Rm {
    fn name(&self) -> &str {
        "rm"
    }

    fn execute(&self, args: &[String], _ctx: &mut ExecContext<'_>) -> ExecResult {
        let Some(path) = args.first() else {
            return syntax_error("rm");
        };

        match std::fs::remove_file(path) {
            Ok(()) => ExecResult::success(""),
            Err(e) => ExecResult::failure(1, format!("rm: {}: {}\n", path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{JobCounter, JobTable};
    use crate::terminal::TerminalControl;

    #[test]
    fn test_rm_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("doomed.txt");
        std::fs::write(&file, "bye").unwrap();

        let mut jobs = JobTable::new();
        let mut counter = JobCounter::new();
        let terminal = TerminalControl::disabled();
        let mut ctx = ExecContext::new(&mut jobs, &mut counter, &terminal);

        let path = file.to_string_lossy().to_string();
        assert!(Rm.execute(&[path.clone()], &mut ctx).ok());
        assert!(!file.exists());

        let again = Rm.execute(&[path], &mut ctx);
        assert_eq!(again.code, 1);
        assert!(again.err.starts_with("rm: "));

        assert_eq!(Rm.execute(&[], &mut ctx).err, "rm: syntax error\n");
    }
}
