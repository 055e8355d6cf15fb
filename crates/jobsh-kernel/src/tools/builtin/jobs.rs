//! jobs: List tracked jobs.

use jobsh_types::ExecResult;

use crate::tools::{Builtin, ExecContext};

/// Jobs builtin: print every job, one per line, in job id order.
pub struct Jobs;

impl Builtin for Jobs {
    fn name(&self) -> &str {
        "jobs"
    }

    fn execute(&self, _args: &[String], ctx: &mut ExecContext<'_>) -> ExecResult {
        let mut out = String::new();
        for job in ctx.jobs.list() {
            out.push_str(&job.to_string());
            out.push('\n');
        }
        ExecResult::success(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{JobCounter, JobId, JobState, JobTable};
    use crate::terminal::TerminalControl;
    use nix::unistd::Pid;

    #[test]
    fn test_jobs_empty() {
        let mut jobs = JobTable::new();
        let mut counter = JobCounter::new();
        let terminal = TerminalControl::disabled();
        let mut ctx = ExecContext::new(&mut jobs, &mut counter, &terminal);

        let result = Jobs.execute(&[], &mut ctx);
        assert!(result.ok());
        assert!(result.out.is_empty());
    }

    #[test]
    fn test_jobs_lists_in_id_order() {
        let mut jobs = JobTable::new();
        jobs.add(JobId(2), Pid::from_raw(222), JobState::Stopped, "vim").unwrap();
        jobs.add(JobId(1), Pid::from_raw(111), JobState::Running, "sleep").unwrap();
        let mut counter = JobCounter::new();
        let terminal = TerminalControl::disabled();
        let mut ctx = ExecContext::new(&mut jobs, &mut counter, &terminal);

        let result = Jobs.execute(&[], &mut ctx);
        assert_eq!(result.out, "[1] (111) Running sleep\n[2] (222) Stopped vim\n");
    }
}
