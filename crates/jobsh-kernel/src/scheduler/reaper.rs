//! Reaper: non-blocking status sweep over tracked jobs.
//!
//! Runs once per REPL iteration, before the next line is read. Every tracked
//! pid is polled with `WNOHANG | WUNTRACED | WCONTINUED`, so a transition is
//! observed at most one iteration after it happens and none is lost: a pid
//! stays in the table (and keeps being polled) until its exit is collected.

use jobsh_types::JobEvent;
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use super::job::{JobState, JobTable};

/// Poll every tracked job once and apply the observed transitions.
///
/// | Observed  | Table        | Event      |
/// |-----------|--------------|------------|
/// | exited    | remove       | `Exited`   |
/// | signaled  | remove       | `Signaled` |
/// | stopped   | mark STOPPED | `Stopped`  |
/// | continued | mark RUNNING | `Resumed`  |
pub fn reap(jobs: &mut JobTable) -> Vec<JobEvent> {
    let mut events = Vec::new();
    while let Some(pid) = jobs.next_unreaped_pid() {
        if let Some(event) = poll_job(jobs, pid) {
            events.push(event);
        }
    }
    events
}

fn poll_job(jobs: &mut JobTable, pid: Pid) -> Option<JobEvent> {
    let id = match jobs.lookup_jid_by_pid(pid) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(pid = pid.as_raw(), "could not get job id: {}", e);
            return None;
        }
    };

    let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
    let raw = pid.as_raw();

    let (event, update) = match waitpid(pid, Some(flags)) {
        Ok(WaitStatus::Exited(_, status)) => (JobEvent::Exited { id, pid: raw, status }, None),
        Ok(WaitStatus::Signaled(_, sig, _)) => (
            JobEvent::Signaled { id, pid: raw, signal: sig as i32 },
            None,
        ),
        Ok(WaitStatus::Stopped(_, sig)) => (
            JobEvent::Stopped { id, pid: raw, signal: sig as i32 },
            Some(JobState::Stopped),
        ),
        Ok(WaitStatus::Continued(_)) => (JobEvent::Resumed { id, pid: raw }, Some(JobState::Running)),
        Ok(_) => return None,
        Err(Errno::ECHILD) => {
            // Not our child any more; polling it again would fail forever.
            tracing::warn!(job = %id, pid = raw, "job vanished without a status, dropping it");
            let _ = jobs.remove(pid);
            return None;
        }
        Err(e) => {
            tracing::warn!(job = %id, pid = raw, "waitpid: {}", e);
            return None;
        }
    };

    let applied = match update {
        Some(state) => jobs.update_state(pid, state),
        None => jobs.remove(pid).map(|_| ()),
    };
    if let Err(e) = applied {
        tracing::warn!(job = %id, "job table update failed: {}", e);
    }

    tracing::debug!(%event, "reaped");
    Some(event)
}
