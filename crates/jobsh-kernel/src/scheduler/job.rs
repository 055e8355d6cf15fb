//! Job table for jobsh.
//!
//! Tracks background and stopped jobs. Jobs are keyed by the process id of
//! their group leader (which is also the process group id), with a secondary
//! index from job id to pid so `fg %N` resolves in constant-ish time.

use std::collections::{BTreeMap, HashMap, VecDeque};

use nix::unistd::Pid;
use thiserror::Error;

pub use jobsh_types::{JobId, JobInfo, JobState};

/// Job table operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobTableError {
    #[error("process {0} is already tracked")]
    AlreadyExists(Pid),
    #[error("job id {0} is already in use")]
    DuplicateJobId(JobId),
    #[error("job table is full ({0} jobs)")]
    CapacityExceeded(usize),
    #[error("job not found")]
    NotFound,
}

/// A tracked job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    /// Leader pid; equal to the process group id.
    pub pid: Pid,
    pub state: JobState,
    /// Basename of the launched program.
    pub name: String,
}

impl Job {
    /// Snapshot for listing.
    pub fn info(&self) -> JobInfo {
        JobInfo {
            id: self.id,
            pid: self.pid.as_raw(),
            state: self.state,
            name: self.name.clone(),
        }
    }
}

/// Hands out job ids. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct JobCounter {
    next: u64,
}

impl JobCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Take the next id.
    pub fn next_id(&mut self) -> JobId {
        let id = JobId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`next_id`](Self::next_id) returns.
    pub fn peek(&self) -> JobId {
        JobId(self.next)
    }
}

impl Default for JobCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Table of live jobs.
///
/// Only the shell's main control flow touches the table. A forked child
/// inherits a copy of it but must never mutate or release that copy.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: HashMap<Pid, Job>,
    by_id: BTreeMap<JobId, Pid>,
    capacity: Option<usize>,
    /// Pids still to visit in the current reaper sweep.
    sweep: Option<VecDeque<Pid>>,
}

impl JobTable {
    /// Create an unbounded table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table that refuses to grow past `capacity` jobs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Start tracking a job.
    pub fn add(
        &mut self,
        id: JobId,
        pid: Pid,
        state: JobState,
        name: impl Into<String>,
    ) -> Result<(), JobTableError> {
        if self.jobs.contains_key(&pid) {
            return Err(JobTableError::AlreadyExists(pid));
        }
        if self.by_id.contains_key(&id) {
            return Err(JobTableError::DuplicateJobId(id));
        }
        if let Some(cap) = self.capacity {
            if self.jobs.len() >= cap {
                return Err(JobTableError::CapacityExceeded(cap));
            }
        }

        self.by_id.insert(id, pid);
        self.jobs.insert(
            pid,
            Job {
                id,
                pid,
                state,
                name: name.into(),
            },
        );
        Ok(())
    }

    /// Stop tracking a job, returning it.
    pub fn remove(&mut self, pid: Pid) -> Result<Job, JobTableError> {
        let job = self.jobs.remove(&pid).ok_or(JobTableError::NotFound)?;
        self.by_id.remove(&job.id);
        Ok(job)
    }

    /// Record a state transition.
    pub fn update_state(&mut self, pid: Pid, state: JobState) -> Result<(), JobTableError> {
        let job = self.jobs.get_mut(&pid).ok_or(JobTableError::NotFound)?;
        job.state = state;
        Ok(())
    }

    pub fn lookup_pid_by_jid(&self, id: JobId) -> Result<Pid, JobTableError> {
        self.by_id.get(&id).copied().ok_or(JobTableError::NotFound)
    }

    pub fn lookup_jid_by_pid(&self, pid: Pid) -> Result<JobId, JobTableError> {
        self.jobs.get(&pid).map(|job| job.id).ok_or(JobTableError::NotFound)
    }

    /// Get a job by pid.
    pub fn get(&self, pid: Pid) -> Option<&Job> {
        self.jobs.get(&pid)
    }

    /// Advance the reaper sweep.
    ///
    /// Each sweep visits every pid tracked when the sweep began exactly once
    /// (skipping any removed along the way), then returns `None` once. The
    /// next call starts a fresh sweep.
    pub fn next_unreaped_pid(&mut self) -> Option<Pid> {
        if self.sweep.is_none() {
            self.sweep = Some(self.by_id.values().copied().collect());
        }

        if let Some(pending) = self.sweep.as_mut() {
            while let Some(pid) = pending.pop_front() {
                if self.jobs.contains_key(&pid) {
                    return Some(pid);
                }
            }
        }

        self.sweep = None;
        None
    }

    /// All jobs in ascending job id order.
    pub fn list(&self) -> Vec<JobInfo> {
        self.by_id
            .values()
            .filter_map(|pid| self.jobs.get(pid))
            .map(Job::info)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Release every entry. Used when the shell exits.
    pub fn destroy(&mut self) {
        self.jobs.clear();
        self.by_id.clear();
        self.sweep = None;
    }
}
