//! Job scheduling: the job table, the process launcher, and the reaper.

mod job;
mod launch;
mod reaper;

pub use job::{Job, JobCounter, JobId, JobInfo, JobState, JobTable, JobTableError};
pub use launch::{launch, LaunchError, LaunchOutcome, PreparedCommand};
pub use reaper::reap;
