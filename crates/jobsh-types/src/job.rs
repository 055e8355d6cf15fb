//! Job identification, state, and status-event types.

use std::fmt;

/// Job identifier handed out by the kernel's job counter.
///
/// Ids grow monotonically and are never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a tracked job.
///
/// Finished jobs are removed from the table rather than kept in a terminal
/// state, so only the two live states exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Job is currently running.
    Running,
    /// Job was stopped by a signal (e.g., Ctrl-Z / SIGTSTP).
    Stopped,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Running => write!(f, "Running"),
            JobState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Snapshot of a job for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    /// Job ID.
    pub id: JobId,
    /// Process id of the group leader, which is also the process group id.
    pub pid: i32,
    /// Current state.
    pub state: JobState,
    /// Basename of the launched program.
    pub name: String,
}

impl fmt::Display for JobInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ({}) {} {}", self.id, self.pid, self.state, self.name)
    }
}

/// A job status transition, as reported to the user.
///
/// The `Display` impl renders the shell's status line for each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEvent {
    /// A job was started in the background.
    Started { id: JobId, pid: i32 },
    /// The job's leader exited normally.
    Exited { id: JobId, pid: i32, status: i32 },
    /// The job's leader was killed by a signal.
    Signaled { id: JobId, pid: i32, signal: i32 },
    /// The job was stopped by a signal.
    Stopped { id: JobId, pid: i32, signal: i32 },
    /// A stopped job was continued.
    Resumed { id: JobId, pid: i32 },
}

impl JobEvent {
    /// Job the event refers to.
    pub fn id(&self) -> JobId {
        match *self {
            JobEvent::Started { id, .. }
            | JobEvent::Exited { id, .. }
            | JobEvent::Signaled { id, .. }
            | JobEvent::Stopped { id, .. }
            | JobEvent::Resumed { id, .. } => id,
        }
    }

    /// Process the event refers to.
    pub fn pid(&self) -> i32 {
        match *self {
            JobEvent::Started { pid, .. }
            | JobEvent::Exited { pid, .. }
            | JobEvent::Signaled { pid, .. }
            | JobEvent::Stopped { pid, .. }
            | JobEvent::Resumed { pid, .. } => pid,
        }
    }

    /// True if the event means the job is gone for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEvent::Exited { .. } | JobEvent::Signaled { .. })
    }
}

impl fmt::Display for JobEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobEvent::Started { id, pid } => write!(f, "[{}] ({})", id, pid),
            JobEvent::Exited { id, pid, status } => {
                write!(f, "[{}] ({}) terminated with exit status {}", id, pid, status)
            }
            JobEvent::Signaled { id, pid, signal } => {
                write!(f, "[{}] ({}) terminated by signal {}", id, pid, signal)
            }
            JobEvent::Stopped { id, pid, signal } => {
                write!(f, "[{}] ({}) suspended by signal {}", id, pid, signal)
            }
            JobEvent::Resumed { id, pid } => write!(f, "[{}] ({}) resumed", id, pid),
        }
    }
}
