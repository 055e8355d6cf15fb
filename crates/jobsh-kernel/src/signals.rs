//! Signal policy for the shell and its children.
//!
//! The shell ignores the keyboard job-control signals for its whole lifetime
//! so that Ctrl-C, Ctrl-Z and Ctrl-\ only reach the foreground job's process
//! group. A launched child puts them back to their defaults before exec.

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Signals whose disposition the shell overrides.
pub const JOB_CONTROL_SIGNALS: [Signal; 4] = [
    Signal::SIGINT,
    Signal::SIGTSTP,
    Signal::SIGQUIT,
    Signal::SIGTTOU,
];

/// Ignore the job-control signals in the calling process.
pub fn ignore_job_control_signals() -> nix::Result<()> {
    set_disposition(SigHandler::SigIgn)
}

/// Restore default dispositions for the job-control signals.
///
/// Called in the forked child, so it allocates nothing.
pub fn restore_default_signals() -> nix::Result<()> {
    set_disposition(SigHandler::SigDfl)
}

fn set_disposition(handler: SigHandler) -> nix::Result<()> {
    let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
    for sig in JOB_CONTROL_SIGNALS {
        // SAFETY: SIG_IGN and SIG_DFL install no handler code.
        unsafe { sigaction(sig, &action) }?;
    }
    Ok(())
}
