//! Terminal handoff tests on a pseudo-terminal.
//!
//! The test binary re-runs itself as a session leader whose controlling
//! terminal is a fresh pty slave, so terminal ownership can be checked
//! without touching the terminal the tests were started from.

#![cfg(target_os = "linux")]

use std::fs;
use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use jobsh_kernel::signals::ignore_job_control_signals;
use jobsh_kernel::{ControlFlow, ExecResult, JobState, Kernel, KernelConfig};
use nix::pty::openpty;
use nix::sys::signal::Signal;
use tempfile::TempDir;

/// Set in the re-run child; names the scenario to run.
const SCENARIO_ENV: &str = "JOBSH_PTY_SCENARIO";

fn run(kernel: &mut Kernel, line: &str) -> ExecResult {
    match kernel.execute(line) {
        ControlFlow::Continue(result) => result,
        ControlFlow::Exit(code) => panic!("'{}' exited the shell with {}", line, code),
    }
}

/// Run `test_name` again in a new session with a pty as controlling terminal.
fn run_on_pty(test_name: &str) {
    let pty = openpty(None, None).expect("Failed to open pty");

    let mut cmd = Command::new(std::env::current_exe().expect("test binary path"));
    cmd.args(["--exact", test_name, "--test-threads=1", "--nocapture"])
        .env(SCENARIO_ENV, test_name)
        .stdin(Stdio::from(pty.slave))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // SAFETY: only async-signal-safe syscalls run between fork and exec.
    unsafe {
        cmd.pre_exec(|| {
            nix::unistd::setsid().map_err(io::Error::from)?;
            if nix::libc::ioctl(0, nix::libc::TIOCSCTTY, 0) == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let output = cmd.output().expect("Failed to run pty scenario");
    // Keep the master open until the session is done with the slave.
    drop(pty.master);

    assert!(
        output.status.success(),
        "pty scenario failed\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn in_scenario(test_name: &str) -> bool {
    std::env::var(SCENARIO_ENV).as_deref() == Ok(test_name)
}

/// Exits 0 only if the script's own group owns its controlling terminal.
const OWNS_TERMINAL: &str = "read -r stat < /proc/$$/stat\nset -- $stat\ntest \"$5\" = \"$8\"\n";

#[test]
fn foreground_job_gets_terminal_and_shell_gets_it_back() {
    const NAME: &str = "foreground_job_gets_terminal_and_shell_gets_it_back";
    if !in_scenario(NAME) {
        return run_on_pty(NAME);
    }

    ignore_job_control_signals().unwrap();
    let mut kernel = Kernel::new(KernelConfig::transient().with_job_control(true)).unwrap();
    let terminal = kernel.terminal().clone();
    assert!(terminal.is_enabled());
    assert_eq!(terminal.foreground_group(), Some(terminal.shell_pgid()));

    let dir = TempDir::new().unwrap();
    let script = dir.path().join("owns.sh");
    fs::write(&script, OWNS_TERMINAL).unwrap();

    let result = run(&mut kernel, &format!("sh {}", script.display()));
    assert_eq!(result.code, 0, "foreground job did not own the terminal");
    assert_eq!(terminal.foreground_group(), Some(terminal.shell_pgid()));

    let result = run(&mut kernel, &format!("sh {} &", script.display()));
    assert!(result.ok());
    assert_eq!(terminal.foreground_group(), Some(terminal.shell_pgid()));
}

#[test]
fn terminal_returns_to_shell_after_stop_and_fg() {
    const NAME: &str = "terminal_returns_to_shell_after_stop_and_fg";
    if !in_scenario(NAME) {
        return run_on_pty(NAME);
    }

    ignore_job_control_signals().unwrap();
    let mut kernel = Kernel::new(KernelConfig::transient().with_job_control(true)).unwrap();
    let terminal = kernel.terminal().clone();
    let shell = terminal.shell_pgid();

    let dir = TempDir::new().unwrap();
    let script = dir.path().join("stop.sh");
    fs::write(&script, format!("kill -STOP $$\n{}", OWNS_TERMINAL)).unwrap();

    // Stopped in the foreground: tracked, and the terminal is back with us.
    let result = run(&mut kernel, &format!("sh {}", script.display()));
    assert_eq!(result.code, 128 + Signal::SIGSTOP as i64);
    let jobs = kernel.jobs().list();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].state, JobState::Stopped);
    assert_eq!(terminal.foreground_group(), Some(shell));

    // fg hands the terminal over again; the script checks it owns it.
    let result = run(&mut kernel, "fg %1");
    assert_eq!(
        result.err,
        format!("[1] ({}) terminated with exit status 0\n", jobs[0].pid)
    );
    assert!(kernel.jobs().is_empty());
    assert_eq!(terminal.foreground_group(), Some(shell));
}
