//! The Kernel: job supervisor for jobsh.
//!
//! The Kernel owns everything the shell's control flow mutates:
//! - Job table (background and stopped jobs)
//! - Job counter (monotonic job ids)
//! - Terminal control (foreground process group handoff)
//! - Builtin registry
//!
//! # Per-line flow
//!
//! ```text
//!  reap() ──▶ execute(line)
//!               │
//!               ├─ tokenize ─▶ parse ──✗──▶ syntax error
//!               │
//!               ├─ builtin? ──▶ Builtin::execute(ExecContext)
//!               │
//!               └─ program ──▶ PreparedCommand ─▶ launch(ExecContext)
//! ```
//!
//! The REPL calls [`Kernel::reap`] before reading each line; nothing else
//! observes background jobs.

use std::io::IsTerminal;

use anyhow::Result;
use jobsh_types::{ExecResult, JobEvent};

use crate::lexer::tokenize;
use crate::parser::{parse, CommandLine};
use crate::scheduler::{self, JobCounter, JobTable, LaunchError, LaunchOutcome, PreparedCommand};
use crate::terminal::TerminalControl;
use crate::tools::{register_builtins, BuiltinRegistry, ExecContext};

/// Environment variable that turns on the `<cwd> $ ` prompt.
pub const PROMPT_ENV: &str = "JOBSH_PROMPT";

/// Configuration for kernel initialization.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Name of this kernel (for identification in logs).
    pub name: String,

    /// Hand the controlling terminal to foreground jobs.
    ///
    /// Only meaningful when standard input is a terminal.
    pub job_control: bool,

    /// Refuse to track more than this many jobs at once.
    pub max_jobs: Option<usize>,

    /// Show a `<cwd> $ ` prompt before each line.
    pub prompt: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            job_control: false,
            max_jobs: None,
            prompt: false,
        }
    }
}

impl KernelConfig {
    /// Configuration for a shell attached to the user's terminal.
    ///
    /// Job control follows whether stdin is a terminal; the prompt follows
    /// `JOBSH_PROMPT`.
    pub fn interactive() -> Self {
        Self {
            name: "interactive".to_string(),
            job_control: std::io::stdin().is_terminal(),
            prompt: std::env::var_os(PROMPT_ENV).is_some(),
            ..Self::default()
        }
    }

    /// Configuration that never touches the terminal (embedding, tests).
    pub fn transient() -> Self {
        Self {
            name: "transient".to_string(),
            ..Self::default()
        }
    }

    /// Set whether foreground jobs get the terminal.
    pub fn with_job_control(mut self, enabled: bool) -> Self {
        self.job_control = enabled;
        self
    }

    /// Cap the number of tracked jobs.
    pub fn with_max_jobs(mut self, max: usize) -> Self {
        self.max_jobs = Some(max);
        self
    }

    /// Set whether a prompt is shown.
    pub fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }
}

/// What the REPL should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlFlow {
    /// Show the result and read the next line.
    Continue(ExecResult),
    /// Terminate the shell with this status. The job table is already released.
    Exit(i32),
}

/// The job supervisor.
#[derive(Debug)]
pub struct Kernel {
    name: String,
    prompt: bool,
    jobs: JobTable,
    counter: JobCounter,
    terminal: TerminalControl,
    builtins: BuiltinRegistry,
}

impl Kernel {
    /// Create a new kernel with the given configuration.
    pub fn new(config: KernelConfig) -> Result<Self> {
        let terminal = if config.job_control {
            TerminalControl::detect()
        } else {
            TerminalControl::disabled()
        };

        let jobs = match config.max_jobs {
            Some(max) => JobTable::with_capacity(max),
            None => JobTable::new(),
        };

        let mut builtins = BuiltinRegistry::new();
        register_builtins(&mut builtins);

        tracing::debug!(
            name = %config.name,
            job_control = terminal.is_enabled(),
            shell_pgid = terminal.shell_pgid().as_raw(),
            "kernel created"
        );

        Ok(Self {
            name: config.name,
            prompt: config.prompt,
            jobs,
            counter: JobCounter::new(),
            terminal,
            builtins,
        })
    }

    /// Kernel with [`KernelConfig::transient`].
    pub fn transient() -> Result<Self> {
        Self::new(KernelConfig::transient())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Live jobs.
    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    pub fn terminal(&self) -> &TerminalControl {
        &self.terminal
    }

    /// Prompt text for the next line, if prompting is on.
    pub fn prompt(&self) -> Option<String> {
        if !self.prompt {
            return None;
        }
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Some(format!("{} $ ", cwd))
    }

    /// Poll every tracked job once without blocking.
    pub fn reap(&mut self) -> Vec<JobEvent> {
        scheduler::reap(&mut self.jobs)
    }

    /// Execute one line of input.
    pub fn execute(&mut self, line: &str) -> ControlFlow {
        self.execute_words(&tokenize(line))
    }

    /// Execute an already tokenized line. No words is a no-op.
    pub fn execute_words<S: AsRef<str>>(&mut self, words: &[S]) -> ControlFlow {
        if words.is_empty() {
            return ControlFlow::Continue(ExecResult::default());
        }

        let cmd = match parse(words) {
            Ok(cmd) => cmd,
            Err(e) => return ControlFlow::Continue(ExecResult::failure(2, format!("{}\n", e))),
        };

        if let Some(builtin) = self.builtins.get(cmd.program()) {
            let mut ctx = ExecContext::new(&mut self.jobs, &mut self.counter, &self.terminal);
            let result = builtin.execute(cmd.args(), &mut ctx);
            if let Some(code) = ctx.exit_code() {
                self.shutdown();
                return ControlFlow::Exit(code);
            }
            return ControlFlow::Continue(result);
        }

        ControlFlow::Continue(self.run_program(&cmd))
    }

    /// Release every tracked job. Running jobs are left alone.
    pub fn shutdown(&mut self) {
        if !self.jobs.is_empty() {
            tracing::debug!(jobs = self.jobs.len(), "releasing job table");
        }
        self.jobs.destroy();
    }

    fn run_program(&mut self, cmd: &CommandLine) -> ExecResult {
        let path_var = std::env::var("PATH").unwrap_or_default();
        let prepared = match PreparedCommand::new(cmd, &path_var) {
            Ok(p) => p,
            Err(e @ LaunchError::CommandNotFound(_)) => {
                return ExecResult::failure(127, format!("{}\n", e));
            }
            Err(e) => return ExecResult::failure(1, format!("{}\n", e)),
        };

        let mut ctx = ExecContext::new(&mut self.jobs, &mut self.counter, &self.terminal);
        match scheduler::launch(&prepared, &mut ctx) {
            Ok(LaunchOutcome::Completed { status, .. }) => {
                ExecResult::from_output(status as i64, "", "")
            }
            Ok(LaunchOutcome::Event(event)) => {
                ExecResult::from_output(event_code(&event), "", "").with_err_line(event.to_string())
            }
            Err(e) => {
                tracing::warn!(command = prepared.name(), "launch failed: {}", e);
                ExecResult::failure(1, format!("{}\n", e))
            }
        }
    }
}

/// Exit code a line reports when it ends in a job event.
fn event_code(event: &JobEvent) -> i64 {
    match *event {
        JobEvent::Started { .. } | JobEvent::Resumed { .. } => 0,
        JobEvent::Exited { status, .. } => status as i64,
        JobEvent::Signaled { signal, .. } | JobEvent::Stopped { signal, .. } => 128 + signal as i64,
    }
}
