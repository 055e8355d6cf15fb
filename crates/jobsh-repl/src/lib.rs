//! jobsh REPL: interactive front end for the jobsh kernel.
//!
//! Each iteration reaps background jobs, reads one line, and hands it to the
//! kernel. Results are rendered with stdout and stderr kept apart, so a
//! redirected shell behaves like any other filter.
//!
//! When stdin is a terminal, lines are read through rustyline with history
//! persisted under the user's data directory. Otherwise stdin is read plainly,
//! one line at a time.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use jobsh_kernel::signals::ignore_job_control_signals;
use jobsh_kernel::{ControlFlow, Kernel, KernelConfig};
use jobsh_types::{ExecResult, JobEvent};

/// REPL state: one kernel and nothing else.
pub struct Repl {
    kernel: Kernel,
}

impl Repl {
    /// Create a REPL attached to the current terminal (if any).
    pub fn new() -> Result<Self> {
        Self::with_config(KernelConfig::interactive())
    }

    /// Create a REPL with a custom kernel configuration.
    pub fn with_config(config: KernelConfig) -> Result<Self> {
        let kernel = Kernel::new(config).context("Failed to create kernel")?;
        Ok(Self { kernel })
    }

    /// Process a single line of input.
    pub fn process_line(&mut self, line: &str) -> ControlFlow {
        self.kernel.execute(line)
    }

    /// Collect job status changes since the last call.
    pub fn reap(&mut self) -> Vec<JobEvent> {
        self.kernel.reap()
    }

    pub fn prompt(&self) -> Option<String> {
        self.kernel.prompt()
    }

    /// Release the job table (end of input).
    pub fn shutdown(&mut self) {
        self.kernel.shutdown();
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }
}

/// Write a result's streams to the process's stdout and stderr.
pub fn render(result: &ExecResult) {
    if !result.out.is_empty() {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(result.out.as_bytes());
        let _ = stdout.flush();
    }
    if !result.err.is_empty() {
        let _ = io::stderr().write_all(result.err.as_bytes());
    }
}

/// One read from the input source.
enum Read {
    Line(String),
    Interrupted,
    Eof,
    Failed(anyhow::Error),
}

/// Consecutive read failures after which the input counts as closed.
const MAX_READ_FAILURES: u32 = 16;

/// Where lines come from.
enum Input {
    Editor {
        rl: Box<Editor<(), DefaultHistory>>,
        history_path: Option<PathBuf>,
    },
    Plain(io::StdinLock<'static>),
}

impl Input {
    fn open() -> Result<Self> {
        if !io::stdin().is_terminal() {
            return Ok(Input::Plain(io::stdin().lock()));
        }

        let mut rl: Editor<(), DefaultHistory> =
            Editor::new().context("Failed to create editor")?;

        let history_path = directories::BaseDirs::new()
            .map(|b| b.data_dir().join("jobsh").join("history.txt"));
        if let Some(ref path) = history_path {
            if let Err(e) = rl.load_history(path) {
                // Missing on first run
                let is_not_found = matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound);
                if !is_not_found {
                    tracing::warn!("Failed to load history: {}", e);
                }
            }
        }

        Ok(Input::Editor {
            rl: Box::new(rl),
            history_path,
        })
    }

    fn read(&mut self, prompt: Option<&str>) -> Read {
        match self {
            Input::Editor { rl, .. } => match rl.readline(prompt.unwrap_or("")) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(e) = rl.add_history_entry(line.as_str()) {
                            tracing::warn!("Failed to add history entry: {}", e);
                        }
                    }
                    Read::Line(line)
                }
                Err(ReadlineError::Interrupted) => Read::Interrupted,
                Err(ReadlineError::Eof) => Read::Eof,
                Err(e) => Read::Failed(anyhow::anyhow!("{}", e)),
            },
            Input::Plain(stdin) => {
                if let Some(prompt) = prompt {
                    let mut stdout = io::stdout().lock();
                    let _ = stdout.write_all(prompt.as_bytes());
                    let _ = stdout.flush();
                }
                // Bytes first: a line that is not UTF-8 must not end the shell.
                let mut buf = Vec::new();
                match stdin.read_until(b'\n', &mut buf) {
                    Ok(0) => Read::Eof,
                    Ok(_) => Read::Line(String::from_utf8_lossy(&buf).into_owned()),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => Read::Interrupted,
                    Err(e) => Read::Failed(e.into()),
                }
            }
        }
    }

    fn save_history(&mut self) {
        let Input::Editor { rl, history_path: Some(path) } = self else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create history directory: {}", e);
            }
        }
        if let Err(e) = rl.save_history(path.as_path()) {
            tracing::warn!("Failed to save history: {}", e);
        }
    }
}

/// Run the REPL until `exit` or end of input. Returns the shell's exit status.
pub fn run() -> Result<i32> {
    ignore_job_control_signals().context("Failed to ignore job control signals")?;

    let mut repl = Repl::new()?;
    let mut input = Input::open()?;

    let mut failures = 0;
    loop {
        for event in repl.reap() {
            eprintln!("{}", event);
        }

        let prompt = repl.prompt();
        let read = input.read(prompt.as_deref());
        if !matches!(read, Read::Failed(_)) {
            failures = 0;
        }

        match read {
            Read::Line(line) => match repl.process_line(&line) {
                ControlFlow::Continue(result) => render(&result),
                ControlFlow::Exit(code) => {
                    input.save_history();
                    return Ok(code);
                }
            },
            Read::Interrupted => continue,
            Read::Failed(e) => {
                eprintln!("jobsh: failed to read from standard input: {}", e);
                failures += 1;
                if failures >= MAX_READ_FAILURES {
                    // The stream is dead; treat it like end of input.
                    tracing::warn!(failures, "giving up on standard input");
                    repl.shutdown();
                    input.save_history();
                    return Ok(0);
                }
            }
            Read::Eof => {
                repl.shutdown();
                input.save_history();
                return Ok(0);
            }
        }
    }
}
