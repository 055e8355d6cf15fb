//! jobsh-kernel: job supervision core for jobsh.
//!
//! This crate provides:
//!
//! - **Lexer**: Splits a line into words
//! - **Parser**: Extracts `<`, `>`, `>>` redirections and the trailing `&`
//! - **Scheduler**: Job table, process launcher, and the polling reaper
//! - **Terminal**: Foreground process group handoff
//! - **Signals**: The shell's job-control signal policy
//! - **Tools**: Builtin trait, registry, and the builtin commands
//! - **Kernel**: The supervisor tying them together

pub mod kernel;
pub mod lexer;
pub mod parser;
pub mod paths;
pub mod scheduler;
pub mod signals;
pub mod terminal;
pub mod tools;

pub use kernel::{ControlFlow, Kernel, KernelConfig};
pub use parser::{parse, CommandLine, ParseError};
pub use scheduler::{Job, JobCounter, JobTable, JobTableError};
pub use terminal::TerminalControl;

// Shared vocabulary, so embedders need only this crate.
pub use jobsh_types::{ExecResult, JobEvent, JobId, JobInfo, JobState};
