//! Builtin commands for jobsh.
//!
//! Every line whose first word names a builtin runs inside the shell process;
//! anything else is launched as a program.
//!
//! ```text
//! BuiltinRegistry
//! ├── Job control (jobs, fg, bg)
//! ├── Session (exit)
//! └── Files (cd, rm, ln)
//! ```

mod builtin;
mod context;
mod registry;
mod traits;

pub use builtin::register_builtins;
pub use context::{parse_job_selector, ExecContext, JOB_MARKER};
pub use registry::BuiltinRegistry;
pub use traits::{syntax_error, Builtin};
