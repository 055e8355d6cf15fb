//! Pure data types for jobsh: job identities, states, and status events.
//!
//! This crate is a leaf dependency with no OS bindings and no I/O. It holds
//! the vocabulary shared by the kernel (which produces it) and the REPL
//! (which renders it).

pub mod job;
pub mod result;

// Flat re-exports for convenience
pub use job::*;
pub use result::*;
