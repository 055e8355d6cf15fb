//! Built-in commands for jobsh.
//!
//! These are always available and shadow programs of the same name.

mod bg;
mod cd;
mod exit;
mod fg;
mod jobs;
mod ln;
mod rm;

use super::BuiltinRegistry;

/// Register all builtins with the registry.
pub fn register_builtins(registry: &mut BuiltinRegistry) {
    registry.register(bg::Bg);
    registry.register(cd::Cd);
    registry.register(exit::Exit);
    registry.register(fg::Fg);
    registry.register(jobs::Jobs);
    registry.register(ln::Ln);
    registry.register(rm::Rm);
}
