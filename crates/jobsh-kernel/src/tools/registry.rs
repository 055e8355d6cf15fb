//! Builtin registry.

use std::collections::BTreeMap;

use super::traits::Builtin;

/// Name → builtin lookup table.
#[derive(Default)]
pub struct BuiltinRegistry {
    builtins: BTreeMap<String, Box<dyn Builtin>>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builtin, replacing any previous one with the same name.
    pub fn register<B: Builtin + 'static>(&mut self, builtin: B) {
        self.builtins
            .insert(builtin.name().to_string(), Box::new(builtin));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Builtin> {
        self.builtins.get(name).map(|b| b.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.builtins.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinRegistry")
            .field("builtins", &self.names())
            .finish()
    }
}
