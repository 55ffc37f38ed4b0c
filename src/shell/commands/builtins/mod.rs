pub mod cd;
pub mod exit;
pub mod status;

use crate::shell::commands::{Executable, Registry};
use std::collections::HashMap;

/// Builds the built-in table. Lookup is an exact match on the program name.
pub fn builtin_registry() -> Registry {
    let mut map: HashMap<String, Box<dyn Executable>> = HashMap::new();
    map.insert("status".to_string(), Box::new(status::StatusCommand));
    map.insert("cd".to_string(), Box::new(cd::CdCommand));
    map.insert("exit".to_string(), Box::new(exit::ExitCommand));
    map
}
