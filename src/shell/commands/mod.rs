pub mod builtins;
pub mod system;

use crate::shell::context::ShellContext;
use anyhow::Result;
use std::collections::HashMap;
use std::ffi::OsString;

/// Built-ins keyed by program name.
pub type Registry = HashMap<String, Box<dyn Executable>>;

/// A command that runs inside the interpreter process.
pub trait Executable {
    fn execute(&self, args: &[OsString], ctx: &mut ShellContext) -> Result<i32>;
}
