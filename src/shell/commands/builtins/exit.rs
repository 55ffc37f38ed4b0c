// Exit command

use crate::shell::commands::Executable;
use crate::shell::context::ShellContext;
use anyhow::Result;
use std::ffi::OsString;

pub const FAREWELL: &str = "exiting...";

/// Ends the main loop. Arguments are ignored; the interpreter exits with 0
/// once the configured exit policy has been applied to background jobs.
pub struct ExitCommand;

impl Executable for ExitCommand {
    fn execute(&self, _args: &[OsString], ctx: &mut ShellContext) -> Result<i32> {
        ctx.say(FAREWELL)?;
        ctx.should_exit = true;
        Ok(0)
    }
}
