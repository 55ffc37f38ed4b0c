// Status command

use crate::shell::commands::Executable;
use crate::shell::context::ShellContext;
use anyhow::Result;
use std::ffi::OsString;

pub struct StatusCommand;

impl Executable for StatusCommand {
    fn execute(&self, _args: &[OsString], ctx: &mut ShellContext) -> Result<i32> {
        let last = ctx.last_status;
        ctx.say(last)?;
        Ok(0)
    }
}
