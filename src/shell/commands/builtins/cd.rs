// Cd command

use crate::shell::commands::Executable;
use crate::shell::context::ShellContext;
use anyhow::{Context, Result};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

pub struct CdCommand;

impl Executable for CdCommand {
    fn execute(&self, args: &[OsString], _ctx: &mut ShellContext) -> Result<i32> {
        // args[0] is "cd". Anything past args[1] is ignored.
        let target = match args.get(1) {
            Some(path) => PathBuf::from(path),
            None => env::var_os("HOME")
                .map(PathBuf::from)
                .context("cd: HOME is not set")?,
        };

        env::set_current_dir(&target)
            .with_context(|| format!("cd: {}", target.display()))?;
        log::debug!("Changed directory to {}", target.display());
        Ok(0)
    }
}
