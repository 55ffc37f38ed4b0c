use crate::shell::ast::Command;
use crate::shell::commands::system::ExternalCommand;
use crate::shell::context::ShellContext;
use anyhow::Result;
use log::debug;

/// Routes one parsed command to a built-in or to a child process.
///
/// Errors returned here are fatal to the interpreter; everything else is
/// reported and swallowed.
pub fn execute_command(mut cmd: Command, ctx: &mut ShellContext) -> Result<()> {
    if cmd.is_empty() {
        return Ok(());
    }
    let program = cmd.argv[0].to_string_lossy().into_owned();

    if cmd.background && !ctx.mode.mode().allows_background() {
        debug!("Foreground-only mode: running {} in the foreground", program);
        cmd.background = false;
    }

    if cmd.argv.len() > ctx.config.max_args {
        ctx.report(format!("too many arguments (limit is {})", ctx.config.max_args));
        return Ok(());
    }

    let registry = ctx.registry.clone();
    if let Some(builtin) = cmd.argv[0].to_str().and_then(|name| registry.get(name)) {
        match builtin.execute(&cmd.argv, ctx) {
            Ok(code) => debug!("Built-in {} returned {}", program, code),
            Err(e) => ctx.report(format!("{:#}", e)),
        }
        return Ok(());
    }

    ExternalCommand.launch(&cmd, ctx)
}
