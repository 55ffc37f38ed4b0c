pub mod ast;
pub mod commands;
pub mod context;
pub mod executor;
pub mod jobs;
pub mod mode;
pub mod parser;
pub mod signals;
pub mod wait;

use crate::config::ExitPolicy;
use anyhow::{Context, Result};
use context::ShellContext;
use executor::execute_command;
use jobs::describe_completion;
use log::{debug, info};
use std::ffi::OsStr;
use std::io::BufRead;
use std::os::unix::ffi::OsStrExt;


/// Expands, parses and dispatches one line of input.
pub fn run_line(line: impl AsRef<OsStr>, ctx: &mut ShellContext) -> Result<()> {
    let line = line.as_ref().as_bytes();
    if line.len() > ctx.config.max_line_length {
        ctx.report(format!("input line too long (limit is {} bytes)", ctx.config.max_line_length));
        return Ok(());
    }
    if parser::is_comment_or_blank(line) {
        return Ok(());
    }

    let expanded = parser::expand_self_reference(line, ctx.pid.as_raw() as u32);
    let parsed = parser::parse_command_line(&expanded);
    for issue in &parsed.issues {
        ctx.report(issue);
    }
    debug!("Parsed command: {:?}", parsed.command);

    execute_command(parsed.command, ctx)
}

/// Reports every background job that has finished since the last sweep.
pub fn sweep_jobs(ctx: &mut ShellContext) -> Result<()> {
    for (pid, termination) in ctx.jobs.sweep() {
        ctx.say(describe_completion(pid, termination))?;
    }
    Ok(())
}

/// Prompt, read, run, sweep; until `exit` or end of input.
pub fn run_loop<R: BufRead>(mut input: R, ctx: &mut ShellContext) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        ctx.prompt()?;

        buf.clear();
        let n = input.read_until(b'\n', &mut buf).context("Failed to read input")?;
        if n == 0 {
            debug!("End of input");
            break;
        }

        while let Some(b'\n' | b'\r') = buf.last() {
            buf.pop();
        }
        run_line(OsStr::from_bytes(&buf), ctx)?;
        if ctx.should_exit {
            break;
        }

        sweep_jobs(ctx)?;
    }
    Ok(())
}

/// Applies the exit policy to jobs still in the table.
pub fn shutdown(ctx: &mut ShellContext) {
    match ctx.config.exit_policy {
        ExitPolicy::Terminate => {
            for (pid, termination) in ctx.jobs.terminate_all() {
                debug!("Terminated background pid {}: {}", pid, termination);
            }
        }
        ExitPolicy::Abandon => {
            if !ctx.jobs.is_empty() {
                let pids: Vec<String> = ctx.jobs.pids().map(|p| p.to_string()).collect();
                info!("Leaving background jobs running: {}", pids.join(", "));
            }
        }
    }
}
