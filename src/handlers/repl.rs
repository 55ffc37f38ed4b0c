use anyhow::Result;
use log::info;
use std::env;
use std::io;
use crate::cli::Cli;
use crate::config::load_config;
use crate::shell::context::ShellContext;
use crate::shell::{run_loop, shutdown, signals};

pub fn handle_repl(cli: Cli) -> Result<()> {
    let current_dir = env::current_dir()?;
    let mut config = load_config(cli.config.as_deref(), &current_dir)?;

    if let Some(prompt) = cli.prompt {
        config.prompt = prompt;
    }
    if cli.no_color || !config.color {
        colored::control::set_override(false);
    }

    signals::install()?;

    let mut ctx = ShellContext::new(config);
    info!("smallsh started (pid {})", ctx.pid);

    let result = run_loop(io::stdin().lock(), &mut ctx);
    shutdown(&mut ctx);
    result
}
