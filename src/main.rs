mod cli;
mod config;
mod handlers;
mod shell;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use handlers::repl;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    repl::handle_repl(cli)
}
