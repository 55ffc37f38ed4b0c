use crate::config::ShellConfig;
use crate::shell::commands::Registry;
use crate::shell::commands::builtins::builtin_registry;
use crate::shell::jobs::JobTable;
use crate::shell::mode::{MODE, ModeController};
use crate::shell::wait::Termination;
use anyhow::Result;
use colored::*;
use nix::unistd::{self, Pid};
use std::fmt::Display;
use std::io::{self, Write};
use std::sync::Arc;

/// Everything the main loop carries between iterations.
pub struct ShellContext {
    /// The interpreter's own pid, substituted for `$$`.
    pub pid: Pid,
    pub mode: &'static ModeController,
    pub jobs: JobTable,
    /// Last foreground termination, reported by `status`.
    pub last_status: Termination,
    pub config: ShellConfig,
    pub should_exit: bool,
    pub registry: Arc<Registry>,
    out: Box<dyn Write>,
    err: Box<dyn Write>,
}

impl ShellContext {
    pub fn new(config: ShellConfig) -> Self {
        Self::with_io(config, &MODE, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_io(
        config: ShellConfig,
        mode: &'static ModeController,
        out: Box<dyn Write>,
        err: Box<dyn Write>,
    ) -> Self {
        Self {
            pid: unistd::getpid(),
            mode,
            jobs: JobTable::with_capacity(config.job_capacity),
            last_status: Termination::default(),
            config,
            should_exit: false,
            registry: Arc::new(builtin_registry()),
            out,
            err,
        }
    }

    /// Writes one line of user-visible output.
    pub fn say(&mut self, msg: impl Display) -> Result<()> {
        writeln!(self.out, "{}", msg)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn prompt(&mut self) -> Result<()> {
        write!(self.out, "{}", self.config.prompt)?;
        self.out.flush()?;
        Ok(())
    }

    /// Reports a non-fatal error to the user.
    pub fn report(&mut self, msg: impl Display) {
        let _ = writeln!(self.err, "{} {}", "smallsh:".red().bold(), msg);
        let _ = self.err.flush();
    }

    /// Flushes both sinks; called before fork so buffered bytes are not
    /// duplicated into the child.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        self.err.flush()?;
        Ok(())
    }
}
