// External command: fork, redirect, exec

use crate::shell::ast::Command;
use crate::shell::context::ShellContext;
use crate::shell::jobs::describe_completion;
use crate::shell::signals;
use crate::shell::wait::{self, Termination};
use anyhow::{Context, Result};
use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::libc;
use nix::sys::stat::Mode;
use nix::unistd::{self, ForkResult, Pid};
use std::ffi::{CStr, CString, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::os::fd::{BorrowedFd, RawFd};

const DEV_NULL: &CStr = c"/dev/null";

pub struct ExternalCommand;

impl ExternalCommand {
    /// Runs `cmd` in a child process.
    ///
    /// Only a failed fork is returned as an error. Everything that goes wrong
    /// after the fork is the child's problem and shows up as its exit status.
    pub fn launch(&self, cmd: &Command, ctx: &mut ShellContext) -> Result<()> {
        let plan = match ChildPlan::prepare(cmd) {
            Ok(plan) => plan,
            Err(e) => {
                ctx.report(format!("{:#}", e));
                return Ok(());
            }
        };

        ctx.flush()?;
        match unsafe { unistd::fork() }.context("fork failed")? {
            ForkResult::Child => plan.exec(),
            ForkResult::Parent { child } => {
                debug!("Spawned pid {} for {:?} (background: {})", child, cmd.argv, cmd.background);
                if cmd.background {
                    self.supervise_background(child, ctx)
                } else {
                    self.supervise_foreground(child, ctx)
                }
            }
        }
    }

    fn supervise_foreground(&self, child: Pid, ctx: &mut ShellContext) -> Result<()> {
        let termination = match wait::wait_for(child) {
            Ok(t) => t,
            Err(e) => {
                warn!("{:#}", e);
                ctx.report(format!("{:#}", e));
                return Ok(());
            }
        };

        if let Termination::Signaled(_) = termination {
            ctx.say(termination)?;
        }
        ctx.last_status = termination;
        Ok(())
    }

    fn supervise_background(&self, child: Pid, ctx: &mut ShellContext) -> Result<()> {
        ctx.say(format!("background pid is {}", child))?;

        // One non-blocking attempt. A child that is already gone is reported
        // here and never reaches the job table.
        match wait::try_wait(child) {
            Ok(Some(termination)) => ctx.say(describe_completion(child, termination))?,
            Ok(None) => {
                ctx.jobs.register(child);
            }
            Err(e) => warn!("Failed to poll new background pid {}: {}", child, e),
        }
        Ok(())
    }
}

/// Everything the child needs, built before the fork so the child only makes
/// raw system calls.
struct ChildPlan {
    argv: Vec<CString>,
    input: Option<CString>,
    output: Option<CString>,
    background: bool,
    input_error: Vec<u8>,
    output_error: Vec<u8>,
    exec_error: Vec<u8>,
}

impl ChildPlan {
    fn prepare(cmd: &Command) -> Result<Self> {
        let argv = cmd
            .argv
            .iter()
            .map(|a| CString::new(a.as_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .context("arguments may not contain NUL bytes")?;
        let input = cmd
            .input
            .as_deref()
            .map(|p| CString::new(p.as_bytes()))
            .transpose()
            .context("input path may not contain NUL bytes")?;
        let output = cmd
            .output
            .as_deref()
            .map(|p| CString::new(p.as_bytes()))
            .transpose()
            .context("output path may not contain NUL bytes")?;

        Ok(Self {
            argv,
            input,
            output,
            background: cmd.background,
            input_error: open_error(cmd.input.as_deref(), "input"),
            output_error: open_error(cmd.output.as_deref(), "output"),
            exec_error: cmd.program().unwrap_or_default().as_bytes().to_vec(),
        })
    }

    fn exec(&self) -> ! {
        if let Err(e) = signals::reset_for_child(self.background) {
            fail(b"cannot reset signal dispositions", e);
        }

        // Background jobs stay off the terminal unless told otherwise.
        if self.background {
            if self.input.is_none() {
                if let Err(e) = redirect(DEV_NULL, OFlag::O_RDONLY, Mode::empty(), libc::STDIN_FILENO) {
                    fail(b"cannot open /dev/null for input", e);
                }
            }
            if self.output.is_none() {
                if let Err(e) = redirect(DEV_NULL, OFlag::O_WRONLY, Mode::empty(), libc::STDOUT_FILENO) {
                    fail(b"cannot open /dev/null for output", e);
                }
            }
        }

        if let Some(path) = &self.input {
            if let Err(e) = redirect(path, OFlag::O_RDONLY, Mode::empty(), libc::STDIN_FILENO) {
                fail(&self.input_error, e);
            }
        }

        if let Some(path) = &self.output {
            let flags = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC;
            let mode = Mode::from_bits_truncate(0o644);
            if let Err(e) = redirect(path, flags, mode, libc::STDOUT_FILENO) {
                fail(&self.output_error, e);
            }
        }

        match unistd::execvp(&self.argv[0], &self.argv) {
            Ok(never) => match never {},
            Err(e) => fail(&self.exec_error, e),
        }
    }
}

fn open_error(path: Option<&OsStr>, direction: &str) -> Vec<u8> {
    let path = path.map(OsStr::as_bytes).unwrap_or_default();
    let parts: [&[u8]; 4] = [b"cannot open ", path, b" for ", direction.as_bytes()];
    parts.concat()
}

/// Opens `path` and installs it as `target`. The temporary descriptor is
/// closed so that only `target` survives the exec.
fn redirect(path: &CStr, flags: OFlag, mode: Mode, target: RawFd) -> nix::Result<()> {
    let fd = fcntl::open(path, flags, mode)?;
    if fd != target {
        unistd::dup2(fd, target)?;
        let _ = unistd::close(fd);
    }
    Ok(())
}

/// Child-side failure: report on stderr and leave without running any of the
/// interpreter's destructors.
fn fail(context: &[u8], err: Errno) -> ! {
    let stderr = unsafe { BorrowedFd::borrow_raw(libc::STDERR_FILENO) };
    let parts: [&[u8]; 4] = [context, b": ", err.desc().as_bytes(), b"\n"];
    for part in parts {
        let _ = unistd::write(stderr, part);
    }
    unsafe { libc::_exit(1) }
}
