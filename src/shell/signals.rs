// Signal dispositions for the interpreter and its children

use crate::shell::mode::MODE;
use anyhow::{Context, Result};
use nix::libc;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd;
use std::os::fd::BorrowedFd;

extern "C" fn on_stop(_: libc::c_int) {
    let entered = MODE.toggle();
    // Only async-signal-safe calls from here on.
    let stdout = unsafe { BorrowedFd::borrow_raw(libc::STDOUT_FILENO) };
    let _ = unistd::write(stdout, entered.notice().as_bytes());
}

/// Ignores the interrupt signal and routes the stop signal to the mode toggle.
///
/// The ignore disposition survives exec, which is what keeps background
/// children immune to a terminal interrupt.
pub fn install() -> Result<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::all());
    unsafe { signal::sigaction(Signal::SIGINT, &ignore) }.context("Failed to ignore SIGINT")?;

    let stop = SigAction::new(SigHandler::Handler(on_stop), SaFlags::SA_RESTART, SigSet::all());
    unsafe { signal::sigaction(Signal::SIGTSTP, &stop) }.context("Failed to install SIGTSTP handler")?;

    log::debug!("Signal handlers installed");
    Ok(())
}

/// Runs in a freshly forked child, before any redirection or exec.
///
/// Every child ignores the stop signal. Foreground children get the default
/// interrupt disposition back; background children keep the inherited ignore.
/// SIGPIPE is ignored by the Rust runtime and would otherwise leak into exec.
pub fn reset_for_child(background: bool) -> nix::Result<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());

    unsafe { signal::sigaction(Signal::SIGTSTP, &ignore) }?;
    unsafe { signal::sigaction(Signal::SIGPIPE, &default) }?;
    if !background {
        unsafe { signal::sigaction(Signal::SIGINT, &default) }?;
    }
    Ok(())
}
