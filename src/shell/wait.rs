use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::fmt;

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
}

impl Termination {
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(Termination::Exited(code)),
            WaitStatus::Signaled(_, sig, _) => Some(Termination::Signaled(sig as i32)),
            _ => None,
        }
    }
}

impl Default for Termination {
    fn default() -> Self {
        Termination::Exited(0)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exit value {}", code),
            Termination::Signaled(sig) => write!(f, "terminated by signal {}", sig),
        }
    }
}

/// Blocks until `pid` terminates.
pub fn wait_for(pid: Pid) -> Result<Termination> {
    loop {
        match wait::waitpid(pid, None) {
            Ok(status) => {
                if let Some(t) = Termination::from_wait_status(status) {
                    return Ok(t);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e).with_context(|| format!("Failed to wait for pid {}", pid)),
        }
    }
}

/// Non-blocking check on one specific child.
///
/// `Ok(None)` means it is still running. `ECHILD` surfaces as an error so the
/// caller can drop a pid it no longer owns.
pub fn try_wait(pid: Pid) -> nix::Result<Option<Termination>> {
    loop {
        match wait::waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => return Ok(None),
            Ok(status) => {
                if let Some(t) = Termination::from_wait_status(status) {
                    return Ok(Some(t));
                }
                return Ok(None);
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(Termination::Exited(0).to_string(), "exit value 0");
        assert_eq!(Termination::Exited(3).to_string(), "exit value 3");
        assert_eq!(Termination::Signaled(15).to_string(), "terminated by signal 15");
    }

    #[test]
    fn test_from_wait_status() {
        let pid = Pid::from_raw(10);
        assert_eq!(
            Termination::from_wait_status(WaitStatus::Exited(pid, 2)),
            Some(Termination::Exited(2))
        );
        assert_eq!(
            Termination::from_wait_status(WaitStatus::Signaled(pid, nix::sys::signal::Signal::SIGKILL, false)),
            Some(Termination::Signaled(9))
        );
        assert_eq!(Termination::from_wait_status(WaitStatus::StillAlive), None);
    }

    #[test]
    fn test_default_is_success() {
        assert_eq!(Termination::default(), Termination::Exited(0));
    }
}
