use crate::shell::wait::{self, Termination};
use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::thread;
use std::time::{Duration, Instant};

/// How long `terminate_all` waits for jobs to honor SIGTERM.
pub const TERM_GRACE: Duration = Duration::from_secs(2);
const REAP_INTERVAL: Duration = Duration::from_millis(20);

/// Line printed when a background job is found to have finished.
pub fn describe_completion(pid: Pid, termination: Termination) -> String {
    format!("background pid {} is done: {}", pid, termination)
}

/// Fixed-capacity registry of background pids.
///
/// Free slots are reused. Only the main loop touches it.
#[derive(Debug)]
pub struct JobTable {
    slots: Vec<Option<Pid>>,
}

impl JobTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.slots.contains(&Some(pid))
    }

    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Puts `pid` in the first free slot. Returns false when the table is
    /// full; the job then keeps running untracked.
    pub fn register(&mut self, pid: Pid) -> bool {
        if self.contains(pid) {
            return true;
        }
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(pid);
                debug!("Tracking background pid {}", pid);
                true
            }
            None => {
                warn!("Job table full ({} slots); pid {} will not be tracked", self.capacity(), pid);
                false
            }
        }
    }

    /// Checks every tracked pid without blocking and returns the ones that
    /// finished, freeing their slots.
    pub fn sweep(&mut self) -> Vec<(Pid, Termination)> {
        let mut done = Vec::new();
        for slot in self.slots.iter_mut() {
            let Some(pid) = *slot else { continue };
            match wait::try_wait(pid) {
                Ok(Some(termination)) => {
                    debug!("Reaped background pid {}: {}", pid, termination);
                    *slot = None;
                    done.push((pid, termination));
                }
                Ok(None) => {}
                Err(Errno::ECHILD) => {
                    debug!("pid {} is not our child any more; dropping it", pid);
                    *slot = None;
                }
                Err(e) => warn!("Failed to poll pid {}: {}", pid, e),
            }
        }
        done
    }

    /// Sends SIGTERM to every tracked job and reaps each one. Jobs still
    /// running after `TERM_GRACE` are killed with SIGKILL.
    pub fn terminate_all(&mut self) -> Vec<(Pid, Termination)> {
        let mut pending: Vec<Pid> = self.slots.iter_mut().filter_map(Option::take).collect();
        for &pid in &pending {
            send(pid, Signal::SIGTERM);
        }

        let mut done = Vec::new();
        let deadline = Instant::now() + TERM_GRACE;
        loop {
            pending.retain(|&pid| match wait::try_wait(pid) {
                Ok(Some(termination)) => {
                    done.push((pid, termination));
                    false
                }
                Ok(None) => true,
                Err(e) => {
                    debug!("Dropping pid {} during shutdown: {}", pid, e);
                    false
                }
            });
            if pending.is_empty() || Instant::now() >= deadline {
                break;
            }
            thread::sleep(REAP_INTERVAL);
        }

        for pid in pending {
            warn!("pid {} ignored SIGTERM; sending SIGKILL", pid);
            send(pid, Signal::SIGKILL);
            match wait::wait_for(pid) {
                Ok(termination) => done.push((pid, termination)),
                Err(e) => debug!("{:#}", e),
            }
        }
        done
    }
}

fn send(pid: Pid, sig: Signal) {
    if let Err(e) = signal::kill(pid, sig) {
        if e != Errno::ESRCH {
            warn!("Failed to send {} to pid {}: {}", sig, pid, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn spawn(program: &str, args: &[&str]) -> Pid {
        let child = Command::new(program).args(args).spawn().unwrap();
        Pid::from_raw(child.id() as i32)
    }

    #[test]
    fn test_describe_completion() {
        assert_eq!(
            describe_completion(Pid::from_raw(42), Termination::Exited(0)),
            "background pid 42 is done: exit value 0"
        );
        assert_eq!(
            describe_completion(Pid::from_raw(42), Termination::Signaled(9)),
            "background pid 42 is done: terminated by signal 9"
        );
    }

    #[test]
    fn test_register_until_full() {
        let mut table = JobTable::with_capacity(2);
        assert!(table.register(Pid::from_raw(100)));
        assert!(table.register(Pid::from_raw(101)));
        assert_eq!(table.len(), 2);

        // Full: dropped.
        assert!(!table.register(Pid::from_raw(102)));
        assert!(!table.contains(Pid::from_raw(102)));
        assert_eq!(table.pids().collect::<Vec<_>>(), vec![Pid::from_raw(100), Pid::from_raw(101)]);
    }

    #[test]
    fn test_no_duplicates() {
        let mut table = JobTable::with_capacity(3);
        assert!(table.register(Pid::from_raw(7)));
        assert!(table.register(Pid::from_raw(7)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_sweep_drops_foreign_pids() {
        let mut table = JobTable::with_capacity(1);
        // pid 1 is never our child.
        table.register(Pid::from_raw(1));
        assert!(table.sweep().is_empty());
        assert!(table.is_empty());

        // Freed slot is reused.
        assert!(table.register(Pid::from_raw(2)));
    }

    #[test]
    fn test_sweep_reports_exact_pid() {
        let mut table = JobTable::with_capacity(4);
        let slow = spawn("sleep", &["30"]);
        let fast = spawn("sh", &["-c", "exit 3"]);
        table.register(slow);
        table.register(fast);

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut reaped = Vec::new();
        while reaped.is_empty() && Instant::now() < deadline {
            reaped = table.sweep();
            thread::sleep(Duration::from_millis(20));
        }

        assert_eq!(reaped, vec![(fast, Termination::Exited(3))]);
        assert!(table.contains(slow));

        let killed = table.terminate_all();
        assert_eq!(killed, vec![(slow, Termination::Signaled(Signal::SIGTERM as i32))]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_terminate_all_kills_jobs_that_ignore_sigterm() {
        let mut table = JobTable::with_capacity(2);
        let stubborn = spawn("sh", &["-c", "trap '' TERM; exec sleep 30"]);
        table.register(stubborn);
        // Give the trap time to be installed.
        thread::sleep(Duration::from_millis(300));

        let started = Instant::now();
        let killed = table.terminate_all();
        assert!(started.elapsed() < TERM_GRACE + Duration::from_secs(5));
        assert_eq!(killed, vec![(stubborn, Termination::Signaled(Signal::SIGKILL as i32))]);
        assert!(table.is_empty());
    }
}
