use std::sync::atomic::{AtomicBool, Ordering};

pub const ENTER_FOREGROUND_ONLY: &str = "\nEntering foreground-only mode (& is now ignored)\n";
pub const EXIT_FOREGROUND_ONLY: &str = "\nExiting foreground-only mode\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A trailing `&` launches the command in the background.
    Normal,
    /// A trailing `&` is stripped and the command runs in the foreground.
    ForegroundOnly,
}

impl Mode {
    pub fn allows_background(self) -> bool {
        self == Mode::Normal
    }

    /// Notice printed when this mode is entered.
    pub fn notice(self) -> &'static str {
        match self {
            Mode::Normal => EXIT_FOREGROUND_ONLY,
            Mode::ForegroundOnly => ENTER_FOREGROUND_ONLY,
        }
    }
}

/// Lock-free mode flag.
///
/// Written only by the stop-signal handler, read by the dispatcher.
#[derive(Debug)]
pub struct ModeController {
    foreground_only: AtomicBool,
}

impl ModeController {
    pub const fn new() -> Self {
        Self {
            foreground_only: AtomicBool::new(false),
        }
    }

    pub fn mode(&self) -> Mode {
        if self.foreground_only.load(Ordering::SeqCst) {
            Mode::ForegroundOnly
        } else {
            Mode::Normal
        }
    }

    /// Flips the mode and returns the mode just entered. Async-signal-safe.
    pub fn toggle(&self) -> Mode {
        let was_foreground_only = self.foreground_only.fetch_xor(true, Ordering::SeqCst);
        if was_foreground_only {
            Mode::Normal
        } else {
            Mode::ForegroundOnly
        }
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

/// The interpreter's mode. Signal handlers cannot capture state, so the one
/// the handler flips lives here.
pub static MODE: ModeController = ModeController::new();
