use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::*;

use crate::error::{DiagError, Result};

/// Shared cancellation flag checked by the sampling loop.
///
/// The loop's only suspension point is the between-sample wait, so the wait
/// sleeps in short slices and wakes early once the token is set. This keeps
/// Ctrl-C responsive even with minute-long sample intervals.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Wait for `interval`, returning early if cancelled.
    ///
    /// Returns `true` if the full interval elapsed, `false` on cancellation.
    pub fn wait(&self, interval: Duration) -> bool {
        const SLICE: Duration = Duration::from_millis(200);

        let deadline = Instant::now() + interval;
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep(SLICE.min(deadline - now));
        }
    }
}

/// Install a Ctrl-C handler that sets the token.
pub fn install_ctrlc_handler(token: &CancelToken) -> Result<()> {
    let token = token.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("{}", "Cancellation requested...".yellow().bold());
        println!(
            "{}",
            "Finishing the current sample and finalizing output files...".dimmed()
        );
        token.cancel();
    })
    .map_err(|e| DiagError::other(format!("Failed to set Ctrl+C handler: {}", e)))
}
