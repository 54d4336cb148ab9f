use chrono::{DateTime, Local};

/// Identity captured once at run start and threaded through every component.
///
/// Both artifacts are finalized with the same hostname and run stamp, so the
/// stamp is formatted once here rather than re-derived per file.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub hostname: String,
    pub started_at: DateTime<Local>,
    /// Sortable `yyyyMMdd-HHmmss` form of `started_at`.
    pub run_stamp: String,
}

impl RunContext {
    /// Capture hostname and run timestamp from the execution environment.
    pub fn capture() -> Self {
        let started_at = Local::now();
        Self::at(started_at)
    }

    pub fn at(started_at: DateTime<Local>) -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|s| s.into_string().ok())
            .unwrap_or_else(|| "unknown-host".to_string());

        RunContext {
            hostname,
            started_at,
            run_stamp: started_at.format("%Y%m%d-%H%M%S").to_string(),
        }
    }

    /// Human-readable form used in the inventory identity line.
    pub fn started_at_display(&self) -> String {
        self.started_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
