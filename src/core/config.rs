use std::path::PathBuf;
use std::time::Duration;

/// Immutable run parameters, created once after validation.
///
/// Every component reads from this value; nothing mutates it after the
/// validator has produced it.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Target server address, optionally carrying a named instance
    /// component (`host` or `host\instance`).
    pub server: String,
    /// Target database name (for the embedded executor this is a file path).
    pub database: String,
    /// Timeout applied to every engine query.
    pub query_timeout: Duration,
    pub username: String,
    pub password: String,
    /// Performance time-series output path.
    pub perf_log: PathBuf,
    /// Inventory report output path.
    pub out_log: PathBuf,
    /// Total sampling window.
    pub duration: Duration,
    /// Pause between samples. The loop period is this plus the capture
    /// latency, so a run yields roughly `duration / (interval + latency)`
    /// rows rather than `duration / interval` exactly.
    pub interval: Duration,
}

/// Raw, possibly-missing CLI input before validation.
#[derive(Debug, Default, Clone)]
pub struct RawParams {
    pub server: Option<String>,
    pub database: Option<String>,
    pub query_timeout_secs: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub perf_log: Option<String>,
    pub out_log: Option<String>,
    pub duration_minutes: Option<String>,
    pub interval_secs: Option<String>,
}

impl RawParams {
    /// Validate all nine parameters and produce a `RunConfig`.
    ///
    /// Returns the list of missing or invalid parameter names on failure,
    /// in which case the caller prints usage and exits without creating
    /// any files.
    pub fn validate(self) -> std::result::Result<RunConfig, Vec<&'static str>> {
        let mut problems = Vec::new();

        let server = required_string(&self.server, "server", &mut problems);
        let database = required_string(&self.database, "database", &mut problems);
        let username = required_string(&self.username, "user", &mut problems);
        let password = required_string(&self.password, "password", &mut problems);
        let perf_log = required_string(&self.perf_log, "perf-log", &mut problems);
        let out_log = required_string(&self.out_log, "out-log", &mut problems);

        let query_timeout_secs =
            required_positive(&self.query_timeout_secs, "query-timeout", &mut problems);
        let duration_minutes =
            required_positive(&self.duration_minutes, "duration", &mut problems);
        let interval_secs = required_positive(&self.interval_secs, "interval", &mut problems);

        if !problems.is_empty() {
            return Err(problems);
        }

        Ok(RunConfig {
            server: server.unwrap(),
            database: database.unwrap(),
            query_timeout: Duration::from_secs(query_timeout_secs.unwrap()),
            username: username.unwrap(),
            password: password.unwrap(),
            perf_log: PathBuf::from(perf_log.unwrap()),
            out_log: PathBuf::from(out_log.unwrap()),
            duration: Duration::from_secs(duration_minutes.unwrap() * 60),
            interval: Duration::from_secs(interval_secs.unwrap()),
        })
    }
}

fn required_string(
    value: &Option<String>,
    name: &'static str,
    problems: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v.clone()),
        _ => {
            problems.push(name);
            None
        }
    }
}

fn required_positive(
    value: &Option<String>,
    name: &'static str,
    problems: &mut Vec<&'static str>,
) -> Option<u64> {
    match value.as_deref().map(str::parse::<u64>) {
        Some(Ok(n)) if n > 0 => Some(n),
        _ => {
            problems.push(name);
            None
        }
    }
}

/// Usage text shown when any required parameter is missing or invalid.
pub fn usage_text() -> String {
    let mut out = String::new();
    out.push_str("Usage:\n");
    out.push_str(
        "  dbdiag --server <host[\\instance]> --database <name> --query-timeout <seconds>\n",
    );
    out.push_str(
        "         --user <login> --password <password> --perf-log <path> --out-log <path>\n",
    );
    out.push_str("         --duration <minutes> --interval <seconds>\n");
    out.push('\n');
    out.push_str("Example:\n");
    out.push_str(
        "  dbdiag --server dbhost01\\PROD --database master --query-timeout 30 \\\n",
    );
    out.push_str(
        "         --user diag --password secret --perf-log perf.csv --out-log inventory.txt \\\n",
    );
    out.push_str("         --duration 10080 --interval 60\n");
    out.push('\n');
    out.push_str(
        "Recommendation: capture a full week of data with --duration 10080 (7 days)\n",
    );
    out.push_str("and --interval 60, then hand both output files to your support engineer.\n");
    out
}
