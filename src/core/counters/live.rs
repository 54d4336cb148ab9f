use std::fs;
use std::time::{Duration, Instant};

use sysinfo::{CpuRefreshKind, MemoryRefreshKind, Networks, RefreshKind, System};

use crate::core::config::RunConfig;
use crate::core::counters::{CounterId, CounterSource, EngineCounterSet};
use crate::core::query::{QueryExecutor, QueryTarget};
use crate::error::{DiagError, Result};

/// Counter source backed by the running host and the target engine.
///
/// OS counters come from sysinfo and `/proc`; the three engine memory
/// counters are read through the query executor using the counter set
/// validated at startup. Rate counters (network, disk) are deltas against
/// the previous capture, so the first sample of a run reports zero rates.
pub struct LiveCounterSource {
    system: System,
    networks: Networks,
    executor: Box<dyn QueryExecutor>,
    target: QueryTarget,
    counter_set: EngineCounterSet,
    last_network: Option<(Instant, u64)>,
    prev_disk: Option<(Instant, DiskSnapshot)>,
    disk_window: Option<(Instant, DiskRates)>,
}

impl LiveCounterSource {
    pub fn new(config: &RunConfig, executor: Box<dyn QueryExecutor>) -> Result<Self> {
        let counter_set = EngineCounterSet::for_server(&config.server)?;

        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything());

        Ok(LiveCounterSource {
            system: System::new_with_specifics(refresh_kind),
            networks: Networks::new_with_refreshed_list(),
            executor,
            target: QueryTarget::from_config(config),
            counter_set,
            last_network: None,
            prev_disk: None,
            disk_window: None,
        })
    }

    fn read_cpu_usage(&mut self) -> f64 {
        self.system.refresh_cpu_usage();
        self.system.global_cpu_usage() as f64
    }

    fn read_available_memory_kb(&mut self) -> f64 {
        self.system.refresh_memory();
        (self.system.available_memory() / 1024) as f64
    }

    fn read_network_bytes_per_sec(&mut self) -> f64 {
        self.networks.refresh(true);
        let now = Instant::now();
        let total: u64 = self
            .networks
            .values()
            .map(|data| data.total_received() + data.total_transmitted())
            .sum();

        let rate = match self.last_network {
            Some((at, prev)) => {
                let elapsed = now.duration_since(at).as_secs_f64();
                if elapsed > 0.0 {
                    total.saturating_sub(prev) as f64 / elapsed
                } else {
                    0.0
                }
            }
            None => 0.0,
        };

        self.last_network = Some((now, total));
        rate
    }

    /// Aggregate disk rates over the window since the previous capture.
    ///
    /// The eight disk counters of one sample all come from a single
    /// `/proc/diskstats` snapshot; the window is cached briefly so the
    /// per-counter reads within a capture agree with each other.
    fn disk_rates(&mut self) -> Result<DiskRates> {
        const WINDOW_REUSE: Duration = Duration::from_millis(500);

        if let Some((at, rates)) = &self.disk_window {
            if at.elapsed() < WINDOW_REUSE {
                return Ok(rates.clone());
            }
        }

        let snapshot = read_disk_snapshot()?;
        let now = Instant::now();

        let rates = match self.prev_disk.take() {
            Some((prev_at, prev)) => {
                DiskRates::between(&prev, &snapshot, now.duration_since(prev_at))
            }
            None => DiskRates::idle(snapshot.in_progress),
        };

        self.prev_disk = Some((now, snapshot));
        self.disk_window = Some((now, rates.clone()));
        Ok(rates)
    }

    fn read_processor_queue(&self) -> Result<f64> {
        let stat = fs::read_to_string("/proc/stat")
            .map_err(|e| DiagError::counter_unavailable(format!("/proc/stat: {}", e)))?;

        for line in stat.lines() {
            if let Some(rest) = line.strip_prefix("procs_running") {
                let running: u64 = rest
                    .trim()
                    .parse()
                    .map_err(|_| DiagError::counter_unavailable("procs_running not numeric"))?;
                // Exclude this process itself, which is always running when
                // it reads the file.
                return Ok(running.saturating_sub(1) as f64);
            }
        }

        Err(DiagError::counter_unavailable(
            "procs_running missing from /proc/stat",
        ))
    }

    fn read_engine_counter(&self, id: CounterId) -> Result<f64> {
        let sql = self
            .counter_set
            .sql_for(id)
            .ok_or_else(|| DiagError::counter_unavailable(id.column_name()))?;

        let value = self.executor.execute_scalar(&self.target, &sql)?;
        value.as_f64().ok_or_else(|| {
            DiagError::counter_unavailable(format!(
                "{} returned a non-numeric value",
                id.column_name()
            ))
        })
    }
}

impl CounterSource for LiveCounterSource {
    fn read(&mut self, id: CounterId) -> Result<f64> {
        match id {
            CounterId::CpuUsage => Ok(self.read_cpu_usage()),
            CounterId::MemoryAvailableKb => Ok(self.read_available_memory_kb()),
            CounterId::NetworkBytesPerSec => Ok(self.read_network_bytes_per_sec()),
            CounterId::ProcessorQueueLength => self.read_processor_queue(),
            CounterId::DiskTime => Ok(self.disk_rates()?.busy_pct),
            CounterId::DiskIdleTime => Ok(self.disk_rates()?.idle_pct),
            CounterId::DiskAvgQueueLength => Ok(self.disk_rates()?.avg_queue),
            CounterId::DiskCurrentQueue => Ok(self.disk_rates()?.current_queue),
            CounterId::DiskCurrentReads => Ok(self.disk_rates()?.reads_per_sec),
            CounterId::DiskCurrentWrites => Ok(self.disk_rates()?.writes_per_sec),
            CounterId::DiskAvgReads => Ok(self.disk_rates()?.avg_read_secs),
            CounterId::DiskAvgWrites => Ok(self.disk_rates()?.avg_write_secs),
            CounterId::TargetServerMemoryKb
            | CounterId::TotalServerMemoryKb
            | CounterId::TotalFreeMemoryKb => self.read_engine_counter(id),
        }
    }
}

/// Summed `/proc/diskstats` readings across physical block devices.
#[derive(Debug, Clone, Default)]
struct DiskSnapshot {
    reads: u64,
    read_time_ms: u64,
    writes: u64,
    write_time_ms: u64,
    in_progress: u64,
    io_time_ms: u64,
    weighted_io_ms: u64,
}

/// Derived disk counters for one sampling window.
#[derive(Debug, Clone)]
struct DiskRates {
    busy_pct: f64,
    idle_pct: f64,
    avg_queue: f64,
    current_queue: f64,
    reads_per_sec: f64,
    writes_per_sec: f64,
    avg_read_secs: f64,
    avg_write_secs: f64,
}

impl DiskRates {
    fn idle(in_progress: u64) -> Self {
        DiskRates {
            busy_pct: 0.0,
            idle_pct: 100.0,
            avg_queue: 0.0,
            current_queue: in_progress as f64,
            reads_per_sec: 0.0,
            writes_per_sec: 0.0,
            avg_read_secs: 0.0,
            avg_write_secs: 0.0,
        }
    }

    fn between(prev: &DiskSnapshot, cur: &DiskSnapshot, elapsed: Duration) -> Self {
        let elapsed_ms = elapsed.as_millis() as f64;
        let elapsed_secs = elapsed.as_secs_f64();
        if elapsed_ms <= 0.0 {
            return DiskRates::idle(cur.in_progress);
        }

        let busy_ms = cur.io_time_ms.saturating_sub(prev.io_time_ms) as f64;
        let busy_pct = (busy_ms / elapsed_ms * 100.0).min(100.0);

        let reads = cur.reads.saturating_sub(prev.reads);
        let writes = cur.writes.saturating_sub(prev.writes);
        let read_ms = cur.read_time_ms.saturating_sub(prev.read_time_ms) as f64;
        let write_ms = cur.write_time_ms.saturating_sub(prev.write_time_ms) as f64;

        DiskRates {
            busy_pct,
            idle_pct: 100.0 - busy_pct,
            avg_queue: cur.weighted_io_ms.saturating_sub(prev.weighted_io_ms) as f64 / elapsed_ms,
            current_queue: cur.in_progress as f64,
            reads_per_sec: reads as f64 / elapsed_secs,
            writes_per_sec: writes as f64 / elapsed_secs,
            avg_read_secs: if reads > 0 {
                read_ms / reads as f64 / 1000.0
            } else {
                0.0
            },
            avg_write_secs: if writes > 0 {
                write_ms / writes as f64 / 1000.0
            } else {
                0.0
            },
        }
    }
}

fn read_disk_snapshot() -> Result<DiskSnapshot> {
    let content = fs::read_to_string("/proc/diskstats")
        .map_err(|e| DiagError::counter_unavailable(format!("/proc/diskstats: {}", e)))?;

    let mut total = DiskSnapshot::default();
    for line in content.lines() {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 14 || !is_physical_device(cols[2]) {
            continue;
        }

        total.reads += cols[3].parse::<u64>().unwrap_or(0);
        total.read_time_ms += cols[6].parse::<u64>().unwrap_or(0);
        total.writes += cols[7].parse::<u64>().unwrap_or(0);
        total.write_time_ms += cols[10].parse::<u64>().unwrap_or(0);
        total.in_progress += cols[11].parse::<u64>().unwrap_or(0);
        total.io_time_ms += cols[12].parse::<u64>().unwrap_or(0);
        total.weighted_io_ms += cols[13].parse::<u64>().unwrap_or(0);
    }

    Ok(total)
}

/// Whole-device entries only; partitions would double-count the totals.
fn is_physical_device(name: &str) -> bool {
    if name.starts_with("dm-") || name.starts_with("md") {
        return true;
    }
    if let Some(rest) = name.strip_prefix("nvme") {
        return !rest.contains('p');
    }
    for prefix in ["sd", "vd", "hd", "xvd"] {
        if let Some(rest) = name.strip_prefix(prefix) {
            return !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphabetic());
        }
    }
    false
}
