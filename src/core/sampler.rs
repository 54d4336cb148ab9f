use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use colored::*;

use crate::core::artifact::OutputArtifact;
use crate::core::counters::{CounterId, CounterSource};
use crate::core::shutdown::CancelToken;
use crate::error::Result;

/// Header of the performance time series: timestamp plus the 15 counters in
/// capture order.
pub const CSV_HEADER: &str = "Timestamp,CPUUsage,MemoryAvailableKB,DiskTime,DiskIdleTime,\
DiskAvgQueueLength,DiskCurrentQueue,DiskCurrentReads,DiskCurrentWrites,DiskAvgReads,\
DiskAvgWrites,ProcessorQueueLength,NetworkBytesPerSec,TargetServerMemoryKB,\
TotalServerMemoryKB,TotalFreeMemoryKB";

/// One row of the time series. Appended once, never mutated.
///
/// A `None` field is the sentinel for a counter that could not be read for
/// this sample; it renders as an empty CSV cell and the run continues.
#[derive(Debug, Clone)]
pub struct MetricSample {
    pub timestamp: DateTime<Local>,
    pub values: [Option<f64>; 15],
}

impl MetricSample {
    pub fn to_csv_row(&self) -> String {
        let mut row = self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        for value in &self.values {
            row.push(',');
            if let Some(v) = value {
                row.push_str(&v.to_string());
            }
        }
        row
    }
}

/// Totals reported after the loop reaches its terminal state.
#[derive(Debug, Clone)]
pub struct SampleStats {
    pub rows: usize,
    pub sentinel_fields: usize,
    pub cancelled: bool,
}

/// The bounded polling loop.
///
/// Captures one sample, appends it, waits the configured interval, and
/// repeats until the absolute end time passes or the token is cancelled.
/// Because each period is capture latency plus the interval, a run yields
/// `floor(duration / (interval + avg capture latency))` rows, not
/// `duration / interval` exactly.
pub struct PerformanceSampler<'a> {
    source: &'a mut dyn CounterSource,
    duration: Duration,
    interval: Duration,
    cancel: CancelToken,
}

impl<'a> PerformanceSampler<'a> {
    pub fn new(
        source: &'a mut dyn CounterSource,
        duration: Duration,
        interval: Duration,
        cancel: CancelToken,
    ) -> Self {
        PerformanceSampler {
            source,
            duration,
            interval,
            cancel,
        }
    }

    /// Run the loop to its terminal state, appending one row per iteration.
    pub fn run(&mut self, artifact: &mut OutputArtifact) -> Result<SampleStats> {
        let started = Instant::now();
        let end = started + self.duration;
        let estimated_completion = Local::now()
            + chrono::Duration::from_std(self.duration)
                .unwrap_or_else(|_| chrono::Duration::zero());

        let mut stats = SampleStats {
            rows: 0,
            sentinel_fields: 0,
            cancelled: false,
        };

        loop {
            if Instant::now() > end {
                break;
            }
            if self.cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }

            let sample = self.capture(&mut stats);
            artifact.append_line(&sample.to_csv_row())?;
            stats.rows += 1;

            println!(
                "{} {} {}",
                sample
                    .timestamp
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
                    .dimmed(),
                format!("sample {} appended,", stats.rows).cyan(),
                format!(
                    "estimated completion {}",
                    estimated_completion.format("%Y-%m-%d %H:%M:%S")
                )
                .dimmed()
            );
            log::info!(
                "sample {} appended, estimated completion {}",
                stats.rows,
                estimated_completion.format("%Y-%m-%d %H:%M:%S")
            );

            if !self.cancel.wait(self.interval) {
                stats.cancelled = true;
                break;
            }
        }

        Ok(stats)
    }

    /// Read all 15 counters. A failed read logs a warning and leaves the
    /// sentinel in place; one bad counter must not abort a multi-day run.
    fn capture(&mut self, stats: &mut SampleStats) -> MetricSample {
        let timestamp = Local::now();
        let mut values = [None; 15];

        for (slot, id) in values.iter_mut().zip(CounterId::ALL) {
            match self.source.read(id) {
                Ok(v) => *slot = Some(v),
                Err(e) => {
                    stats.sentinel_fields += 1;
                    log::warn!("counter {} unavailable: {}", id.column_name(), e);
                }
            }
        }

        MetricSample { timestamp, values }
    }
}
