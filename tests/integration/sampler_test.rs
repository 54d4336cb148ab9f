use std::fs;
use std::time::Duration;

use dbdiag::core::artifact::OutputArtifact;
use dbdiag::core::counters::{CounterId, CounterSource};
use dbdiag::core::sampler::{MetricSample, PerformanceSampler, CSV_HEADER};
use dbdiag::core::shutdown::CancelToken;
use dbdiag::error::{DiagError, Result};
use tempfile::TempDir;

/// Deterministic source: each counter reads as `base + 1.5 * column index`,
/// optionally failing one counter to exercise the sentinel path.
struct FakeCounterSource {
    base: f64,
    fail: Option<CounterId>,
}

impl FakeCounterSource {
    fn new(base: f64) -> Self {
        FakeCounterSource { base, fail: None }
    }

    fn expected(&self, id: CounterId) -> f64 {
        let index = CounterId::ALL.iter().position(|c| *c == id).unwrap();
        self.base + 1.5 * index as f64
    }
}

impl CounterSource for FakeCounterSource {
    fn read(&mut self, id: CounterId) -> Result<f64> {
        if self.fail == Some(id) {
            return Err(DiagError::counter_unavailable("scripted failure"));
        }
        Ok(self.expected(id))
    }
}

fn run_sampler(
    source: &mut dyn CounterSource,
    duration: Duration,
    interval: Duration,
    cancel: CancelToken,
) -> (dbdiag::core::sampler::SampleStats, Vec<String>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("perf.csv");

    let mut artifact = OutputArtifact::open_performance(&path, CSV_HEADER).unwrap();
    let mut sampler = PerformanceSampler::new(source, duration, interval, cancel);
    let stats = sampler.run(&mut artifact).unwrap();

    let lines = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect();
    (stats, lines)
}

#[test]
fn test_header_has_sixteen_columns_in_capture_order() {
    let columns: Vec<&str> = CSV_HEADER.split(',').collect();
    assert_eq!(columns.len(), 16);
    assert_eq!(columns[0], "Timestamp");
    for (column, id) in columns[1..].iter().zip(CounterId::ALL) {
        assert_eq!(*column, id.column_name());
    }
}

#[test]
fn test_row_count_tracks_duration_over_interval() {
    let mut source = FakeCounterSource::new(10.25);
    let (stats, lines) = run_sampler(
        &mut source,
        Duration::from_millis(250),
        Duration::from_millis(50),
        CancelToken::new(),
    );

    // Period = interval + capture latency, so floor(250/50) = 5 rows with
    // slack for scheduling jitter and the inclusive end-time check.
    assert!(
        (3..=7).contains(&stats.rows),
        "unexpected row count {}",
        stats.rows
    );
    assert_eq!(lines.len(), stats.rows + 1);
    assert!(!stats.cancelled);

    // One row per iteration, timestamps non-decreasing in capture order.
    let timestamps: Vec<&str> = lines[1..]
        .iter()
        .map(|l| l.split(',').next().unwrap())
        .collect();
    for pair in timestamps.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
}

#[test]
fn test_appended_fields_round_trip() {
    let mut source = FakeCounterSource::new(10.25);
    let expected: Vec<f64> = CounterId::ALL.iter().map(|id| source.expected(*id)).collect();

    let (stats, lines) = run_sampler(
        &mut source,
        Duration::from_millis(20),
        Duration::from_millis(100),
        CancelToken::new(),
    );
    assert!(stats.rows >= 1);

    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields.len(), 16);
    for (field, want) in fields[1..].iter().zip(expected) {
        let got: f64 = field.parse().unwrap();
        assert!((got - want).abs() < 1e-9, "field {} != {}", got, want);
    }
}

#[test]
fn test_failed_counter_recorded_as_empty_cell() {
    let mut source = FakeCounterSource::new(5.0);
    source.fail = Some(CounterId::DiskTime);

    let (stats, lines) = run_sampler(
        &mut source,
        Duration::from_millis(20),
        Duration::from_millis(100),
        CancelToken::new(),
    );

    assert!(stats.sentinel_fields >= 1);
    let fields: Vec<&str> = lines[1].split(',').collect();
    // DiskTime is the third counter, column index 3 after the timestamp.
    assert_eq!(fields[3], "");
    // Neighboring counters are unaffected.
    assert!(!fields[2].is_empty());
    assert!(!fields[4].is_empty());
}

#[test]
fn test_cancelled_token_stops_loop_before_first_sample() {
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut source = FakeCounterSource::new(1.0);
    let (stats, lines) = run_sampler(
        &mut source,
        Duration::from_secs(60),
        Duration::from_secs(60),
        cancel,
    );

    assert!(stats.cancelled);
    assert_eq!(stats.rows, 0);
    assert_eq!(lines.len(), 1, "only the header should be present");
}

#[test]
fn test_cancellation_mid_run_still_leaves_valid_rows() {
    let cancel = CancelToken::new();
    let canceller = cancel.clone();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(80));
        canceller.cancel();
    });

    let mut source = FakeCounterSource::new(2.0);
    let (stats, lines) = run_sampler(
        &mut source,
        Duration::from_secs(60),
        Duration::from_millis(30),
        cancel,
    );

    assert!(stats.cancelled);
    assert!(stats.rows >= 1);
    assert_eq!(lines.len(), stats.rows + 1);
}

#[test]
fn test_metric_sample_renders_sentinels_as_empty_cells() {
    let mut values = [Some(1.0); 15];
    values[14] = None;
    let sample = MetricSample {
        timestamp: chrono::Local::now(),
        values,
    };

    let row = sample.to_csv_row();
    assert!(row.ends_with(','), "trailing sentinel renders as empty cell");
    assert_eq!(row.split(',').count(), 16);
}
