pub mod live;

pub use live::LiveCounterSource;

use crate::error::{DiagError, Result};

/// The fixed set of performance counters captured per sample, in CSV column
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterId {
    CpuUsage,
    MemoryAvailableKb,
    DiskTime,
    DiskIdleTime,
    DiskAvgQueueLength,
    DiskCurrentQueue,
    DiskCurrentReads,
    DiskCurrentWrites,
    DiskAvgReads,
    DiskAvgWrites,
    ProcessorQueueLength,
    NetworkBytesPerSec,
    TargetServerMemoryKb,
    TotalServerMemoryKb,
    TotalFreeMemoryKb,
}

impl CounterId {
    /// Capture order, which is also the column order of the time series.
    pub const ALL: [CounterId; 15] = [
        CounterId::CpuUsage,
        CounterId::MemoryAvailableKb,
        CounterId::DiskTime,
        CounterId::DiskIdleTime,
        CounterId::DiskAvgQueueLength,
        CounterId::DiskCurrentQueue,
        CounterId::DiskCurrentReads,
        CounterId::DiskCurrentWrites,
        CounterId::DiskAvgReads,
        CounterId::DiskAvgWrites,
        CounterId::ProcessorQueueLength,
        CounterId::NetworkBytesPerSec,
        CounterId::TargetServerMemoryKb,
        CounterId::TotalServerMemoryKb,
        CounterId::TotalFreeMemoryKb,
    ];

    /// Column name used in the performance CSV header.
    pub fn column_name(self) -> &'static str {
        match self {
            CounterId::CpuUsage => "CPUUsage",
            CounterId::MemoryAvailableKb => "MemoryAvailableKB",
            CounterId::DiskTime => "DiskTime",
            CounterId::DiskIdleTime => "DiskIdleTime",
            CounterId::DiskAvgQueueLength => "DiskAvgQueueLength",
            CounterId::DiskCurrentQueue => "DiskCurrentQueue",
            CounterId::DiskCurrentReads => "DiskCurrentReads",
            CounterId::DiskCurrentWrites => "DiskCurrentWrites",
            CounterId::DiskAvgReads => "DiskAvgReads",
            CounterId::DiskAvgWrites => "DiskAvgWrites",
            CounterId::ProcessorQueueLength => "ProcessorQueueLength",
            CounterId::NetworkBytesPerSec => "NetworkBytesPerSec",
            CounterId::TargetServerMemoryKb => "TargetServerMemoryKB",
            CounterId::TotalServerMemoryKb => "TotalServerMemoryKB",
            CounterId::TotalFreeMemoryKb => "TotalFreeMemoryKB",
        }
    }

    /// Counters served by the database engine rather than the OS.
    pub fn is_engine_counter(self) -> bool {
        matches!(
            self,
            CounterId::TargetServerMemoryKb
                | CounterId::TotalServerMemoryKb
                | CounterId::TotalFreeMemoryKb
        )
    }
}

/// A named, point-in-time numeric reading from the OS or the database engine.
pub trait CounterSource {
    fn read(&mut self, id: CounterId) -> Result<f64>;
}

/// Descriptor for the engine's instance-qualified memory counters.
///
/// The counter object name is derived from the configured server address
/// once, at startup, instead of being string-built per read: a default
/// instance maps to `SQLServer:Memory Manager`, a named instance
/// (`host\name`) to `MSSQL$name:Memory Manager`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCounterSet {
    object_name: String,
}

impl EngineCounterSet {
    pub fn for_server(server: &str) -> Result<Self> {
        let object_name = match server.split_once('\\') {
            None => "SQLServer:Memory Manager".to_string(),
            Some((host, instance)) => {
                if host.trim().is_empty() {
                    return Err(DiagError::config(format!(
                        "Server address '{}' has an empty host component",
                        server
                    )));
                }
                if instance.is_empty()
                    || instance.contains(['\\', '\'', ' '])
                {
                    return Err(DiagError::config(format!(
                        "Server address '{}' has an invalid instance component",
                        server
                    )));
                }
                format!("MSSQL${}:Memory Manager", instance)
            }
        };

        Ok(EngineCounterSet { object_name })
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    fn counter_name(id: CounterId) -> Option<&'static str> {
        match id {
            CounterId::TargetServerMemoryKb => Some("Target Server Memory (KB)"),
            CounterId::TotalServerMemoryKb => Some("Total Server Memory (KB)"),
            CounterId::TotalFreeMemoryKb => Some("Free Memory (KB)"),
            _ => None,
        }
    }

    /// Scalar query reading one engine counter, or `None` for OS counters.
    pub fn sql_for(&self, id: CounterId) -> Option<String> {
        let counter = Self::counter_name(id)?;
        Some(format!(
            "SELECT cntr_value FROM sys.dm_os_performance_counters \
             WHERE object_name = N'{}' AND counter_name = N'{}'",
            self.object_name, counter
        ))
    }
}
