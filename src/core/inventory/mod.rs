pub mod facts;
pub mod host;

pub use host::{ClusterStatus, HostFacts, VolumeFact};

use crate::core::query::{QueryExecutor, QueryTarget};

/// The one-shot environment snapshot, produced exactly once per run before
/// any sampling starts.
#[derive(Debug, Clone)]
pub struct InventoryReport {
    pub host: HostFacts,
    pub volumes: Vec<VolumeFact>,
    pub cluster: ClusterStatus,
    pub engine_facts: Vec<(&'static str, String)>,
}

impl InventoryReport {
    /// Render the report with its fixed section order: host facts, volume
    /// table, cluster line, engine facts.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("\n== Host ==\n");
        out.push_str(&format!("OS: {}\n", self.host.os));
        out.push_str(&format!("CPU: {}\n", self.host.cpu_model));
        out.push_str(&format!("Logical CPUs: {}\n", self.host.logical_cpus));
        out.push_str(&format!("Physical cores: {}\n", self.host.physical_cores));
        out.push_str(&format!(
            "Total memory: {:.2} GiB\n",
            self.host.total_memory_gib
        ));

        out.push_str("\n== Storage volumes ==\n");
        if self.volumes.is_empty() {
            out.push_str("No volumes detected.\n");
        } else {
            out.push_str(&format!(
                "{:<24} {:>16} {:>12}\n",
                "Volume", "Capacity (GiB)", "Free (GiB)"
            ));
            for volume in &self.volumes {
                out.push_str(&format!(
                    "{:<24} {:>16.2} {:>12.2}\n",
                    volume.name, volume.capacity_gib, volume.free_gib
                ));
            }
        }

        out.push_str("\n== Cluster ==\n");
        out.push_str(self.cluster.message());
        out.push('\n');

        out.push_str("\n== Database engine ==\n");
        for (label, value) in &self.engine_facts {
            out.push_str(&format!("{}: {}\n", label, value));
        }

        out
    }
}

/// Gathers the inventory snapshot: host and storage facts from the OS,
/// cluster membership from the host probe, engine facts through sequential
/// scalar queries. Each fact is best-effort; a failed query is recorded in
/// the report and collection continues.
pub struct InventoryCollector<'a> {
    executor: &'a dyn QueryExecutor,
    target: &'a QueryTarget,
}

impl<'a> InventoryCollector<'a> {
    pub fn new(executor: &'a dyn QueryExecutor, target: &'a QueryTarget) -> Self {
        InventoryCollector { executor, target }
    }

    pub fn collect(&self) -> InventoryReport {
        InventoryReport {
            host: host::collect_host_facts(),
            volumes: host::collect_volumes(),
            cluster: host::detect_cluster_status(),
            engine_facts: facts::collect_engine_facts(self.executor, self.target),
        }
    }
}
