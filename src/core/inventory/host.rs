use std::path::Path;

use sysinfo::{Disks, System};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Basic host facts: OS, CPU, core counts, memory.
#[derive(Debug, Clone)]
pub struct HostFacts {
    pub os: String,
    pub cpu_model: String,
    pub logical_cpus: usize,
    pub physical_cores: usize,
    pub total_memory_gib: f64,
}

pub fn collect_host_facts() -> HostFacts {
    let system = System::new_all();

    HostFacts {
        os: System::long_os_version().unwrap_or_else(|| "Unknown OS".to_string()),
        cpu_model: system
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .unwrap_or_else(|| "Unknown CPU".to_string()),
        logical_cpus: system.cpus().len(),
        physical_cores: System::physical_core_count().unwrap_or(0),
        total_memory_gib: system.total_memory() as f64 / GIB,
    }
}

/// One storage volume: name, capacity, free space.
#[derive(Debug, Clone)]
pub struct VolumeFact {
    pub name: String,
    pub capacity_gib: f64,
    pub free_gib: f64,
}

pub fn collect_volumes() -> Vec<VolumeFact> {
    let disks = Disks::new_with_refreshed_list();

    disks
        .list()
        .iter()
        .map(|disk| VolumeFact {
            name: disk.mount_point().to_string_lossy().to_string(),
            capacity_gib: disk.total_space() as f64 / GIB,
            free_gib: disk.available_space() as f64 / GIB,
        })
        .collect()
}

/// Cluster membership, reported as one of three mutually exclusive states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterStatus {
    NotInstalled,
    NotMember,
    Member,
}

impl ClusterStatus {
    pub fn message(self) -> &'static str {
        match self {
            ClusterStatus::NotInstalled => "Failover cluster feature is not installed.",
            ClusterStatus::NotMember => {
                "Failover cluster feature is installed, but this host is not a cluster member."
            }
            ClusterStatus::Member => "This host is a cluster member.",
        }
    }
}

/// Capability first, membership second.
pub fn cluster_status_from(installed: bool, member: bool) -> ClusterStatus {
    if !installed {
        ClusterStatus::NotInstalled
    } else if member {
        ClusterStatus::Member
    } else {
        ClusterStatus::NotMember
    }
}

/// Probe the host: cluster tooling on the PATH means the capability is
/// installed; a corosync configuration means this host is a member.
pub fn detect_cluster_status() -> ClusterStatus {
    let installed = ["corosync", "pacemakerd", "pcs"]
        .iter()
        .any(|bin| which::which(bin).is_ok());
    let member = Path::new("/etc/corosync/corosync.conf").exists();

    cluster_status_from(installed, member)
}
