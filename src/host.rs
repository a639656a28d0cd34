use serde::{Deserialize, Serialize};
use sysinfo::{Disks, System};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub hostname: String,
    pub os: String,
    pub cores: usize,
    pub load_one: f64,
    pub load_five: f64,
    pub memory_used_gb: f64,
    pub memory_total_gb: f64,
    pub memory_percent: f32,
    pub disk_used_percent: f32,
    pub uptime_secs: u64,
}

impl HostSnapshot {
    /// Memory, load and disk only. CPU percentages need two samples spaced
    /// apart, so load average stands in for them.
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu();

        let total = sys.total_memory();
        let used = sys.used_memory();
        let memory_percent = if total > 0 {
            (used as f64 / total as f64 * 100.0) as f32
        } else {
            0.0
        };

        let disks = Disks::new_with_refreshed_list();
        let disk_used_percent = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == std::path::Path::new("/"))
            .or_else(|| disks.list().first())
            .map(|d| {
                let total = d.total_space();
                let used = total.saturating_sub(d.available_space());
                if total > 0 {
                    (used as f64 / total as f64 * 100.0) as f32
                } else {
                    0.0
                }
            })
            .unwrap_or(0.0);

        let load = System::load_average();

        Self {
            hostname: hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
            os: System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string()),
            cores: sys.physical_core_count().unwrap_or_else(|| sys.cpus().len()),
            load_one: load.one,
            load_five: load.five,
            memory_used_gb: used as f64 / GIB,
            memory_total_gb: total as f64 / GIB,
            memory_percent,
            disk_used_percent,
            uptime_secs: System::uptime(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "RAM {:.1}/{:.1} GB ({:.0}%), load {:.2} on {} cores, disk {:.0}% used",
            self.memory_used_gb,
            self.memory_total_gb,
            self.memory_percent,
            self.load_one,
            self.cores,
            self.disk_used_percent
        )
    }
}
