//! Host metrics for the detailed health report.

use serde::Serialize;
use sysinfo::System;

use super::HealthError;

/// Raw host figures, before formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSnapshot {
    pub total_memory: u64,
    pub free_memory: u64,
    pub cpu_cores: usize,
    pub cpu_model: String,
    pub load_average: [f64; 3],
    pub os_type: String,
    pub os_release: String,
    pub architecture: String,
}

impl SystemSnapshot {
    /// Share of memory in use, rounded to a whole percent.
    pub fn memory_usage_percent(&self) -> u64 {
        if self.total_memory == 0 {
            return 0;
        }
        let used = self.total_memory.saturating_sub(self.free_memory);
        (used as f64 / self.total_memory as f64 * 100.0).round() as u64
    }

    pub fn to_info(&self) -> SystemInfo {
        SystemInfo {
            memory: MemoryInfo {
                total: format_bytes(self.total_memory),
                free: format_bytes(self.free_memory),
                usage: format!("{}%", self.memory_usage_percent()),
            },
            cpu: CpuInfo {
                cores: self.cpu_cores,
                model: self.cpu_model.clone(),
                load: self.load_average,
            },
            platform: PlatformInfo {
                os_type: self.os_type.clone(),
                release: self.os_release.clone(),
                architecture: self.architecture.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    pub memory: MemoryInfo,
    pub cpu: CpuInfo,
    pub platform: PlatformInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryInfo {
    pub total: String,
    pub free: String,
    pub usage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuInfo {
    pub cores: usize,
    pub model: String,
    pub load: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformInfo {
    #[serde(rename = "type")]
    pub os_type: String,
    pub release: String,
    pub architecture: String,
}

/// Source of host metrics. Called from a blocking task.
pub trait MetricsSource: Send + Sync {
    fn snapshot(&self) -> Result<SystemSnapshot, HealthError>;
}

/// Reads metrics from the running host through `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoMetrics;

impl MetricsSource for SysinfoMetrics {
    fn snapshot(&self) -> Result<SystemSnapshot, HealthError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(HealthError::Metrics("platform is not supported".to_string()));
        }

        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();

        let total_memory = sys.total_memory();
        if total_memory == 0 {
            return Err(HealthError::Metrics("total memory reported as zero".to_string()));
        }

        let cpus = sys.cpus();
        let cpu_model = cpus
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .ok_or_else(|| HealthError::Metrics("no CPU information".to_string()))?;

        let load = System::load_average();

        Ok(SystemSnapshot {
            total_memory,
            free_memory: sys.available_memory(),
            cpu_cores: cpus.len(),
            cpu_model,
            load_average: [load.one, load.five, load.fifteen],
            os_type: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            os_release: System::kernel_version().unwrap_or_default(),
            architecture: std::env::consts::ARCH.to_string(),
        })
    }
}

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable size in 1024 steps, at most two decimals with trailing
/// zeros dropped: `1536` → `"1.5 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}
