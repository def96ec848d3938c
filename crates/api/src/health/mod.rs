//! Health aggregation.
//!
//! [`HealthAggregator::detailed`] probes the database and the cache
//! concurrently, reads host metrics and folds everything into one
//! [`HealthReport`] with an overall [`OverallStatus`]. Probe failures are
//! reported inside the report; only a failure to read host metrics fails
//! the whole operation.

pub mod probe;
pub mod system;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

use crate::envelope::timestamp;
pub use probe::{DatabaseProbe, Probe, RedisProbe};
pub use system::{MetricsSource, SysinfoMetrics, SystemInfo, SystemSnapshot, format_bytes};

/// Memory usage above this percentage degrades the overall status.
pub const MEMORY_WARNING_PERCENT: u64 = 90;

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("system metrics unavailable: {0}")]
    Metrics(String),

    #[error("metrics task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Ok,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Ok,
    Error,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connection {
    Active,
    Inactive,
}

/// Result of probing one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub status: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<Connection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServiceHealth {
    pub fn ok(elapsed: Duration) -> Self {
        Self {
            status: ServiceStatus::Ok,
            response_time: Some(format!("{}ms", elapsed.as_millis())),
            connection: Some(Connection::Active),
            error: None,
            message: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Error,
            response_time: None,
            connection: Some(Connection::Inactive),
            error: Some(error.into()),
            message: None,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Unknown,
            response_time: None,
            connection: None,
            error: None,
            message: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ServiceStatus::Error
    }
}

/// Liveness answer of the basic endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BasicHealth {
    pub status: ServiceStatus,
    pub timestamp: String,
    pub uptime: f64,
    pub environment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Services {
    pub database: ServiceHealth,
    pub redis: ServiceHealth,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub timestamp: String,
    pub uptime: f64,
    pub environment: String,
    pub system: SystemInfo,
    pub services: Services,
}

/// Folds probe results and memory pressure into one status. The first
/// matching rule wins: database error, then cache error, then memory.
pub fn overall_status(
    database: &ServiceHealth,
    cache: &ServiceHealth,
    memory_usage_percent: u64,
) -> OverallStatus {
    if database.is_error() {
        OverallStatus::Critical
    } else if cache.is_error() || memory_usage_percent > MEMORY_WARNING_PERCENT {
        OverallStatus::Warning
    } else {
        OverallStatus::Ok
    }
}

/// Runs one probe under a timeout and records its latency.
async fn run_probe(probe: &dyn Probe, timeout: Duration) -> ServiceHealth {
    let started = Instant::now();
    let outcome = tokio::time::timeout(timeout, probe.check()).await;
    let elapsed = started.elapsed();
    metrics::histogram!("health_probe_duration_seconds", "probe" => probe.name())
        .record(elapsed.as_secs_f64());

    match outcome {
        Ok(Ok(())) => ServiceHealth::ok(elapsed),
        Ok(Err(error)) => {
            tracing::warn!(probe = probe.name(), %error, "health probe failed");
            ServiceHealth::error(error)
        }
        Err(_) => {
            tracing::warn!(probe = probe.name(), timeout_ms = timeout.as_millis() as u64, "health probe timed out");
            ServiceHealth::error(format!("{} check timed out after {}ms", probe.name(), timeout.as_millis()))
        }
    }
}

pub struct HealthAggregator {
    started: Instant,
    environment: String,
    probe_timeout: Duration,
    database: Arc<dyn Probe>,
    cache: Option<Arc<dyn Probe>>,
    metrics: Arc<dyn MetricsSource>,
}

impl HealthAggregator {
    /// Uptime is measured from construction.
    pub fn new(
        environment: impl Into<String>,
        database: Arc<dyn Probe>,
        metrics: Arc<dyn MetricsSource>,
    ) -> Self {
        Self {
            started: Instant::now(),
            environment: environment.into(),
            probe_timeout: Duration::from_secs(2),
            database,
            cache: None,
            metrics,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn Probe>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    fn uptime(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    pub fn basic(&self) -> BasicHealth {
        metrics::counter!("health_checks_total", "kind" => "basic").increment(1);
        BasicHealth {
            status: ServiceStatus::Ok,
            timestamp: timestamp(),
            uptime: self.uptime(),
            environment: self.environment.clone(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn detailed(&self) -> Result<HealthReport, HealthError> {
        metrics::counter!("health_checks_total", "kind" => "detailed").increment(1);

        let cache = async {
            match &self.cache {
                Some(probe) => run_probe(probe.as_ref(), self.probe_timeout).await,
                None => ServiceHealth::unknown("Redis not configured"),
            }
        };
        let source = Arc::clone(&self.metrics);
        let snapshot = tokio::task::spawn_blocking(move || source.snapshot());

        let (database, redis, snapshot) = tokio::join!(
            run_probe(self.database.as_ref(), self.probe_timeout),
            cache,
            snapshot
        );
        let snapshot = snapshot??;

        let status = overall_status(&database, &redis, snapshot.memory_usage_percent());
        if status != OverallStatus::Ok {
            tracing::warn!(?status, "degraded health");
        }

        Ok(HealthReport {
            status,
            timestamp: timestamp(),
            uptime: self.uptime(),
            environment: self.environment.clone(),
            system: snapshot.to_info(),
            services: Services { database, redis },
        })
    }
}
