use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;
use sqlx::PgPool;
use std::time::{Duration, Instant};
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

use crate::db::connection::verify_connection;

const DATABASE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Memory usage (percent of total) at which the host is reported DOWN
pub const DEFAULT_MEMORY_DOWN_THRESHOLD_PERCENT: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthState {
    Up,
    Down,
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub status: HealthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub status: HealthState,
    pub memory_usage: String,
    pub used_memory: String,
    pub total_memory: String,
    pub system_load: String,
    pub available_processors: usize,
    pub os: &'static str,
    pub arch: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationHealth {
    pub status: HealthState,
    pub name: String,
    pub version: &'static str,
    pub start_time: String,
    pub uptime: String,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_threads: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthState,
    pub database: DatabaseHealth,
    pub system: SystemHealth,
    pub application: ApplicationHealth,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// Aggregates process, host and database health
pub struct HealthIndicator {
    db_pool: Option<PgPool>,
    app_name: String,
    started_at: DateTime<Utc>,
    started: Instant,
    memory_down_threshold_percent: f64,
}

impl HealthIndicator {
    pub fn new(app_name: &str, db_pool: Option<PgPool>) -> Self {
        Self {
            db_pool,
            app_name: app_name.to_string(),
            started_at: Utc::now(),
            started: Instant::now(),
            memory_down_threshold_percent: DEFAULT_MEMORY_DOWN_THRESHOLD_PERCENT,
        }
    }

    pub fn with_memory_threshold(mut self, percent: f64) -> Self {
        self.memory_down_threshold_percent = percent;
        self
    }

    pub async fn health_status(&self) -> HealthReport {
        let database = self.check_database().await;
        let system = self.check_system();
        let application = self.check_application();

        // An unconfigured database does not count against overall health
        let status = if database.status == HealthState::Down || system.status == HealthState::Down {
            HealthState::Down
        } else {
            HealthState::Up
        };

        HealthReport {
            status,
            database,
            system,
            application,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    async fn check_database(&self) -> DatabaseHealth {
        let Some(pool) = &self.db_pool else {
            return DatabaseHealth {
                status: HealthState::Unknown,
                database: None,
                connection: None,
                error: Some("Database not configured".to_string()),
            };
        };

        match tokio::time::timeout(DATABASE_CHECK_TIMEOUT, verify_connection(pool)).await {
            Ok(Ok(version)) => DatabaseHealth {
                status: HealthState::Up,
                database: Some(version),
                connection: Some("OK".to_string()),
                error: None,
            },
            Ok(Err(e)) => {
                warn!("Database health check failed: {}", e);
                DatabaseHealth {
                    status: HealthState::Down,
                    database: None,
                    connection: None,
                    error: Some("Database connection failed".to_string()),
                }
            }
            Err(_) => {
                warn!("Database health check timed out after {:?}", DATABASE_CHECK_TIMEOUT);
                DatabaseHealth {
                    status: HealthState::Down,
                    database: None,
                    connection: None,
                    error: Some("Database health check timed out".to_string()),
                }
            }
        }
    }

    fn check_system(&self) -> SystemHealth {
        let mut sys = System::new();
        sys.refresh_memory();

        let available_processors = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let used = sys.used_memory();
        let total = sys.total_memory();
        let (status, warning) = memory_status(used, total, self.memory_down_threshold_percent);
        if status == HealthState::Down {
            warn!("High memory usage detected: {} of {}", format_bytes(used), format_bytes(total));
        }

        SystemHealth {
            status,
            memory_usage: format!("{:.2}%", usage_percent(used, total)),
            used_memory: format_bytes(used),
            total_memory: format_bytes(total),
            system_load: format!("{:.2}", System::load_average().one),
            available_processors,
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            warning,
        }
    }

    fn active_threads() -> Option<usize> {
        let pid = sysinfo::get_current_pid().ok()?;
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_tasks(),
        );
        // Task lists are only populated on Linux
        sys.process(pid)?.tasks().map(|tasks| tasks.len())
    }

    fn check_application(&self) -> ApplicationHealth {
        let uptime = self.started.elapsed();

        ApplicationHealth {
            status: HealthState::Up,
            name: self.app_name.clone(),
            version: env!("CARGO_PKG_VERSION"),
            start_time: self.started_at.to_rfc3339(),
            uptime: format_uptime(uptime),
            uptime_seconds: uptime.as_secs(),
            active_threads: Self::active_threads(),
        }
    }
}

fn usage_percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.0
}

/// UNKNOWN when the platform reports no memory figures
fn memory_status(used: u64, total: u64, threshold_percent: f64) -> (HealthState, Option<String>) {
    if total == 0 {
        return (HealthState::Unknown, None);
    }
    if usage_percent(used, total) < threshold_percent {
        (HealthState::Up, None)
    } else {
        (HealthState::Down, Some("High memory usage detected".to_string()))
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["KB", "MB", "GB", "TB", "PB", "EB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
}
