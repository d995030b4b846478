//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Which front end the binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// HTTP API (axum).
    Server,
    /// Local stdin/stdout REPL.
    Cli,
}

impl std::str::FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" | "http" => Ok(Self::Server),
            "cli" | "repl" => Ok(Self::Cli),
            other => Err(ConfigError::InvalidValue {
                key: "BMI_ASSIST_MODE".to_string(),
                message: format!("expected 'server' or 'cli', got '{other}'"),
            }),
        }
    }
}

/// Process-level configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: RunMode,
    /// Port for the HTTP API.
    pub port: u16,
    /// JSON percentile table, re-read on every completed intake.
    pub table_path: PathBuf,
    /// Sessions idle longer than this are evicted.
    pub session_idle_timeout: Duration,
    /// Chart descriptions kept in memory before the oldest is evicted.
    pub max_charts: usize,
    pub limits: IntakeLimits,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Server,
            port: 8080,
            table_path: PathBuf::from("data/tablas_percentiles.json"),
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            max_charts: 256,
            limits: IntakeLimits::default(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from `BMI_ASSIST_*` environment variables.
    ///
    /// Unparseable numbers fall back to defaults; an unknown mode is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mode = match std::env::var("BMI_ASSIST_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.mode,
        };

        let port: u16 = std::env::var("BMI_ASSIST_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let table_path = std::env::var("BMI_ASSIST_TABLE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.table_path);

        let session_idle_timeout = std::env::var("BMI_ASSIST_SESSION_IDLE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.session_idle_timeout);

        let max_charts: usize = std::env::var("BMI_ASSIST_MAX_CHARTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_charts);

        Ok(Self {
            mode,
            port,
            table_path,
            session_idle_timeout,
            max_charts,
            limits: IntakeLimits::default(),
        })
    }
}

/// Domain limits applied by the intake state machine.
#[derive(Debug, Clone)]
pub struct IntakeLimits {
    /// Maximum characters accepted for a name.
    pub max_name_chars: usize,
    pub min_age: u8,
    pub max_age: u8,
    /// Upper bound (inclusive) for weight in kilograms.
    pub max_weight_kg: f64,
    /// Upper bound (inclusive) for height in meters.
    pub max_height_m: f64,
    /// Raw heights above `max_height_m` and up to this value are read as centimeters.
    pub max_height_cm: f64,
    /// Children at or below this age get the heavy-weight confirmation warning.
    pub young_age: u8,
    /// Weight above which the young-child warning fires.
    pub young_weight_warning_kg: f64,
    /// Consecutive failures after which the restart hint is appended.
    pub escalate_after: u32,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_name_chars: 50,
            min_age: 1,
            max_age: 18,
            max_weight_kg: 200.0,
            max_height_m: 2.5,
            max_height_cm: 250.0,
            young_age: 5,
            young_weight_warning_kg: 30.0,
            escalate_after: 3,
        }
    }
}
