//! Error types for BMI Assist.

/// Startup and transport failures that end the process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures while loading the percentile reference table.
///
/// Each variant is surfaced to the user with its own message, so callers must
/// not collapse them.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Percentile table not found at {path}")]
    NotFound { path: String },

    #[error("Percentile table at {path} is malformed: {reason}")]
    Malformed { path: String, reason: String },

    #[error("No permission to read percentile table at {path}")]
    PermissionDenied { path: String },

    #[error("Percentile table at {path} could not be read: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Visualization collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("No percentile data for sex {sex}")]
    MissingSeries { sex: String },

    #[error("Chart rendering failed: {0}")]
    RenderFailed(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
