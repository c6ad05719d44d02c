use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The rendering engine could not be started. Aborts the whole sweep.
    #[error("Rendering session unavailable: {0}")]
    Session(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Element {locator} still reads {not_ready:?} after {waited:?}")]
    ReadinessTimeout {
        locator: String,
        not_ready: String,
        waited: Duration,
    },

    #[error("Log header mismatch in {path:?}: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short, stable name of the failure class, used in diagnostics and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Navigation { .. } => "navigation",
            Error::ElementNotFound(_) => "element_not_found",
            Error::ReadinessTimeout { .. } => "readiness_timeout",
            Error::Session(_) => "session",
            _ => "other",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
