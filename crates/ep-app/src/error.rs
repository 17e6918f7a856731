//! Error types for the ep-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// gives frontends a single error surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {}", path.display())]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write project file: {}", path.display())]
    ProjectFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported project file extension: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ep-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ep_project::ProjectError> for AppError {
    fn from(err: ep_project::ProjectError) -> Self {
        match err {
            ep_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<ep_project::ValidationError> for AppError {
    fn from(err: ep_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<ep_catalog::CatalogError> for AppError {
    fn from(err: ep_catalog::CatalogError) -> Self {
        AppError::Catalog(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
