//! Error types for the feature renderer.

use thiserror::Error;

/// Result type alias using RendererError.
pub type Result<T> = std::result::Result<T, RendererError>;

/// Errors raised while configuring or running a feature renderer.
#[derive(Debug, Error)]
pub enum RendererError {
    // === Configuration Errors ===
    #[error("Unknown style type: {0}")]
    UnknownStyleType(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid style configuration for '{style}': {message}")]
    InvalidStyle { style: String, message: String },

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    // === Drawing Errors ===
    #[error("{style} cannot draw {geometry} geometry")]
    UnsupportedGeometry {
        style: &'static str,
        geometry: &'static str,
    },

    // === Infrastructure Errors ===
    #[error("Failed to start draw worker pool: {0}")]
    WorkerPool(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RendererError {
    /// Create an InvalidStyle error.
    pub fn invalid_style(style: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidStyle {
            style: style.into(),
            message: message.into(),
        }
    }

    /// Whether the error comes from a configuration record rather than from
    /// drawing or the runtime.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            RendererError::UnknownStyleType(_)
                | RendererError::MissingField(_)
                | RendererError::InvalidStyle { .. }
                | RendererError::InvalidConfig(_)
                | RendererError::Json(_)
        )
    }
}

impl From<rayon::ThreadPoolBuildError> for RendererError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        RendererError::WorkerPool(err.to_string())
    }
}
