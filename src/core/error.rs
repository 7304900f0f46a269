use thiserror::Error;

/// Centralized error types for the application
///
/// Library code returns `AppResult<T>`; the binary converts to `anyhow` at
/// its boundary. Pipeline outcomes have their own closed set of kinds in
/// [`crate::download::PipelineError`].
///
/// # Example
///
/// ```no_run
/// use chanloader::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// HTTP errors (file streaming, client construction)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Channel registry file could not be read or written
    #[error("Channel registry error ({path}): {reason}")]
    Registry { path: String, reason: String },

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Builds a registry error for the given file.
    pub fn registry(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        AppError::Registry {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for transport-level failures the supervisor loop recovers from.
    pub fn is_network(&self) -> bool {
        match self {
            AppError::Telegram(teloxide::RequestError::Network(_)) => true,
            AppError::Telegram(teloxide::RequestError::RetryAfter(_)) => true,
            AppError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
