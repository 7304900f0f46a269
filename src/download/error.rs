use std::fmt;

use crate::core::utils::format_size;

/// Why a post was ignored without notifying anyone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The update is not a channel post
    NotChannelPost,
    /// The channel has no public username to match against the registry
    NoChannelUsername,
    /// The channel is not in the registry
    ChannelNotMonitored(String),
    /// The post carries no video attachment
    NoVideo,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotChannelPost => write!(f, "not a channel post"),
            SkipReason::NoChannelUsername => write!(f, "channel has no username"),
            SkipReason::ChannelNotMonitored(channel) => write!(f, "channel @{} is not monitored", channel),
            SkipReason::NoVideo => write!(f, "post has no video"),
        }
    }
}

/// Closed set of ways a download job can end without a file.
///
/// Everything except [`PipelineError::ValidationSkipped`] is reported to the
/// administrator exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The post did not qualify for download
    ValidationSkipped(SkipReason),
    /// Declared size is above the configured ceiling
    SizeExceeded { declared: u64, limit: u64 },
    /// The Bot API, the network or the status message failed
    TransferFailed(String),
    /// Writing the file to the download directory failed
    PersistenceFailed(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ValidationSkipped(reason) => write!(f, "skipped: {}", reason),
            PipelineError::SizeExceeded { declared, limit } => {
                write!(f, "file size {} bytes exceeds limit of {} bytes", declared, limit)
            }
            PipelineError::TransferFailed(msg) => write!(f, "transfer failed: {}", msg),
            PipelineError::PersistenceFailed(msg) => write!(f, "could not write file: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

impl PipelineError {
    /// Text shown to the administrator after the `Reason:`/`Error:` label.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::ValidationSkipped(reason) => format!("Skipped ({})", reason),
            PipelineError::SizeExceeded { limit, .. } => {
                format!("File exceeds the configured {} limit", format_size(*limit))
            }
            PipelineError::TransferFailed(msg) => format!("Download error: {}", msg),
            PipelineError::PersistenceFailed(msg) => format!("Could not save the file: {}", msg),
        }
    }

    /// Label used in the failure notification.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineError::SizeExceeded { .. } | PipelineError::ValidationSkipped(_) => "Reason",
            PipelineError::TransferFailed(_) | PipelineError::PersistenceFailed(_) => "Error",
        }
    }

    /// Short category name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::ValidationSkipped(_) => "validation_skipped",
            PipelineError::SizeExceeded { .. } => "size_exceeded",
            PipelineError::TransferFailed(_) => "transfer_failed",
            PipelineError::PersistenceFailed(_) => "persistence_failed",
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::PersistenceFailed(err.to_string())
    }
}
