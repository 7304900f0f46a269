//! Chanloader - Telegram bot that downloads every video posted to watched channels
//!
//! The bot is added as an administrator to a set of channels. Each new
//! channel post carrying a video is streamed to local storage while a single
//! status message in the administrator's chat shows progress.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, and formatting helpers
//! - `storage`: The persisted registry of monitored channels
//! - `download`: The download pipeline and progress reporting
//! - `telegram`: Bot creation, handler tree, and admin notifications

pub mod cli;
pub mod core;
pub mod download;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use download::{DownloadPipeline, IncomingPost, JobOutcome, PipelineConfig};
pub use storage::{ChannelRegistry, RemovePersistPolicy};
pub use telegram::{schema, HandlerDeps};
