//! Core utilities, configuration, and common functionality

pub mod config;
pub mod disk;
pub mod error;
pub mod logging;
pub mod supervisor;
pub mod utils;

// Re-exports for convenience
pub use error::{AppError, AppResult};
pub use logging::init_logger;
pub use utils::{format_size, format_speed};
