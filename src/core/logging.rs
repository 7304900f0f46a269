//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup summary of the effective configuration

use anyhow::Result;
use simplelog::*;
use std::path::Path;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// The log file is appended to, and its parent directory is created if needed.
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to open the file or a logger was already set
pub fn init_logger(log_file_path: &Path) -> Result<()> {
    if let Some(parent) = log_file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }

    let log_file = fs_err::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup
pub fn log_startup_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("⚙️  Configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Admin ID: {}", *config::admin::ADMIN_USER_ID);
    log::info!("Download path: {}", config::DOWNLOAD_PATH.display());
    log::info!("Channels file: {}", config::CHANNELS_FILE.display());
    log::info!("Log file: {}", config::LOG_FILE_PATH.display());
    match config::bot_api::get_url() {
        Some(url) => log::info!("Bot API: {}", url),
        None => log::info!("Bot API: https://api.telegram.org (public)"),
    }
    log::info!(
        "Max file size: {}",
        crate::core::utils::format_size(config::limits::max_file_size_bytes())
    );
    if *config::registry::PERSIST_ON_NOOP_REMOVE {
        log::info!("Registry: rewriting file on every /remove_channel");
    }
}
