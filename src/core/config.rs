//! Configuration values for the bot.
//!
//! Everything is read once, on first access, from the process environment
//! (after `.env` has been loaded by `main`).

use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Expands a leading `~` in a configured path.
fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    non_empty_var("BOT_TOKEN")
        .or_else(|| non_empty_var("TELOXIDE_TOKEN"))
        .unwrap_or_default()
});

/// Directory where downloaded videos are stored
/// Read from DOWNLOAD_PATH environment variable
/// Default: ~/video (tilde is expanded)
pub static DOWNLOAD_PATH: Lazy<PathBuf> =
    Lazy::new(|| expand_path(&non_empty_var("DOWNLOAD_PATH").unwrap_or_else(|| "~/video".to_string())));

/// File holding the JSON array of monitored channels
/// Read from CHANNELS_FILE environment variable
/// Default: <DOWNLOAD_PATH>/channels.json
pub static CHANNELS_FILE: Lazy<PathBuf> = Lazy::new(|| {
    non_empty_var("CHANNELS_FILE")
        .map(|raw| expand_path(&raw))
        .unwrap_or_else(|| DOWNLOAD_PATH.join("channels.json"))
});

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: <DOWNLOAD_PATH>/logs/bot.log
pub static LOG_FILE_PATH: Lazy<PathBuf> = Lazy::new(|| {
    non_empty_var("LOG_FILE_PATH")
        .map(|raw| expand_path(&raw))
        .unwrap_or_else(|| DOWNLOAD_PATH.join("logs").join("bot.log"))
});

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    /// Parses an administrator id, accepting surrounding whitespace.
    pub fn parse_admin_id(raw: &str) -> Option<i64> {
        raw.trim().parse::<i64>().ok().filter(|id| *id != 0)
    }

    /// The single Telegram user allowed to manage the bot.
    /// Read from ADMIN_USER_ID environment variable
    /// Defaults to 0 if not set (startup refuses to run without it)
    pub static ADMIN_USER_ID: Lazy<i64> = Lazy::new(|| {
        env::var("ADMIN_USER_ID")
            .ok()
            .and_then(|s| parse_admin_id(&s))
            .unwrap_or(0)
    });
}

/// Channel registry configuration
pub mod registry {
    use once_cell::sync::Lazy;
    use std::env;

    use crate::storage::RemovePersistPolicy;

    /// Whether `/remove_channel` of an unknown channel still rewrites the file.
    /// Read from PERSIST_ON_NOOP_REMOVE environment variable
    /// Default: false (only effective changes are written)
    pub static PERSIST_ON_NOOP_REMOVE: Lazy<bool> = Lazy::new(|| {
        env::var("PERSIST_ON_NOOP_REMOVE")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(false)
    });

    pub fn remove_policy() -> RemovePersistPolicy {
        if *PERSIST_ON_NOOP_REMOVE {
            RemovePersistPolicy::Always
        } else {
            RemovePersistPolicy::OnChange
        }
    }
}

/// Progress message configuration
pub mod progress {
    use super::Duration;

    /// Minimum interval between two progress edits of the status message
    pub const UPDATE_INTERVAL_SECS: u64 = 2;

    /// Number of slots in the rendered progress bar
    pub const BAR_WIDTH: usize = 10;

    pub fn update_interval() -> Duration {
        Duration::from_secs(UPDATE_INTERVAL_SECS)
    }
}

/// File size limits
pub mod limits {
    use once_cell::sync::Lazy;
    use std::env;

    const MIB: u64 = 1024 * 1024;

    /// Maximum file size a bot can fetch through the public Bot API (50 MB)
    pub const PUBLIC_API_MAX_FILE_SIZE_BYTES: u64 = 50 * MIB;

    /// Maximum file size when a local Bot API server is used (2000 MB)
    pub const LOCAL_API_MAX_FILE_SIZE_BYTES: u64 = 2000 * MIB;

    /// Explicit override in megabytes
    /// Read from MAX_FILE_SIZE_MB environment variable
    pub static MAX_FILE_SIZE_MB: Lazy<Option<u64>> =
        Lazy::new(|| env::var("MAX_FILE_SIZE_MB").ok().and_then(|v| v.trim().parse().ok()));

    /// Maximum declared size of a video the bot will try to download.
    ///
    /// Standard Telegram Bot API (api.telegram.org): 50 MB
    /// Local Bot API Server: 2000 MB
    /// `MAX_FILE_SIZE_MB` takes priority over both.
    pub fn max_file_size_bytes() -> u64 {
        size_ceiling(*MAX_FILE_SIZE_MB, super::bot_api::is_local())
    }

    /// Huge overrides saturate at `u64::MAX` instead of wrapping.
    pub fn size_ceiling(override_mb: Option<u64>, local_api: bool) -> u64 {
        match override_mb {
            Some(mb) => mb.saturating_mul(MIB),
            None if local_api => LOCAL_API_MAX_FILE_SIZE_BYTES,
            None => PUBLIC_API_MAX_FILE_SIZE_BYTES,
        }
    }
}

/// Supervisor loop configuration
pub mod retry {
    use super::Duration;

    /// Delay before rebuilding the bot after a network failure (in seconds)
    pub const NETWORK_RETRY_DELAY_SECS: u64 = 10;

    /// Delay before rebuilding the bot after any other crash (in seconds)
    pub const CRITICAL_RETRY_DELAY_SECS: u64 = 30;

    pub fn network_delay() -> Duration {
        Duration::from_secs(NETWORK_RETRY_DELAY_SECS)
    }

    pub fn critical_delay() -> Duration {
        Duration::from_secs(CRITICAL_RETRY_DELAY_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    /// Large enough for a full file transfer through a local Bot API server
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    /// Connect timeout (in seconds)
    pub const CONNECT_TIMEOUT_SECS: u64 = 30;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }

    pub fn connect_timeout() -> Duration {
        Duration::from_secs(CONNECT_TIMEOUT_SECS)
    }
}

/// Bot API server configuration utilities
pub mod bot_api {
    /// Returns the BOT_API_URL environment variable if set.
    pub fn get_url() -> Option<String> {
        super::non_empty_var("BOT_API_URL")
    }

    /// Returns true if using a local Bot API server (not api.telegram.org).
    pub fn is_local() -> bool {
        get_url().map(|url| is_local_url(&url)).unwrap_or(false)
    }

    /// Checks if the given URL string points to a local Bot API server.
    pub fn is_local_url(url: &str) -> bool {
        !url.contains("api.telegram.org")
    }
}
