//! Restart loop around bot sessions.
//!
//! A session is one bot + dispatcher lifetime. Network failures and crashes
//! rebuild it after a delay; startup failures such as a missing token or
//! rejected credentials stop the process.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::core::config;
use crate::core::error::{AppError, AppResult};

/// How a bot session ended
#[derive(Debug)]
pub enum SessionEnd {
    /// Ctrl-C: stop the process
    Shutdown,
    /// Rebuild the bot after a delay
    Crashed(AppError),
    /// The bot cannot start with the current configuration
    Fatal(AppError),
}

impl SessionEnd {
    /// Classifies an error raised while building the bot.
    ///
    /// Only network trouble is worth retrying at this point.
    pub fn from_startup_error(err: AppError) -> Self {
        if err.is_network() {
            SessionEnd::Crashed(err)
        } else {
            SessionEnd::Fatal(err)
        }
    }
}

/// Waits between sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDelays {
    pub network: Duration,
    pub critical: Duration,
}

impl RetryDelays {
    pub fn from_config() -> Self {
        Self {
            network: config::retry::network_delay(),
            critical: config::retry::critical_delay(),
        }
    }
}

/// Runs sessions until one shuts down cleanly or fails fatally.
pub async fn supervise<F, Fut>(mut run_session: F, delays: RetryDelays) -> AppResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SessionEnd>,
{
    loop {
        match run_session().await {
            SessionEnd::Shutdown => {
                log::info!("Dispatcher shutdown gracefully");
                return Ok(());
            }
            SessionEnd::Fatal(e) => {
                log::error!("❌ Bot cannot start: {}", e);
                return Err(e);
            }
            SessionEnd::Crashed(e) if e.is_network() => {
                log::error!("🌐 Network error: {}. Restarting in {}s...", e, delays.network.as_secs());
                sleep(delays.network).await;
            }
            SessionEnd::Crashed(e) => {
                log::error!("💥 Bot crashed: {}. Restarting in {}s...", e, delays.critical.as_secs());
                sleep(delays.critical).await;
            }
        }
    }
}
