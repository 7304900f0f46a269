//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::{Message, UserId};
use tokio::sync::RwLock;

use crate::download::DownloadPipeline;
use crate::storage::ChannelRegistry;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub registry: Arc<RwLock<ChannelRegistry>>,
    pub pipeline: Arc<DownloadPipeline>,
    /// The only user allowed to manage the bot
    pub admin_id: i64,
    pub bot_id: UserId,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(
        registry: Arc<RwLock<ChannelRegistry>>,
        pipeline: Arc<DownloadPipeline>,
        admin_id: i64,
        bot_id: UserId,
    ) -> Self {
        Self {
            registry,
            pipeline,
            admin_id,
            bot_id,
        }
    }

    /// Returns true if the message was sent by the administrator.
    pub fn is_admin(&self, msg: &Message) -> bool {
        is_admin_sender(msg.from.as_ref().map(|u| u.id.0), self.admin_id)
    }
}

/// Compares a raw Telegram user id with the configured administrator id.
pub fn is_admin_sender(sender: Option<u64>, admin_id: i64) -> bool {
    match sender.and_then(|id| i64::try_from(id).ok()) {
        Some(id) => admin_id != 0 && id == admin_id,
        None => false,
    }
}
