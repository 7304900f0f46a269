//! Administrator notifications
//!
//! The download pipeline talks to the administrator only through the
//! [`Notifier`] trait: one message is sent per job and then edited in place.
//! [`TelegramNotifier`] is the Bot API implementation; tests record calls
//! instead.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::MessageId;

/// Handle to a message previously sent by a [`Notifier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMessage(pub MessageId);

/// Outbound channel to the administrator.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a new plain-text message and returns a handle for later edits.
    async fn send(&self, text: &str) -> anyhow::Result<StatusMessage>;

    /// Replaces the text of a previously sent message.
    async fn edit(&self, status: StatusMessage, text: &str) -> anyhow::Result<()>;
}

/// Sends notifications to the administrator's private chat through the Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    admin_chat: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, admin_id: i64) -> Self {
        Self {
            bot,
            admin_chat: ChatId(admin_id),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> anyhow::Result<StatusMessage> {
        let message = self.bot.send_message(self.admin_chat, text).await?;
        Ok(StatusMessage(message.id))
    }

    async fn edit(&self, status: StatusMessage, text: &str) -> anyhow::Result<()> {
        match self.bot.edit_message_text(self.admin_chat, status.0, text).await {
            Ok(_) => Ok(()),
            // The message already shows this text, nothing to do
            Err(e) if e.to_string().contains("message is not modified") => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
