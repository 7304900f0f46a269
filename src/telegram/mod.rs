//! Telegram bot integration and handlers

pub mod bot;
pub mod handlers;
pub mod notifications;

// Re-exports for convenience
pub use bot::{create_bot, create_http_client, setup_bot_commands, Command};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use notifications::{Notifier, StatusMessage, TelegramNotifier};
