//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the Telegram bot.
//! Command replies are built by plain functions, re-exported here so tests
//! can check them without a running bot.

mod commands;
mod posts;
mod schema;
mod types;

pub use commands::{add_channel_text, list_channels_text, remove_channel_text, status_text, HELP_TEXT, NOT_ALLOWED_TEXT};
pub use schema::schema;
pub use types::{is_admin_sender, HandlerDeps, HandlerError};
