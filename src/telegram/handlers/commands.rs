//! Command handler implementations (/start, /add_channel, /remove_channel, /list_channels, /status)
//!
//! Reply texts are built by plain functions so they can be checked without a bot.

use teloxide::prelude::*;
use teloxide::types::{Message, Recipient};

use super::types::{HandlerDeps, HandlerError};
use crate::core::disk::{download_dir_stats, DirStats};
use crate::core::utils::format_size;
use crate::storage::{normalize_channel_id, AddOutcome, ChannelRegistry, RemoveOutcome};

pub const NOT_ALLOWED_TEXT: &str = "Sorry, you are not allowed to use this bot.";

pub const HELP_TEXT: &str = "Welcome to the channel video downloader!\n\
     /add_channel <channel> - start monitoring a channel\n\
     /remove_channel <channel> - stop monitoring a channel\n\
     /list_channels - list monitored channels\n\
     /status - download statistics";

const ADD_USAGE_TEXT: &str = "Please provide a channel username, e.g. /add_channel @channel_name";
const REMOVE_USAGE_TEXT: &str = "Please provide the channel to remove, e.g. /remove_channel @channel_name";

/// Text for `/list_channels`.
pub fn list_channels_text(registry: &ChannelRegistry) -> String {
    if registry.is_empty() {
        return "No channels are monitored yet".to_string();
    }
    let lines: Vec<String> = registry.list().iter().map(|c| format!("- @{}", c)).collect();
    format!("Monitored channels:\n{}", lines.join("\n"))
}

/// Text for `/status`.
pub fn status_text(channels: usize, stats: DirStats, download_dir: &std::path::Path) -> String {
    format!(
        "📊 Download statistics\nMonitored channels: {}\nDownloaded files: {}\nTotal size: {}\nStorage path: {}",
        channels,
        stats.files,
        format_size(stats.total_bytes),
        download_dir.display()
    )
}

/// Adds a channel that already passed verification and returns the reply.
pub fn add_channel_text(registry: &mut ChannelRegistry, channel: &str) -> String {
    match registry.add(channel) {
        Ok(AddOutcome::Added) => format!(
            "Channel @{} added\nNew videos from it will be downloaded automatically",
            channel
        ),
        Ok(AddOutcome::AlreadyPresent) => format!("Channel @{} is already monitored", channel),
        Err(e) => {
            log::error!("Failed to add channel {}: {}", channel, e);
            format!("Failed to save the channel list: {}", e)
        }
    }
}

/// Removes a channel and returns the reply.
pub fn remove_channel_text(registry: &mut ChannelRegistry, arg: &str) -> String {
    let Some(channel) = normalize_channel_id(arg) else {
        return REMOVE_USAGE_TEXT.to_string();
    };
    match registry.remove(&channel) {
        Ok(RemoveOutcome::Removed) => format!("Removed channel: @{}", channel),
        Ok(RemoveOutcome::NotFound) => "Channel not found".to_string(),
        Err(e) => {
            log::error!("Failed to remove channel {}: {}", channel, e);
            format!("Failed to save the channel list: {}", e)
        }
    }
}

/// Explains a failed channel lookup to the administrator.
pub fn add_channel_error_text(error: &str) -> String {
    if error.to_lowercase().contains("chat not found") {
        "Channel not found. Make sure that:\n\
         1. The channel username is correct\n\
         2. The channel is public\n\
         3. The bot has joined the channel"
            .to_string()
    } else {
        format!(
            "Failed to add channel: {}\nMake sure that:\n\
             1. The channel username is correct\n\
             2. The bot is an administrator of the channel",
            error
        )
    }
}

/// Handle /start command
pub(super) async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    if !deps.is_admin(msg) {
        log::warn!(
            "Unauthorized /start from user {:?}",
            msg.from.as_ref().map(|u| u.id.0)
        );
        bot.send_message(msg.chat.id, NOT_ALLOWED_TEXT).await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, HELP_TEXT).await?;
    Ok(())
}

/// Handle /add_channel command
///
/// The chat must exist, be a channel, and have the bot among its
/// administrators; otherwise the bot would never receive its posts.
pub(super) async fn handle_add_channel_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    arg: &str,
) -> Result<(), HandlerError> {
    let Some(channel) = normalize_channel_id(arg) else {
        bot.send_message(msg.chat.id, ADD_USAGE_TEXT).await?;
        return Ok(());
    };

    let reply = match verify_channel(bot, deps, &channel).await {
        Ok(None) => {
            let mut registry = deps.registry.write().await;
            add_channel_text(&mut registry, &channel)
        }
        Ok(Some(problem)) => problem.to_string(),
        Err(e) => {
            log::error!("Failed to add channel {}: {}", channel, e);
            add_channel_error_text(&e.to_string())
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// Returns `Ok(None)` if the channel can be monitored, or the reason it cannot.
async fn verify_channel(
    bot: &Bot,
    deps: &HandlerDeps,
    channel: &str,
) -> Result<Option<&'static str>, teloxide::RequestError> {
    let chat = bot
        .get_chat(Recipient::ChannelUsername(format!("@{}", channel)))
        .await?;
    if !chat.is_channel() {
        return Ok(Some("This is not a channel"));
    }

    let member = bot.get_chat_member(chat.id, deps.bot_id).await?;
    if !member.kind.is_privileged() {
        return Ok(Some("Please add the bot as an administrator of the channel first"));
    }

    Ok(None)
}

/// Handle /remove_channel command
pub(super) async fn handle_remove_channel_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    arg: &str,
) -> Result<(), HandlerError> {
    let reply = {
        let mut registry = deps.registry.write().await;
        remove_channel_text(&mut registry, arg)
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// Handle /list_channels command
pub(super) async fn handle_list_channels_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let reply = list_channels_text(&*deps.registry.read().await);
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// Handle /status command
pub(super) async fn handle_status_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let (channels, registry_path) = {
        let registry = deps.registry.read().await;
        (registry.len(), registry.path().to_path_buf())
    };
    let download_dir = deps.pipeline.config().download_dir.clone();

    let reply = match download_dir_stats(&download_dir, &[registry_path.as_path()]) {
        Ok(stats) => status_text(channels, stats, &download_dir),
        Err(e) => {
            log::error!("Failed to read download directory {}: {}", download_dir.display(), e);
            format!("Failed to read download statistics: {}", e)
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}
