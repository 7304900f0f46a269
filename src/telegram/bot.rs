//! Bot initialization
//!
//! This module contains:
//! - Command enum definition
//! - HTTP client and Bot instance creation
//! - Command menu registration

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Available commands:")]
pub enum Command {
    #[command(description = "show help")]
    Start,
    #[command(description = "start monitoring a channel, e.g. /add_channel @name")]
    AddChannel(String),
    #[command(description = "stop monitoring a channel")]
    RemoveChannel(String),
    #[command(description = "list monitored channels")]
    ListChannels,
    #[command(description = "download statistics")]
    Status,
}

/// Builds the HTTP client shared by the bot and file downloads
pub fn create_http_client() -> anyhow::Result<reqwest::Client> {
    Ok(ClientBuilder::new()
        .timeout(config::network::timeout())
        .connect_timeout(config::network::connect_timeout())
        .build()?)
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token or invalid `BOT_API_URL`
pub fn create_bot(client: reqwest::Client) -> anyhow::Result<Bot> {
    if config::BOT_TOKEN.is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN (or TELOXIDE_TOKEN) is not set"));
    }

    let bot = Bot::with_client(config::BOT_TOKEN.as_str(), client);

    // Check if local Bot API server is configured
    let bot = if let Some(bot_api_url) = config::bot_api::get_url() {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
///
/// # Arguments
/// * `bot` - Bot instance to configure
///
/// # Returns
/// * `Ok(())` - Commands set successfully
/// * `Err(RequestError)` - Failed to set commands
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}
