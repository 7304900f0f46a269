use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::sync::RwLock;

use chanloader::cli::{ChannelsAction, Cli, Commands};
use chanloader::core::disk::download_dir_stats;
use chanloader::core::logging::log_startup_configuration;
use chanloader::core::supervisor::{supervise, RetryDelays, SessionEnd};
use chanloader::core::{config, format_size, init_logger, AppError};
use chanloader::download::{BotApiFetcher, DownloadPipeline, PipelineConfig};
use chanloader::storage::{AddOutcome, ChannelRegistry, RemoveOutcome};
use chanloader::telegram::{create_bot, create_http_client, schema, setup_bot_commands, HandlerDeps, TelegramNotifier};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, registry, configuration).
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Load environment variables from .env before any config value is read
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
        Some(Commands::Channels { action }) => run_channels_command(action),
        Some(Commands::Status) => run_status_command(),
    }
}

/// Runs the bot, rebuilding it after network failures and crashes.
///
/// Returns an error when the bot cannot start at all (missing token, bad credentials).
async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");
    log_startup_configuration();

    let admin_id = *config::admin::ADMIN_USER_ID;
    if admin_id == 0 {
        return Err(AppError::Config("ADMIN_USER_ID is not set or invalid".to_string()).into());
    }

    fs_err::create_dir_all(&*config::DOWNLOAD_PATH)?;

    // Loaded once; survives bot rebuilds
    let registry = Arc::new(RwLock::new(ChannelRegistry::load(
        config::CHANNELS_FILE.as_path(),
        config::registry::remove_policy(),
    )?));
    log::info!("Monitored channels: {:?}", registry.read().await.list());

    supervise(|| run_session(Arc::clone(&registry), admin_id), RetryDelays::from_config()).await?;

    Ok(())
}

/// Builds a fresh bot and dispatcher and runs it until it stops.
async fn run_session(registry: Arc<RwLock<ChannelRegistry>>, admin_id: i64) -> SessionEnd {
    let client = match create_http_client() {
        Ok(client) => client,
        Err(e) => return SessionEnd::from_startup_error(e.into()),
    };
    let bot = match create_bot(client.clone()) {
        Ok(bot) => bot,
        Err(e) => return SessionEnd::from_startup_error(e.into()),
    };

    let bot_info = match bot.get_me().await {
        Ok(info) => info,
        Err(e) => return SessionEnd::from_startup_error(e.into()),
    };
    log::info!("Bot username: {:?}, Bot ID: {}", bot_info.username.as_deref(), bot_info.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let fetcher = match BotApiFetcher::new(bot.clone(), client) {
        Ok(fetcher) => fetcher,
        Err(e) => return SessionEnd::from_startup_error(e.into()),
    };
    let pipeline = DownloadPipeline::new(
        PipelineConfig::from_env(),
        Arc::clone(&registry),
        Arc::new(fetcher),
        Arc::new(TelegramNotifier::new(bot.clone(), admin_id)),
    );
    let deps = HandlerDeps::new(registry, Arc::new(pipeline), admin_id, bot_info.id);
    let handler = schema(deps);

    log::info!("📡 Ready to receive updates!");

    // Run the dispatcher in a separate task so a panic ends the session instead of the process
    let handle = tokio::spawn(async move {
        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await
    });

    match handle.await {
        Ok(()) => SessionEnd::Shutdown,
        Err(join_err) if join_err.is_panic() => {
            log::error!("Dispatcher panicked: {}", join_err);
            SessionEnd::Crashed(anyhow::anyhow!("dispatcher panicked: {}", join_err).into())
        }
        Err(join_err) => SessionEnd::Crashed(anyhow::anyhow!("dispatcher task cancelled: {}", join_err).into()),
    }
}

/// `chanloader channels ...`: edits the registry file directly
fn run_channels_command(action: ChannelsAction) -> Result<()> {
    let mut registry = ChannelRegistry::load(config::CHANNELS_FILE.as_path(), config::registry::remove_policy())?;

    match action {
        ChannelsAction::List => {
            if registry.is_empty() {
                println!("No channels are monitored");
            }
            for channel in registry.list() {
                println!("@{}", channel);
            }
        }
        ChannelsAction::Add { channel } => match registry.add(&channel)? {
            AddOutcome::Added => println!("Added {}", channel),
            AddOutcome::AlreadyPresent => println!("Already monitored: {}", channel),
        },
        ChannelsAction::Remove { channel } => match registry.remove(&channel)? {
            RemoveOutcome::Removed => println!("Removed {}", channel),
            RemoveOutcome::NotFound => println!("Channel not found: {}", channel),
        },
    }

    Ok(())
}

/// `chanloader status`: prints download directory statistics
fn run_status_command() -> Result<()> {
    let registry = ChannelRegistry::load(config::CHANNELS_FILE.as_path(), config::registry::remove_policy())?;
    let stats = download_dir_stats(&config::DOWNLOAD_PATH, &[registry.path()])?;

    println!("Monitored channels: {}", registry.len());
    println!("Downloaded files:   {}", stats.files);
    println!("Total size:         {}", format_size(stats.total_bytes));
    println!("Storage path:       {}", config::DOWNLOAD_PATH.display());

    Ok(())
}
