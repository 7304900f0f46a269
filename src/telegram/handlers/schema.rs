//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::{
    handle_add_channel_command, handle_list_channels_command, handle_remove_channel_command, handle_start_command,
    handle_status_command,
};
use super::posts::handle_channel_post;
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// # Arguments
/// * `deps` - Handler dependencies (channel registry, download pipeline, admin id)
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_posts = deps.clone();

    dptree::entry()
        // Administrator commands in private chats
        .branch(command_handler(deps_commands))
        // Posts in channels the bot administers
        .branch(channel_post_handler(deps_posts))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);

                if cmd != Command::Start && !deps.is_admin(&msg) {
                    log::warn!(
                        "Ignoring {:?} from non-admin user {:?}",
                        cmd,
                        msg.from.as_ref().map(|u| u.id.0)
                    );
                    return Ok(());
                }

                let result = match cmd {
                    Command::Start => handle_start_command(&bot, &msg, &deps).await,
                    Command::AddChannel(arg) => handle_add_channel_command(&bot, &msg, &deps, &arg).await,
                    Command::RemoveChannel(arg) => handle_remove_channel_command(&bot, &msg, &deps, &arg).await,
                    Command::ListChannels => handle_list_channels_command(&bot, &msg, &deps).await,
                    Command::Status => handle_status_command(&bot, &msg, &deps).await,
                };

                if let Err(e) = result {
                    log::error!("❌ Command handler failed in chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        },
    ))
}

fn channel_post_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_channel_post().endpoint(move |msg: Message| {
        let deps = deps.clone();
        async move { handle_channel_post(&msg, &deps).await }
    })
}
