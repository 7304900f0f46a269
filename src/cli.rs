use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "chanloader")]
#[command(author, version, about = "Telegram bot that downloads every video posted to watched channels", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (default)
    Run,

    /// Manage the monitored channel list without starting the bot
    Channels {
        #[command(subcommand)]
        action: ChannelsAction,
    },

    /// Print download directory statistics
    Status,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ChannelsAction {
    /// List monitored channels
    List,

    /// Add a channel (no Bot API verification is done)
    Add {
        /// Channel username, with or without `@`
        channel: String,
    },

    /// Remove a channel
    Remove {
        /// Channel username, with or without `@`
        channel: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
