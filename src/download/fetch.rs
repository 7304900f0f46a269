//! Transfer primitive: turns a video attachment into a stream of bytes.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use teloxide::prelude::*;
use teloxide::types::FileId;
use url::Url;

use crate::core::config;
use crate::download::job::VideoAttachment;

/// Stream of file chunks in transfer order
pub type ChunkStream = BoxStream<'static, anyhow::Result<Bytes>>;

/// Source of attachment contents.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Starts transferring the attachment and returns its chunks.
    async fn open(&self, attachment: &VideoAttachment) -> anyhow::Result<ChunkStream>;
}

/// Path prefix a local Bot API server puts in front of stored files
const LOCAL_SERVER_PREFIX: &str = "/var/lib/telegram-bot-api/";

/// Builds `<base>/file/bot<token>/<path>`.
///
/// A local Bot API server reports absolute paths inside its data directory;
/// the prefix is stripped so the path becomes relative to its file endpoint.
pub fn build_file_url(base: &Url, token: &str, file_path: &str) -> anyhow::Result<Url> {
    let mut url = base.clone();

    let normalized_path = if config::bot_api::is_local_url(base.as_str()) {
        file_path.strip_prefix(LOCAL_SERVER_PREFIX).unwrap_or(file_path)
    } else {
        file_path
    };

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("BOT_API_URL cannot be a base URL"))?;
        segments.pop_if_empty();
        segments.push("file");
        segments.push(&format!("bot{token}"));
        for seg in normalized_path.split('/') {
            if !seg.is_empty() {
                segments.push(seg);
            }
        }
    }
    Ok(url)
}

/// Fetches attachments through the Bot API `getFile` + file endpoint.
pub struct BotApiFetcher {
    bot: Bot,
    client: reqwest::Client,
    base_url: Url,
}

impl BotApiFetcher {
    pub fn new(bot: Bot, client: reqwest::Client) -> anyhow::Result<Self> {
        let base = config::bot_api::get_url().unwrap_or_else(|| "https://api.telegram.org".to_string());
        let base_url =
            Url::parse(&base).map_err(|e| anyhow::anyhow!("Invalid Bot API base URL for file download: {}", e))?;
        Ok(Self { bot, client, base_url })
    }
}

#[async_trait]
impl MediaFetcher for BotApiFetcher {
    async fn open(&self, attachment: &VideoAttachment) -> anyhow::Result<ChunkStream> {
        let file = self.bot.get_file(FileId(attachment.file_id.clone())).await?;
        log::info!("File info retrieved: path = {}, size = {} bytes", file.path, file.size);

        let file_url = build_file_url(&self.base_url, self.bot.token(), &file.path)?;

        let resp = self.client.get(file_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Telegram file download failed (path={}, status={}): {}",
                file.path,
                status,
                body
            ));
        }

        Ok(resp.bytes_stream().map_err(anyhow::Error::from).boxed())
    }
}
