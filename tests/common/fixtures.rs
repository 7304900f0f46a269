//! Test fixtures: pipelines over temp directories and Telegram update JSON

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use chanloader::download::{DownloadPipeline, IncomingPost, JobOutcome, PipelineConfig, VideoAttachment};
use chanloader::storage::{ChannelRegistry, RemovePersistPolicy};

use super::mocks::{RecordingNotifier, ScriptedFetcher};

pub const MIB: u64 = 1024 * 1024;

/// A pipeline wired to recording mocks and a scratch download directory
pub struct TestPipeline {
    pub dir: tempfile::TempDir,
    pub registry: Arc<RwLock<ChannelRegistry>>,
    pub notifier: Arc<RecordingNotifier>,
    pub fetcher: Arc<ScriptedFetcher>,
    pub pipeline: Arc<DownloadPipeline>,
}

impl TestPipeline {
    /// Monitors `channels`, accepts files up to `max_file_size` bytes
    pub fn new(channels: &[&str], max_file_size: u64, fetcher: ScriptedFetcher) -> Self {
        Self::with_notifier(channels, max_file_size, fetcher, RecordingNotifier::new())
    }

    pub fn with_notifier(
        channels: &[&str],
        max_file_size: u64,
        fetcher: ScriptedFetcher,
        notifier: RecordingNotifier,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();

        let mut registry =
            ChannelRegistry::load(dir.path().join("channels.json"), RemovePersistPolicy::OnChange).unwrap();
        for channel in channels {
            registry.add(channel).unwrap();
        }
        let registry = Arc::new(RwLock::new(registry));

        let notifier = Arc::new(notifier);
        let fetcher = Arc::new(fetcher);
        let config = PipelineConfig {
            download_dir: dir.path().join("videos"),
            max_file_size,
            progress_interval: Duration::ZERO,
        };
        let pipeline = Arc::new(DownloadPipeline::new(
            config,
            registry.clone(),
            fetcher.clone(),
            notifier.clone(),
        ));

        Self {
            dir,
            registry,
            notifier,
            fetcher,
            pipeline,
        }
    }

    pub fn download_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("videos")
    }

    /// File names currently in the download directory, sorted
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(self.download_dir()) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    pub async fn post(&self, channel: &str, attachment: VideoAttachment) -> JobOutcome {
        self.pipeline
            .handle_post(&IncomingPost::channel_post(channel, Some(attachment)))
            .await
    }
}

/// A video attachment with the given name and declared size
pub fn video(file_name: Option<&str>, declared_size: u64) -> VideoAttachment {
    VideoAttachment {
        file_id: "BAACAgIAAxkBAAI".to_string(),
        file_name: file_name.map(str::to_string),
        declared_size,
        mime_type: Some("video/mp4".parse().unwrap()),
    }
}

fn channel_chat(username: &str) -> serde_json::Value {
    serde_json::json!({
        "id": -1001234567890i64,
        "type": "channel",
        "title": "Test Channel",
        "username": username
    })
}

/// Channel post carrying a native video
pub fn channel_video_json(username: &str, file_name: &str, file_size: u64) -> String {
    serde_json::json!({
        "message_id": 10,
        "date": 1234567890,
        "chat": channel_chat(username),
        "sender_chat": channel_chat(username),
        "video": {
            "file_id": "BAACAgIAAxkBAAI",
            "file_unique_id": "AgADBAAD",
            "width": 1280,
            "height": 720,
            "duration": 30,
            "file_name": file_name,
            "mime_type": "video/mp4",
            "file_size": file_size
        }
    })
    .to_string()
}

/// Channel post carrying a document with the given MIME type
pub fn channel_document_json(username: &str, file_name: &str, mime_type: &str, file_size: u64) -> String {
    serde_json::json!({
        "message_id": 11,
        "date": 1234567890,
        "chat": channel_chat(username),
        "sender_chat": channel_chat(username),
        "document": {
            "file_id": "BQACAgIAAxkBAAI",
            "file_unique_id": "AgADBQAD",
            "file_name": file_name,
            "mime_type": mime_type,
            "file_size": file_size
        }
    })
    .to_string()
}

/// Private text message from a user
pub fn private_text_json(user_id: i64, text: &str) -> String {
    serde_json::json!({
        "message_id": 1,
        "date": 1234567890,
        "chat": {
            "id": user_id,
            "type": "private",
            "first_name": "Test"
        },
        "from": {
            "id": user_id,
            "is_bot": false,
            "first_name": "Test",
            "username": "testuser"
        },
        "text": text
    })
    .to_string()
}
