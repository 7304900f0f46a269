//! Recording mocks for the pipeline's outbound seams

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use teloxide::types::MessageId;

use chanloader::download::{ChunkStream, MediaFetcher, VideoAttachment};
use chanloader::telegram::{Notifier, StatusMessage};

/// One call made to a [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    Sent { id: i32, text: String },
    Edited { id: i32, text: String },
}

/// Notifier that records every message instead of talking to Telegram
#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<NotifierCall>>,
    next_id: AtomicI32,
    fail_sends: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `send` returns an error (edits still succeed)
    pub fn failing_sends() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NotifierCall::Sent { text, .. } => Some(text),
                NotifierCall::Edited { .. } => None,
            })
            .collect()
    }

    pub fn edited(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NotifierCall::Edited { text, .. } => Some(text),
                NotifierCall::Sent { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> anyhow::Result<StatusMessage> {
        if self.fail_sends {
            return Err(anyhow::anyhow!("chat not reachable"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().unwrap().push(NotifierCall::Sent {
            id,
            text: text.to_string(),
        });
        Ok(StatusMessage(MessageId(id)))
    }

    async fn edit(&self, status: StatusMessage, text: &str) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(NotifierCall::Edited {
            id: status.0 .0,
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Fetcher that replays a fixed list of chunks.
///
/// An `Err` entry ends the stream with that error, like a dropped connection.
pub struct ScriptedFetcher {
    chunks: Vec<Result<Vec<u8>, String>>,
    /// Per-file scripts keyed by file id; fall back to `chunks`
    by_file_id: HashMap<String, Vec<Result<Vec<u8>, String>>>,
    chunk_delay: Duration,
    open_error: Option<String>,
    opened: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(chunks: Vec<Result<Vec<u8>, String>>) -> Self {
        Self {
            chunks,
            by_file_id: HashMap::new(),
            chunk_delay: Duration::ZERO,
            open_error: None,
            opened: AtomicUsize::new(0),
        }
    }

    /// Replays a different script for each file id
    pub fn per_file(scripts: Vec<(&str, Vec<Result<Vec<u8>, String>>)>) -> Self {
        let mut fetcher = Self::new(Vec::new());
        fetcher.by_file_id = scripts
            .into_iter()
            .map(|(file_id, chunks)| (file_id.to_string(), chunks))
            .collect();
        fetcher
    }

    /// Sleeps before yielding each chunk
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Delivers `total` bytes split into `parts` equal chunks
    pub fn bytes(total: usize, parts: usize) -> Self {
        let size = total / parts;
        Self::new((0..parts).map(|_| Ok(vec![7u8; size])).collect())
    }

    /// `open` itself fails (e.g. `getFile` rejected the file)
    pub fn failing_open(error: &str) -> Self {
        Self {
            open_error: Some(error.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaFetcher for ScriptedFetcher {
    async fn open(&self, attachment: &VideoAttachment) -> anyhow::Result<ChunkStream> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.open_error {
            return Err(anyhow::anyhow!(error.clone()));
        }

        let chunks = self.by_file_id.get(&attachment.file_id).unwrap_or(&self.chunks);
        let items: Vec<anyhow::Result<Bytes>> = chunks
            .iter()
            .map(|chunk| match chunk {
                Ok(data) => Ok(Bytes::from(data.clone())),
                Err(e) => Err(anyhow::anyhow!(e.clone())),
            })
            .collect();
        let delay = self.chunk_delay;
        Ok(stream::iter(items)
            .then(move |item| async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                item
            })
            .boxed())
    }
}
