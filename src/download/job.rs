//! Download job data: what a post carries and where its file goes.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local};
use teloxide::types::Message;

use crate::core::utils::escape_filename;
use crate::download::progress::ProgressReporter;

/// Returns true for `video/*` MIME types.
pub fn is_video_mime(mime: &mime::Mime) -> bool {
    mime.type_() == mime::VIDEO
}

/// Video file referenced by a channel post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAttachment {
    /// Bot API file id used to fetch the content
    pub file_id: String,
    /// Original file name, if the sender provided one
    pub file_name: Option<String>,
    /// Size reported by Telegram, in bytes
    pub declared_size: u64,
    pub mime_type: Option<mime::Mime>,
}

impl VideoAttachment {
    /// Extracts the attachment from a post.
    ///
    /// Native videos always qualify. Documents qualify when their MIME type
    /// is `video/*`.
    pub fn from_message(msg: &Message) -> Option<Self> {
        if let Some(video) = msg.video() {
            return Some(Self {
                file_id: video.file.id.to_string(),
                file_name: video.file_name.clone(),
                declared_size: u64::from(video.file.size),
                mime_type: video.mime_type.clone(),
            });
        }

        let document = msg.document()?;
        let mime_type = document.mime_type.clone()?;
        if !is_video_mime(&mime_type) {
            return None;
        }

        Some(Self {
            file_id: document.file.id.to_string(),
            file_name: document.file_name.clone(),
            declared_size: u64::from(document.file.size),
            mime_type: Some(mime_type),
        })
    }
}

/// What the pipeline needs to know about an incoming update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingPost {
    pub is_channel_post: bool,
    /// Public username of the originating chat, without `@`
    pub channel: Option<String>,
    pub attachment: Option<VideoAttachment>,
}

impl IncomingPost {
    pub fn from_message(msg: &Message) -> Self {
        Self {
            is_channel_post: msg.chat.is_channel(),
            channel: msg.chat.username().map(str::to_string),
            attachment: VideoAttachment::from_message(msg),
        }
    }

    /// Builds a channel post directly, without a Telegram message.
    pub fn channel_post(channel: impl Into<String>, attachment: Option<VideoAttachment>) -> Self {
        Self {
            is_channel_post: true,
            channel: Some(channel.into()),
            attachment,
        }
    }
}

/// File name used when the post does not carry one.
pub fn default_file_name(now: DateTime<Local>) -> String {
    format!("video_{}.mp4", now.format("%Y%m%d_%H%M%S"))
}

/// Creates a new file for `file_name` inside `dir` and returns its path.
///
/// The name is sanitized first. If the file already exists, `_1`, `_2`, ...
/// is appended to the stem until an unused name is found. Files are opened
/// with `create_new`, so two jobs can never end up with the same path.
pub async fn reserve_target_file(dir: &Path, file_name: &str) -> io::Result<(PathBuf, fs_err::tokio::File)> {
    let file_name = escape_filename(file_name);
    let (stem, ext) = split_extension(&file_name);

    let mut counter: u64 = 0;
    loop {
        let candidate = if counter == 0 {
            dir.join(&file_name)
        } else {
            dir.join(format!("{}_{}{}", stem, counter, ext))
        };
        match fs_err::tokio::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => counter += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Splits `clip.mp4` into `("clip", ".mp4")`. Dotfiles and names without
/// a dot have no extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

/// A single video being downloaded
#[derive(Debug)]
pub struct DownloadJob {
    pub channel: String,
    pub attachment: VideoAttachment,
    /// Display name: the name from the post or the generated default
    pub file_name: String,
    /// Set once the job has created its file; only that file is removed on failure
    pub target_path: Option<PathBuf>,
    pub started_at: Instant,
    pub progress: ProgressReporter,
}

impl DownloadJob {
    pub fn new(channel: impl Into<String>, attachment: VideoAttachment) -> Self {
        let file_name = attachment
            .file_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| default_file_name(Local::now()));
        let started_at = Instant::now();

        Self {
            channel: channel.into(),
            progress: ProgressReporter::new(file_name.clone(), started_at),
            attachment,
            file_name,
            target_path: None,
            started_at,
        }
    }
}
