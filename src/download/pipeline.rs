//! Channel post → file on disk.
//!
//! ```text
//! Validating → SizeChecked → Downloading → Finalizing → Completed
//!      │             │             │             │
//!   Skipped          └─────────────┴─────────────┴──→ Failed
//! ```
//!
//! Skips are silent. Every failure deletes the partial file first and then
//! sends exactly one notification to the administrator.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::core::config;
use crate::core::utils::{format_size, format_speed};
use crate::download::error::{PipelineError, SkipReason};
use crate::download::fetch::MediaFetcher;
use crate::download::job::{reserve_target_file, DownloadJob, IncomingPost, VideoAttachment};
use crate::storage::ChannelRegistry;
use crate::telegram::notifications::{Notifier, StatusMessage};

/// Settings the pipeline reads once at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub download_dir: PathBuf,
    /// Largest declared size accepted, in bytes (inclusive)
    pub max_file_size: u64,
    pub progress_interval: Duration,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self {
            download_dir: config::DOWNLOAD_PATH.clone(),
            max_file_size: config::limits::max_file_size_bytes(),
            progress_interval: config::progress::update_interval(),
        }
    }
}

/// Where a job currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    SizeChecked,
    Downloading,
    Finalizing,
    Completed,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Validating => "validating",
            PipelineStage::SizeChecked => "size_checked",
            PipelineStage::Downloading => "downloading",
            PipelineStage::Finalizing => "finalizing",
            PipelineStage::Completed => "completed",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Summary of a finished download
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedDownload {
    pub channel: String,
    pub file_name: String,
    pub path: PathBuf,
    /// Size measured on disk
    pub size: u64,
    pub elapsed: Duration,
    /// Bytes per second over the whole job
    pub average_speed: f64,
}

impl CompletedDownload {
    /// Text the status message is replaced with.
    pub fn summary(&self) -> String {
        format!(
            "✅ Video downloaded\nChannel: @{}\nFile: {}\nSize: {}\nTime: {}s\nAverage speed: {}/s",
            self.channel,
            self.file_name,
            format_size(self.size),
            self.elapsed.as_secs(),
            format_speed(self.average_speed)
        )
    }
}

/// Terminal result of [`DownloadPipeline::handle_post`]
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Skipped(SkipReason),
    Completed(CompletedDownload),
    Failed(PipelineError),
}

/// Builds the failure notification text.
pub fn failure_message(channel: &str, file_name: Option<&str>, size: Option<u64>, err: &PipelineError) -> String {
    let mut text = format!("❌ Download failed\nChannel: @{}", channel);
    if let Some(name) = file_name {
        text.push_str(&format!("\nFile: {}", name));
    }
    if let Some(size) = size {
        text.push_str(&format!("\nSize: {}", format_size(size)));
    }
    text.push_str(&format!("\n{}: {}", err.label(), err.user_message()));
    text
}

/// Downloads videos posted to monitored channels.
pub struct DownloadPipeline {
    config: PipelineConfig,
    registry: Arc<RwLock<ChannelRegistry>>,
    fetcher: Arc<dyn MediaFetcher>,
    notifier: Arc<dyn Notifier>,
}

impl DownloadPipeline {
    pub fn new(
        config: PipelineConfig,
        registry: Arc<RwLock<ChannelRegistry>>,
        fetcher: Arc<dyn MediaFetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            registry,
            fetcher,
            notifier,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one post through the pipeline.
    pub async fn handle_post(&self, post: &IncomingPost) -> JobOutcome {
        let (channel, attachment) = match self.validate(post).await {
            Ok(valid) => valid,
            Err(reason) => {
                log::debug!("Ignoring update: {}", reason);
                return JobOutcome::Skipped(reason);
            }
        };

        let display_name = attachment.file_name.clone();
        log::info!(
            "🎬 New video in @{}: {} ({})",
            channel,
            display_name.as_deref().unwrap_or("<unnamed>"),
            format_size(attachment.declared_size)
        );

        if attachment.declared_size > self.config.max_file_size {
            let err = PipelineError::SizeExceeded {
                declared: attachment.declared_size,
                limit: self.config.max_file_size,
            };
            log_stage(&channel, PipelineStage::Failed);
            log::error!("@{}: {}", channel, err);
            self.notify_failure(&channel, display_name.as_deref(), Some(attachment.declared_size), &err)
                .await;
            return JobOutcome::Failed(err);
        }
        log_stage(&channel, PipelineStage::SizeChecked);

        if let Err(e) = fs_err::tokio::create_dir_all(&self.config.download_dir).await {
            let err = PipelineError::from(e);
            log_stage(&channel, PipelineStage::Failed);
            self.notify_failure(&channel, display_name.as_deref(), None, &err).await;
            return JobOutcome::Failed(err);
        }

        let mut job = DownloadJob::new(channel, attachment);
        job.progress = job.progress.with_interval(self.config.progress_interval);

        log_stage(&job.channel, PipelineStage::Downloading);
        let result = match self.download(&mut job).await {
            Ok((status, path)) => {
                log_stage(&job.channel, PipelineStage::Finalizing);
                self.finalize(&job, status, path).await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(completed) => {
                log_stage(&job.channel, PipelineStage::Completed);
                log::info!(
                    "✅ Video downloaded: {} ({})",
                    completed.path.display(),
                    format_size(completed.size)
                );
                JobOutcome::Completed(completed)
            }
            Err(err) => {
                log_stage(&job.channel, PipelineStage::Failed);
                log::error!("❌ Download of {} failed: {}", job.file_name, err);
                if let Some(path) = &job.target_path {
                    remove_partial(path).await;
                }
                self.notify_failure(&job.channel, Some(&job.file_name), None, &err).await;
                JobOutcome::Failed(err)
            }
        }
    }

    async fn validate(&self, post: &IncomingPost) -> Result<(String, VideoAttachment), SkipReason> {
        if !post.is_channel_post {
            return Err(SkipReason::NotChannelPost);
        }
        let channel = post.channel.clone().ok_or(SkipReason::NoChannelUsername)?;
        log_stage(&channel, PipelineStage::Validating);

        if !self.registry.read().await.contains(&channel) {
            return Err(SkipReason::ChannelNotMonitored(channel));
        }
        let attachment = post.attachment.clone().ok_or(SkipReason::NoVideo)?;
        Ok((channel, attachment))
    }

    /// Sends the status message and streams the file to disk.
    async fn download(&self, job: &mut DownloadJob) -> Result<(StatusMessage, PathBuf), PipelineError> {
        let total = job.attachment.declared_size;

        let status = self
            .notifier
            .send(&format!(
                "⬇️ Starting download: {}\nSize: {}",
                job.file_name,
                format_size(total)
            ))
            .await
            .map_err(|e| PipelineError::TransferFailed(format!("could not send status message: {}", e)))?;

        let mut stream = self
            .fetcher
            .open(&job.attachment)
            .await
            .map_err(|e| PipelineError::TransferFailed(e.to_string()))?;

        let (path, mut file) = reserve_target_file(&self.config.download_dir, &job.file_name).await?;
        job.target_path = Some(path.clone());
        log::info!("📥 Downloading to {}", path.display());

        let mut current: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| PipelineError::TransferFailed(e.to_string()))?;
            file.write_all(&chunk).await?;
            current += chunk.len() as u64;
            job.progress.report(self.notifier.as_ref(), status, current, total).await;
        }

        file.flush().await?;
        Ok((status, path))
    }

    async fn finalize(
        &self,
        job: &DownloadJob,
        status: StatusMessage,
        path: PathBuf,
    ) -> Result<CompletedDownload, PipelineError> {
        let size = fs_err::tokio::metadata(&path).await?.len();
        let elapsed = job.started_at.elapsed();
        let secs = elapsed.as_secs_f64();
        let average_speed = if secs > 0.0 { size as f64 / secs } else { 0.0 };

        let completed = CompletedDownload {
            channel: job.channel.clone(),
            file_name: job.file_name.clone(),
            path,
            size,
            elapsed,
            average_speed,
        };

        if let Err(e) = self.notifier.edit(status, &completed.summary()).await {
            log::warn!("Failed to send completion summary for {}: {}", job.file_name, e);
        }

        Ok(completed)
    }

    async fn notify_failure(&self, channel: &str, file_name: Option<&str>, size: Option<u64>, err: &PipelineError) {
        let text = failure_message(channel, file_name, size, err);
        if let Err(e) = self.notifier.send(&text).await {
            log::error!("Failed to notify admin about {} failure: {}", err.kind(), e);
        }
    }
}

fn log_stage(channel: &str, stage: PipelineStage) {
    log::debug!("@{} → {}", channel, stage);
}

async fn remove_partial(path: &std::path::Path) {
    match fs_err::tokio::remove_file(path).await {
        Ok(()) => log::info!("🗑️ Removed partial file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove partial file {}: {}", path.display(), e),
    }
}
