//! Download management and processing

pub mod error;
pub mod fetch;
pub mod job;
pub mod pipeline;
pub mod progress;

// Re-exports for convenience
pub use error::{PipelineError, SkipReason};
pub use fetch::{BotApiFetcher, ChunkStream, MediaFetcher};
pub use job::{DownloadJob, IncomingPost, VideoAttachment};
pub use pipeline::{CompletedDownload, DownloadPipeline, JobOutcome, PipelineConfig, PipelineStage};
pub use progress::{ProgressReporter, ProgressSnapshot};
