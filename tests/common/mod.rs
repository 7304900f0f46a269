//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fixtures;
pub mod mocks;

#[allow(unused_imports)]
pub use fixtures::{channel_document_json, channel_video_json, private_text_json, video, TestPipeline};
#[allow(unused_imports)]
pub use mocks::{NotifierCall, RecordingNotifier, ScriptedFetcher};
