//! Persistent bot state

pub mod channels;

// Re-exports for convenience
pub use channels::{normalize_channel_id, AddOutcome, ChannelRegistry, RemoveOutcome, RemovePersistPolicy};
