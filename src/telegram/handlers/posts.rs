//! Channel post handler

use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::download::{IncomingPost, JobOutcome};

/// Hands a channel post to the download pipeline.
///
/// The outcome is fully reported by the pipeline itself, so nothing here
/// ever fails the dispatcher.
pub(super) async fn handle_channel_post(msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let post = IncomingPost::from_message(msg);

    match deps.pipeline.handle_post(&post).await {
        JobOutcome::Skipped(reason) => log::debug!("Channel post {} skipped: {}", msg.id.0, reason),
        JobOutcome::Completed(done) => log::info!("Channel post {} saved as {}", msg.id.0, done.path.display()),
        JobOutcome::Failed(err) => log::warn!("Channel post {} failed ({}): {}", msg.id.0, err.kind(), err),
    }

    Ok(())
}
