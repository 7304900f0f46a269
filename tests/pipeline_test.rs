//! Integration tests for the download pipeline
//!
//! Run with: cargo test --test pipeline_test

mod common;

use std::time::Duration;

use common::fixtures::MIB;
use common::{video, RecordingNotifier, ScriptedFetcher, TestPipeline};
use pretty_assertions::assert_eq;

use chanloader::download::{IncomingPost, JobOutcome, PipelineError, SkipReason, VideoAttachment};

#[tokio::test]
async fn test_downloads_video_and_reports_completion() {
    let env = TestPipeline::new(&["news"], 50 * MIB, ScriptedFetcher::bytes(3 * 1024, 3));

    let outcome = env.post("news", video(Some("clip.mp4"), 3 * 1024)).await;

    let done = match outcome {
        JobOutcome::Completed(done) => done,
        other => panic!("expected completion, got {:?}", other),
    };
    assert_eq!(done.size, 3 * 1024);
    assert_eq!(done.path, env.download_dir().join("clip.mp4"));
    assert_eq!(std::fs::read(&done.path).unwrap().len(), 3 * 1024);

    let sent = env.notifier.sent();
    assert_eq!(sent, vec!["⬇️ Starting download: clip.mp4\nSize: 3.0 KiB".to_string()]);

    let edited = env.notifier.edited();
    let summary = edited.last().unwrap();
    assert!(summary.starts_with("✅ Video downloaded\nChannel: @news\nFile: clip.mp4\nSize: 3.0 KiB"));
    // Zero interval: one progress edit per chunk before the summary
    assert_eq!(edited.len(), 4);
    assert!(edited[0].starts_with("📥 Downloading: clip.mp4"));
}

#[tokio::test]
async fn test_size_exceeded_fails_without_file() {
    let env = TestPipeline::new(&["news"], 50 * MIB, ScriptedFetcher::bytes(1024, 1));

    let outcome = env.post("news", video(Some("big.mp4"), 60 * MIB)).await;

    assert_eq!(
        outcome,
        JobOutcome::Failed(PipelineError::SizeExceeded {
            declared: 60 * MIB,
            limit: 50 * MIB,
        })
    );
    assert_eq!(env.files(), Vec::<String>::new());
    assert_eq!(env.fetcher.open_count(), 0);

    let sent = env.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0],
        "❌ Download failed\nChannel: @news\nFile: big.mp4\nSize: 60.0 MiB\n\
         Reason: File exceeds the configured 50.0 MiB limit"
    );
}

#[tokio::test]
async fn test_declared_size_equal_to_limit_is_accepted() {
    let env = TestPipeline::new(&["news"], 2048, ScriptedFetcher::bytes(2048, 2));

    let outcome = env.post("news", video(Some("edge.mp4"), 2048)).await;

    assert!(matches!(outcome, JobOutcome::Completed(_)));
    assert_eq!(env.files(), vec!["edge.mp4".to_string()]);
}

#[tokio::test]
async fn test_transfer_error_removes_partial_file() {
    let fetcher = ScriptedFetcher::new(vec![
        Ok(vec![1u8; 512]),
        Ok(vec![2u8; 512]),
        Err("connection reset by peer".to_string()),
    ]);
    let env = TestPipeline::new(&["news"], 50 * MIB, fetcher);

    let outcome = env.post("news", video(Some("clip.mp4"), 4096)).await;

    assert_eq!(
        outcome,
        JobOutcome::Failed(PipelineError::TransferFailed("connection reset by peer".to_string()))
    );
    assert!(!env.download_dir().join("clip.mp4").exists());
    assert_eq!(env.files(), Vec::<String>::new());

    let sent = env.notifier.sent();
    assert_eq!(sent.len(), 2, "start message and one failure notification");
    assert_eq!(
        sent[1],
        "❌ Download failed\nChannel: @news\nFile: clip.mp4\nError: Download error: connection reset by peer"
    );
    // The status message is never edited after cleanup
    assert!(env.notifier.edited().iter().all(|text| text.starts_with("📥")));
}

#[tokio::test]
async fn test_fetch_open_failure_notifies_once() {
    let env = TestPipeline::new(&["news"], 50 * MIB, ScriptedFetcher::failing_open("file is too big"));

    let outcome = env.post("news", video(Some("clip.mp4"), 1024)).await;

    assert!(matches!(outcome, JobOutcome::Failed(PipelineError::TransferFailed(_))));
    assert_eq!(env.files(), Vec::<String>::new());
    assert_eq!(env.notifier.sent().len(), 2);
}

#[tokio::test]
async fn test_status_message_failure_aborts_before_any_file() {
    let env = TestPipeline::with_notifier(
        &["news"],
        50 * MIB,
        ScriptedFetcher::bytes(1024, 1),
        RecordingNotifier::failing_sends(),
    );

    let outcome = env.post("news", video(Some("clip.mp4"), 1024)).await;

    assert!(matches!(outcome, JobOutcome::Failed(PipelineError::TransferFailed(_))));
    assert_eq!(env.fetcher.open_count(), 0);
    assert_eq!(env.files(), Vec::<String>::new());
}

#[tokio::test]
async fn test_existing_names_get_numeric_suffix() {
    let env = TestPipeline::new(&["news"], 50 * MIB, ScriptedFetcher::bytes(100, 1));
    std::fs::create_dir_all(env.download_dir()).unwrap();
    std::fs::write(env.download_dir().join("clip.mp4"), b"old").unwrap();

    let first = env.post("news", video(Some("clip.mp4"), 100)).await;
    let second = env.post("news", video(Some("clip.mp4"), 100)).await;

    let JobOutcome::Completed(first) = first else {
        panic!("first download failed");
    };
    let JobOutcome::Completed(second) = second else {
        panic!("second download failed");
    };
    assert_eq!(first.path, env.download_dir().join("clip_1.mp4"));
    assert_eq!(second.path, env.download_dir().join("clip_2.mp4"));
    assert_eq!(
        env.files(),
        vec!["clip.mp4".to_string(), "clip_1.mp4".to_string(), "clip_2.mp4".to_string()]
    );
    assert_eq!(std::fs::read(env.download_dir().join("clip.mp4")).unwrap(), b"old");
}

#[tokio::test]
async fn test_unnamed_video_gets_timestamped_name() {
    let env = TestPipeline::new(&["news"], 50 * MIB, ScriptedFetcher::bytes(10, 1));

    let outcome = env.post("news", video(None, 10)).await;

    let JobOutcome::Completed(done) = outcome else {
        panic!("download failed");
    };
    assert!(done.file_name.starts_with("video_"));
    assert!(done.file_name.ends_with(".mp4"));
}

#[tokio::test]
async fn test_unmonitored_channel_is_silent() {
    let env = TestPipeline::new(&["news"], 50 * MIB, ScriptedFetcher::bytes(10, 1));

    let outcome = env.post("sport", video(Some("clip.mp4"), 10)).await;

    assert_eq!(
        outcome,
        JobOutcome::Skipped(SkipReason::ChannelNotMonitored("sport".to_string()))
    );
    assert!(env.notifier.calls().is_empty());
    assert_eq!(env.files(), Vec::<String>::new());
    assert_eq!(env.fetcher.open_count(), 0);
}

#[tokio::test]
async fn test_posts_without_video_or_channel_are_skipped() {
    let env = TestPipeline::new(&["news"], 50 * MIB, ScriptedFetcher::bytes(10, 1));

    let no_video = env
        .pipeline
        .handle_post(&IncomingPost::channel_post("news", None))
        .await;
    assert_eq!(no_video, JobOutcome::Skipped(SkipReason::NoVideo));

    let private = IncomingPost {
        is_channel_post: false,
        channel: None,
        attachment: Some(video(Some("clip.mp4"), 10)),
    };
    assert_eq!(
        env.pipeline.handle_post(&private).await,
        JobOutcome::Skipped(SkipReason::NotChannelPost)
    );

    let anonymous = IncomingPost {
        is_channel_post: true,
        channel: None,
        attachment: Some(video(Some("clip.mp4"), 10)),
    };
    assert_eq!(
        env.pipeline.handle_post(&anonymous).await,
        JobOutcome::Skipped(SkipReason::NoChannelUsername)
    );

    assert!(env.notifier.calls().is_empty());
}

#[tokio::test]
async fn test_channel_removed_at_runtime_stops_downloads() {
    let env = TestPipeline::new(&["news"], 50 * MIB, ScriptedFetcher::bytes(10, 1));

    env.registry.write().await.remove("@news").unwrap();
    let outcome = env.post("news", video(Some("clip.mp4"), 10)).await;

    assert!(matches!(outcome, JobOutcome::Skipped(SkipReason::ChannelNotMonitored(_))));
}

#[tokio::test]
async fn test_remote_name_cannot_escape_download_dir() {
    let env = TestPipeline::new(&["news"], 50 * MIB, ScriptedFetcher::bytes(10, 1));

    let outcome = env.post("news", video(Some("../../evil.mp4"), 10)).await;

    let JobOutcome::Completed(done) = outcome else {
        panic!("download failed");
    };
    assert_eq!(done.path.parent(), Some(env.download_dir().as_path()));
}

#[tokio::test]
async fn test_concurrent_same_name_failure_keeps_other_download() {
    let fetcher = ScriptedFetcher::per_file(vec![
        ("news-clip", vec![Ok(vec![1u8; 512]), Ok(vec![1u8; 512]), Ok(vec![1u8; 512])]),
        (
            "sport-clip",
            vec![
                Ok(vec![2u8; 512]),
                Ok(vec![2u8; 512]),
                Ok(vec![2u8; 512]),
                Ok(vec![2u8; 512]),
                Err("connection reset".to_string()),
            ],
        ),
    ])
    .with_chunk_delay(Duration::from_millis(20));
    let env = TestPipeline::new(&["news", "sport"], 50 * MIB, fetcher);

    let news_video = VideoAttachment {
        file_id: "news-clip".to_string(),
        ..video(Some("clip.mp4"), 1536)
    };
    let sport_video = VideoAttachment {
        file_id: "sport-clip".to_string(),
        ..video(Some("clip.mp4"), 2560)
    };

    let (news, sport) = tokio::join!(env.post("news", news_video), env.post("sport", sport_video));

    let JobOutcome::Completed(done) = news else {
        panic!("news download failed: {:?}", news);
    };
    assert_eq!(
        sport,
        JobOutcome::Failed(PipelineError::TransferFailed("connection reset".to_string()))
    );

    assert_eq!(std::fs::read(&done.path).unwrap(), vec![1u8; 1536]);
    let kept = done.path.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(env.files(), vec![kept]);
}
