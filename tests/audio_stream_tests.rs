// Unit tests for the audio stream manager
//
// These tests exercise the stream slot lifecycle: open replacing the
// previous stream, idempotent close, the reset cooldown, and the source
// toggles reaching (or tolerating the absence of) the live stream.

mod common;

use std::sync::atomic::Ordering;

use tokio::time::Instant;

use common::{FakeEngine, FakeHandle};
use pressel::audio::{StreamManager, RESET_COOLDOWN};
use pressel::error::AudioError;

#[tokio::test]
async fn test_open_replaces_existing_stream() {
    let (engine, audio) = FakeEngine::new();
    let manager = StreamManager::new(engine);
    let handle = FakeHandle::new(vec![]);

    manager.open(&handle).await.unwrap();
    assert_eq!(audio.opens(), 1);
    assert_eq!(audio.drops(), 0);

    manager.open(&handle).await.unwrap();
    assert_eq!(audio.opens(), 2);
    assert_eq!(audio.drops(), 1);
    assert_eq!(handle.log().voice_opens.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_open_failure_propagates() {
    let (engine, audio) = FakeEngine::new();
    audio.fail_open.store(true, Ordering::SeqCst);
    let manager = StreamManager::new(engine);
    let handle = FakeHandle::new(vec![]);

    let err = manager.open(&handle).await.unwrap_err();

    assert!(matches!(err, AudioError::NoDevice));
    assert_eq!(audio.opens(), 0);
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (engine, audio) = FakeEngine::new();
    let manager = StreamManager::new(engine);
    let handle = FakeHandle::new(vec![]);

    manager.open(&handle).await.unwrap();
    manager.close().await;
    assert_eq!(audio.drops(), 1);

    manager.close().await;
    assert_eq!(audio.drops(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_observes_cooldown() {
    let (engine, audio) = FakeEngine::new();
    let manager = StreamManager::new(engine);
    let handle = FakeHandle::new(vec![]);

    manager.open(&handle).await.unwrap();

    let started = Instant::now();
    manager.reset(&handle).await.unwrap();

    assert!(started.elapsed() >= RESET_COOLDOWN);
    assert_eq!(audio.drops(), 1);
    assert_eq!(audio.opens(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reset_failure_leaves_no_stream() {
    let (engine, audio) = FakeEngine::new();
    let manager = StreamManager::new(engine);
    let handle = FakeHandle::new(vec![]);

    manager.open(&handle).await.unwrap();
    audio.fail_open.store(true, Ordering::SeqCst);

    let err = manager.reset(&handle).await.unwrap_err();
    assert!(matches!(err, AudioError::NoDevice));
    assert_eq!(audio.drops(), 1);

    // Nothing replaced the destroyed stream; source calls degrade to
    // no-ops.
    manager.start_source().await.unwrap();
    assert_eq!(audio.starts(), 0);
}

#[tokio::test]
async fn test_source_toggles_reach_stream() {
    let (engine, audio) = FakeEngine::new();
    let manager = StreamManager::new(engine);
    let handle = FakeHandle::new(vec![]);

    manager.open(&handle).await.unwrap();
    manager.start_source().await.unwrap();
    manager.stop_source().await.unwrap();

    assert_eq!(audio.starts(), 1);
    assert_eq!(audio.stops(), 1);
}

#[tokio::test]
async fn test_source_calls_without_stream_are_no_ops() {
    let (engine, audio) = FakeEngine::new();
    let manager = StreamManager::new(engine);

    manager.start_source().await.unwrap();
    manager.stop_source().await.unwrap();

    assert_eq!(audio.starts(), 0);
    assert_eq!(audio.stops(), 0);
}
