// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::BackfluxError;
use backflux_exec::{subscribe, SubscribeExt};
use backflux_publisher::{error, from_iter, from_iterator, interval, just, never};
use backflux_runtime::VirtualTimeScheduler;
use backflux_test_utils::{PublisherProbe, TestSubscriber};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct Recorded {
    items: Vec<u64>,
    errors: Vec<BackfluxError>,
    completions: usize,
}

fn recorder(
    record: &Arc<Mutex<Recorded>>,
) -> (
    impl FnMut(u64) + Send + 'static,
    impl FnOnce(BackfluxError) + Send + 'static,
    impl FnOnce() + Send + 'static,
) {
    let items = record.clone();
    let errors = record.clone();
    let completions = record.clone();
    (
        move |item| items.lock().items.push(item),
        move |error| errors.lock().errors.push(error),
        move || completions.lock().completions += 1,
    )
}

#[test]
fn test_subscribe_with_receives_all_items_and_completion() -> anyhow::Result<()> {
    // Arrange
    let record = Arc::new(Mutex::new(Recorded::default()));
    let (on_next, on_error, on_complete) = recorder(&record);

    // Act
    let disposable = from_iter(0..5u64).subscribe_with(on_next, on_error, on_complete)?;

    // Assert
    let record = record.lock();
    assert_eq!(record.items, vec![0, 1, 2, 3, 4]);
    assert!(record.errors.is_empty());
    assert_eq!(record.completions, 1);
    assert!(disposable.is_terminated());
    Ok(())
}

#[test]
fn test_subscribe_with_reports_error() -> anyhow::Result<()> {
    // Arrange
    let record = Arc::new(Mutex::new(Recorded::default()));
    let (on_next, on_error, on_complete) = recorder(&record);

    // Act
    let disposable = error::<u64>(BackfluxError::upstream_message("boom"))
        .subscribe_with(on_next, on_error, on_complete)?;

    // Assert
    let record = record.lock();
    assert_eq!(record.errors, vec![BackfluxError::upstream_message("boom")]);
    assert_eq!(record.completions, 0);
    assert!(disposable.is_terminated());
    Ok(())
}

#[test]
fn test_dispose_is_idempotent_and_stops_timer() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let record = Arc::new(Mutex::new(Recorded::default()));
    let (on_next, on_error, on_complete) = recorder(&record);
    let disposable = interval(Duration::from_millis(100), scheduler.clone())
        .subscribe_with(on_next, on_error, on_complete)?;
    scheduler.advance_by(Duration::from_millis(250));

    // Act
    disposable.dispose();
    disposable.dispose();
    scheduler.advance_by(Duration::from_secs(1));

    // Assert
    assert!(disposable.is_disposed());
    assert!(!disposable.is_terminated());
    assert_eq!(record.lock().items, vec![0, 1]);
    assert_eq!(scheduler.pending_tasks(), 0);
    Ok(())
}

#[test]
fn test_subscribe_tracks_custom_subscriber() -> anyhow::Result<()> {
    // Arrange
    let probe = PublisherProbe::of(never::<i32>());
    let subscriber = TestSubscriber::unbounded();

    // Act
    let disposable = subscribe(&probe, subscriber.clone())?;
    disposable.dispose();

    // Assert
    assert!(subscriber.is_subscribed());
    assert!(probe.was_cancelled());
    assert!(!disposable.wait_terminal(Duration::from_millis(10)));
    Ok(())
}

#[test]
fn test_subscribe_propagates_subscribe_failure() -> anyhow::Result<()> {
    // Arrange
    let source = from_iterator(vec![1, 2].into_iter());
    subscribe(&source, TestSubscriber::unbounded())?;

    // Act
    let result = subscribe(&source, TestSubscriber::<i32>::unbounded());

    // Assert
    assert!(matches!(result, Err(BackfluxError::IllegalState { .. })));
    Ok(())
}

#[tokio::test]
async fn test_disposable_terminated_resolves() -> anyhow::Result<()> {
    // Arrange
    let subscriber = TestSubscriber::unbounded();

    // Act
    let disposable = subscribe(&just(["done"]), subscriber.clone())?;

    // Assert
    tokio::time::timeout(Duration::from_secs(1), disposable.terminated()).await?;
    assert!(subscriber.is_completed());
    Ok(())
}
