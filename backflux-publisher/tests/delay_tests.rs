// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{BackfluxError, Publisher};
use backflux_publisher::{empty, error, from_iter, interval, just, DelayExt, TakeExt};
use backflux_runtime::{TokioScheduler, VirtualTimeScheduler};
use backflux_test_utils::{ErrorInjectingPublisher, PublisherProbe, TestSubscriber};
use std::time::Duration;
use tokio::time::{pause, sleep};

const PERIOD: Duration = Duration::from_millis(250);

#[test]
fn test_delay_subscription_defers_upstream_subscribe() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let probe = PublisherProbe::of(just(["mike"]));
    let subscriber = TestSubscriber::unbounded();

    // Act
    probe
        .clone()
        .delay_subscription(PERIOD, scheduler.clone())
        .subscribe(subscriber.boxed())?;

    // Assert
    assert!(subscriber.is_subscribed());
    assert!(!probe.was_subscribed());

    scheduler.advance_by(PERIOD);
    assert!(probe.was_subscribed());
    assert_eq!(subscriber.items(), vec!["mike"]);
    assert!(subscriber.is_completed());
    Ok(())
}

#[test]
fn test_delay_subscription_replays_early_demand() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let subscriber = TestSubscriber::without_demand();
    from_iter(1..=3)
        .delay_subscription(PERIOD, scheduler.clone())
        .subscribe(subscriber.boxed())?;

    // Act
    subscriber.request(2)?;
    scheduler.advance_by(PERIOD);

    // Assert
    assert_eq!(subscriber.items(), vec![1, 2]);
    assert!(!subscriber.is_terminated());
    Ok(())
}

#[test]
fn test_delay_subscription_cancel_before_firing() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let probe = PublisherProbe::of(just([1]));
    let subscriber = TestSubscriber::unbounded();
    probe
        .clone()
        .delay_subscription(PERIOD, scheduler.clone())
        .subscribe(subscriber.boxed())?;

    // Act
    subscriber.cancel();
    scheduler.advance_by(PERIOD * 2);

    // Assert
    assert!(!probe.was_subscribed());
    assert_eq!(scheduler.pending_tasks(), 0);
    assert!(!subscriber.is_terminated());
    Ok(())
}

#[test]
fn test_delay_elements_spaces_items_by_period() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let subscriber = TestSubscriber::unbounded();
    just(["skyler", "jesse", "walter"])
        .delay_elements(PERIOD, scheduler.clone())
        .subscribe(subscriber.boxed())?;

    // Act / Assert
    scheduler.advance_by(PERIOD - Duration::from_millis(1));
    assert_eq!(subscriber.item_count(), 0);

    scheduler.advance_by(Duration::from_millis(1));
    assert_eq!(subscriber.items(), vec!["skyler"]);

    scheduler.advance_by(PERIOD);
    assert_eq!(subscriber.items(), vec!["skyler", "jesse"]);
    assert!(!subscriber.is_terminated());

    scheduler.advance_by(PERIOD);
    assert_eq!(subscriber.items(), vec!["skyler", "jesse", "walter"]);
    assert!(subscriber.is_completed());
    Ok(())
}

#[test]
fn test_delay_elements_fetches_one_item_at_a_time() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let probe = PublisherProbe::of(from_iter(0..100));
    let subscriber = TestSubscriber::unbounded();

    // Act
    probe
        .clone()
        .delay_elements(PERIOD, scheduler.clone())
        .subscribe(subscriber.boxed())?;
    scheduler.advance_by(PERIOD * 3);

    // Assert
    assert_eq!(subscriber.items(), vec![0, 1, 2]);
    assert_eq!(probe.total_requested(), 4);
    Ok(())
}

#[test]
fn test_delay_elements_respects_downstream_demand() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let subscriber = TestSubscriber::with_demand(1);
    from_iter(0..10)
        .delay_elements(PERIOD, scheduler.clone())
        .subscribe(subscriber.boxed())?;

    // Act
    scheduler.advance_by(PERIOD * 4);

    // Assert
    assert_eq!(subscriber.items(), vec![0]);
    assert_eq!(scheduler.pending_tasks(), 0);

    subscriber.request(1)?;
    scheduler.advance_by(PERIOD);
    assert_eq!(subscriber.items(), vec![0, 1]);
    Ok(())
}

#[test]
fn test_delay_elements_empty_completes_immediately() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let subscriber = TestSubscriber::<i32>::unbounded();

    // Act
    empty()
        .delay_elements(PERIOD, scheduler.clone())
        .subscribe(subscriber.boxed())?;

    // Assert
    assert!(subscriber.is_completed());
    assert_eq!(scheduler.pending_tasks(), 0);
    Ok(())
}

#[test]
fn test_delay_elements_error_passes_immediately() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let subscriber = TestSubscriber::unbounded();

    // Act
    ErrorInjectingPublisher::new(just([1, 2, 3]), 1)
        .delay_elements(PERIOD, scheduler.clone())
        .subscribe(subscriber.boxed())?;
    scheduler.advance_by(PERIOD);

    // Assert
    assert_eq!(subscriber.items(), vec![1]);
    assert!(matches!(subscriber.error(), Some(BackfluxError::Upstream(_))));
    Ok(())
}

#[test]
fn test_delay_elements_error_drops_pending_item() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let subscriber = TestSubscriber::<i32>::unbounded();

    // Act
    error(BackfluxError::upstream_message("boom"))
        .delay_elements(PERIOD, scheduler.clone())
        .subscribe(subscriber.boxed())?;

    // Assert
    assert_eq!(
        subscriber.error(),
        Some(BackfluxError::upstream_message("boom"))
    );
    assert_eq!(scheduler.pending_tasks(), 0);
    Ok(())
}

#[test]
fn test_delay_elements_completion_waits_for_last_item() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let subscriber = TestSubscriber::unbounded();

    // Act
    interval(Duration::from_millis(100), scheduler.clone())
        .take(3)
        .delay_elements(Duration::from_millis(10), scheduler.clone())
        .subscribe(subscriber.boxed())?;
    scheduler.advance_by(Duration::from_millis(300));

    // Assert
    assert_eq!(subscriber.items(), vec![0, 1]);
    assert!(!subscriber.is_terminated());

    scheduler.advance_by(Duration::from_millis(10));
    assert_eq!(subscriber.items(), vec![0, 1, 2]);
    assert!(subscriber.is_completed());
    assert_eq!(scheduler.pending_tasks(), 0);
    Ok(())
}

#[test]
fn test_delay_elements_cancel_clears_timer() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let probe = PublisherProbe::of(from_iter(0..10));
    let subscriber = TestSubscriber::unbounded();
    probe
        .clone()
        .delay_elements(PERIOD, scheduler.clone())
        .subscribe(subscriber.boxed())?;

    // Act
    subscriber.cancel();

    // Assert
    assert!(probe.was_cancelled());
    assert_eq!(scheduler.pending_tasks(), 0);
    scheduler.advance_by(PERIOD * 2);
    assert!(subscriber.items().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_delay_elements_on_tokio_scheduler() -> anyhow::Result<()> {
    // Arrange
    pause();
    let subscriber = TestSubscriber::unbounded();

    // Act
    just([1, 2])
        .delay_elements(Duration::from_millis(100), TokioScheduler::new()?)
        .subscribe(subscriber.boxed())?;
    sleep(Duration::from_millis(150)).await;

    // Assert
    assert_eq!(subscriber.items(), vec![1]);
    assert!(subscriber.await_terminal(Duration::from_millis(100)).await);
    assert_eq!(subscriber.items(), vec![1, 2]);
    Ok(())
}
