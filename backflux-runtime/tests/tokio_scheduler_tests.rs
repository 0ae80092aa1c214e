// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::BackfluxError;
use backflux_runtime::{Scheduler, TokioScheduler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{pause, sleep};

#[test]
fn test_new_outside_runtime_is_illegal_state() {
    let result = TokioScheduler::new();
    assert!(matches!(result, Err(BackfluxError::IllegalState { .. })));
}

#[tokio::test]
async fn test_schedule_after_fires_once_after_delay() -> anyhow::Result<()> {
    // Arrange
    pause();
    let scheduler = TokioScheduler::new()?;
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();

    // Act
    scheduler.schedule_after(
        Duration::from_millis(250),
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    // Assert
    sleep(Duration::from_millis(200)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_cancelled_periodic_task_stops_ticking() -> anyhow::Result<()> {
    // Arrange
    pause();
    let scheduler = TokioScheduler::new()?;
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();
    let handle = scheduler.schedule_periodic(
        Duration::from_millis(100),
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    // Act
    sleep(Duration::from_millis(350)).await;
    handle.cancel();
    handle.cancel();
    let observed = ticks.load(Ordering::SeqCst);
    sleep(Duration::from_millis(500)).await;

    // Assert
    assert_eq!(observed, 3);
    assert_eq!(ticks.load(Ordering::SeqCst), 3);

    Ok(())
}

#[tokio::test]
async fn test_periodic_task_with_unreachable_period_never_fires() -> anyhow::Result<()> {
    // Arrange
    pause();
    let scheduler = TokioScheduler::new()?;
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();

    // Act
    let handle = scheduler.schedule_periodic(
        Duration::MAX,
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    sleep(Duration::from_secs(3_600)).await;
    handle.cancel();

    // Assert
    assert_eq!(ticks.load(Ordering::SeqCst), 0);
    assert!(handle.is_cancelled());
    Ok(())
}
