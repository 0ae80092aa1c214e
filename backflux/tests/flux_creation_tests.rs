// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux::prelude::*;
use backflux_test_utils::{TestSubscriber, Verifier};
use std::time::Duration;

#[test]
fn test_empty_flux_completes_without_items() -> anyhow::Result<()> {
    Verifier::create(empty::<String>()).verify_complete()?;
    Ok(())
}

#[test]
fn test_just_emits_values_in_order() -> anyhow::Result<()> {
    Verifier::create(just(["foo", "bar"]))
        .expect_next(["foo", "bar"])
        .verify_complete()?;
    Ok(())
}

#[test]
fn test_from_iter_preserves_list_order() -> anyhow::Result<()> {
    // Arrange
    let values = vec!["foo".to_string(), "bar".to_string()];

    // Act / Assert
    Verifier::create(from_iter(values))
        .expect_next(["foo".to_string(), "bar".to_string()])
        .verify_complete()?;
    Ok(())
}

#[test]
fn test_error_flux_fails_without_items() -> anyhow::Result<()> {
    // Arrange
    let cause = BackfluxError::illegal_state("counter failed");

    // Act / Assert
    Verifier::create(error::<String>(cause.clone()))
        .with_initial_demand(0)
        .expect_error(&cause)?;
    Ok(())
}

#[test]
fn test_counter_emits_ten_ticks_every_hundred_millis() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let counter = interval(Duration::from_millis(100), scheduler.clone()).take(10);

    // Act / Assert
    Verifier::create(counter)
        .then_advance(&scheduler, Duration::from_millis(99))
        .then_advance(&scheduler, Duration::from_millis(1))
        .expect_next([0])
        .then_advance(&scheduler, Duration::from_millis(900))
        .expect_next(1..10)
        .verify_complete()?;
    assert_eq!(scheduler.now(), Duration::from_secs(1));
    assert_eq!(scheduler.pending_tasks(), 0);
    Ok(())
}

#[tokio::test]
async fn test_counter_on_tokio_timer() -> anyhow::Result<()> {
    // Arrange
    tokio::time::pause();
    let subscriber = TestSubscriber::unbounded();
    let counter = interval_take(Duration::from_millis(100), 10, TokioScheduler::new()?);

    // Act
    counter.subscribe(subscriber.boxed())?;
    tokio::time::sleep(Duration::from_millis(1_050)).await;

    // Assert
    assert_eq!(subscriber.items(), (0..10).collect::<Vec<u64>>());
    assert!(subscriber.is_completed());
    Ok(())
}
