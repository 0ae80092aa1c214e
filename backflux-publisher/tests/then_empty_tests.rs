// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{BackfluxError, Publisher};
use backflux_publisher::{error, from_iter, never, ThenEmptyExt};
use backflux_test_utils::{PublisherProbe, TestSubscriber, Verifier};

#[test]
fn test_then_empty_keeps_only_completion() -> anyhow::Result<()> {
    // Arrange
    let probe = PublisherProbe::of(from_iter(vec!["skyler", "jesse", "walter", "saul"]));

    // Act / Assert
    Verifier::create(probe.clone().then_empty()).verify_complete()?;
    assert!(probe.was_requested());
    Ok(())
}

#[test]
fn test_then_empty_relays_error() -> anyhow::Result<()> {
    Verifier::create(error::<i32>(BackfluxError::upstream_message("boom")).then_empty())
        .expect_error(&BackfluxError::upstream_message("boom"))?;
    Ok(())
}

#[test]
fn test_then_empty_rejects_zero_request() -> anyhow::Result<()> {
    // Arrange
    let subscriber = TestSubscriber::without_demand();
    never::<i32>().then_empty().subscribe(subscriber.boxed())?;

    // Act
    let result = subscriber.request(0);

    // Assert
    assert_eq!(result, Err(BackfluxError::invalid_demand(0)));
    Ok(())
}

#[test]
fn test_then_empty_cancel_cancels_upstream() -> anyhow::Result<()> {
    // Arrange
    let probe = PublisherProbe::of(never::<i32>());
    let subscriber = TestSubscriber::<()>::unbounded();
    probe.clone().then_empty().subscribe(subscriber.boxed())?;

    // Act
    subscriber.cancel();

    // Assert
    assert!(probe.was_cancelled());
    Ok(())
}
