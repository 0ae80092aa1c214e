// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::BackfluxError;
use backflux_publisher::{empty, error, interval, just, never, TakeExt};
use backflux_runtime::VirtualTimeScheduler;
use backflux_test_utils::{Verifier, VerifyError};
use std::time::Duration;

#[test]
fn test_verifier_accepts_matching_sequence() -> anyhow::Result<()> {
    Verifier::create(just(["foo", "bar"]))
        .expect_next(["foo", "bar"])
        .verify_complete()?;
    Ok(())
}

#[test]
fn test_verifier_reports_unexpected_item() {
    // Arrange
    let verifier = Verifier::create(just([1, 2, 3])).expect_next([1, 5]);

    // Act
    let result = verifier.verify_complete();

    // Assert
    assert!(matches!(
        result,
        Err(VerifyError::UnexpectedItem { index: 1, .. })
    ));
}

#[test]
fn test_verifier_reports_items_left_before_completion() {
    // Arrange
    let verifier = Verifier::create(just([1, 2, 3])).expect_next([1]);

    // Act
    let result = verifier.verify_complete();

    // Assert
    assert!(matches!(result, Err(VerifyError::UnexpectedItems { .. })));
}

#[test]
fn test_verifier_reports_missing_items_on_early_completion() {
    // Arrange
    let verifier = Verifier::create(empty::<i32>()).expect_next([1]);

    // Act
    let result = verifier.verify_complete();

    // Assert
    assert!(matches!(
        result,
        Err(VerifyError::MissingItems {
            expected: 1,
            actual: 0
        })
    ));
}

#[test]
fn test_verifier_expect_error_matches_cause() -> anyhow::Result<()> {
    let cause = BackfluxError::illegal_state("boom");
    Verifier::create(error::<i32>(cause.clone())).expect_error(&cause)?;
    Ok(())
}

#[test]
fn test_verifier_expect_error_rejects_completion() {
    // Arrange
    let verifier = Verifier::create(just([1])).expect_next([1]);

    // Act
    let result = verifier.expect_error(&BackfluxError::illegal_state("boom"));

    // Assert
    assert!(matches!(result, Err(VerifyError::ExpectedError(_))));
}

#[test]
fn test_verifier_verify_error_returns_the_error() -> anyhow::Result<()> {
    // Act
    let error = Verifier::create(error::<i32>(BackfluxError::upstream_message("io")))
        .verify_error()?;

    // Assert
    assert!(matches!(error, BackfluxError::Upstream(_)));
    Ok(())
}

#[test]
fn test_verifier_bounded_demand_steps() -> anyhow::Result<()> {
    Verifier::create(just([1, 2, 3]))
        .with_initial_demand(1)
        .expect_next([1])
        .then_request(2)
        .expect_next_count(2)
        .verify_complete()?;
    Ok(())
}

#[test]
fn test_verifier_zero_request_step_fails() {
    // Arrange
    let verifier = Verifier::create(just([1]))
        .with_initial_demand(0)
        .then_request(0);

    // Act
    let result = verifier.verify_complete();

    // Assert
    assert!(matches!(
        result,
        Err(VerifyError::Request(BackfluxError::InvalidDemand { requested: 0 }))
    ));
}

#[test]
fn test_verifier_times_out_on_silent_source() {
    // Arrange
    let verifier = Verifier::create(never::<i32>()).with_timeout(Duration::from_millis(20));

    // Act
    let result = verifier.verify_complete();

    // Assert
    assert!(matches!(result, Err(VerifyError::ExpectedComplete(_))));
}

#[test]
fn test_verifier_cancel_then_verify() -> anyhow::Result<()> {
    // Act
    let subscriber = Verifier::create(never::<i32>())
        .then_cancel()
        .verify()?;

    // Assert
    assert!(!subscriber.is_terminated());
    Ok(())
}

#[test]
fn test_verifier_advances_virtual_time() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let ticks = interval(Duration::from_millis(100), scheduler.clone()).take(3);

    // Act / Assert
    Verifier::create(ticks)
        .then_advance(&scheduler, Duration::from_millis(200))
        .expect_next([0, 1])
        .then_advance(&scheduler, Duration::from_millis(100))
        .expect_next([2])
        .verify_complete()?;
    Ok(())
}
