// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{BackfluxError, Publisher};
use backflux_publisher::from_iter;
use backflux_test_utils::{ErrorInjectingPublisher, PublisherProbe, TestError, TestSubscriber};

#[test]
fn test_error_injection_at_position() -> anyhow::Result<()> {
    // Arrange
    let probe = PublisherProbe::of(from_iter(1..=5));
    let subscriber = TestSubscriber::unbounded();

    // Act
    ErrorInjectingPublisher::new(probe.clone(), 2).subscribe(subscriber.boxed())?;

    // Assert
    assert_eq!(subscriber.items(), vec![1, 2]);
    assert_eq!(
        subscriber.error(),
        Some(BackfluxError::upstream(TestError::Injected { position: 2 }))
    );
    assert!(probe.was_cancelled());
    assert_eq!(subscriber.violations(), 0);
    Ok(())
}

#[test]
fn test_error_injection_at_start() -> anyhow::Result<()> {
    // Arrange
    let subscriber = TestSubscriber::unbounded();

    // Act
    ErrorInjectingPublisher::new(from_iter(vec!["a"]), 0).subscribe(subscriber.boxed())?;

    // Assert
    assert!(subscriber.items().is_empty());
    assert!(matches!(subscriber.error(), Some(BackfluxError::Upstream(_))));
    Ok(())
}

#[test]
fn test_error_injection_past_end_completes() -> anyhow::Result<()> {
    // Arrange
    let subscriber = TestSubscriber::unbounded();

    // Act
    ErrorInjectingPublisher::new(from_iter(vec![1, 2]), 5).subscribe(subscriber.boxed())?;

    // Assert
    assert_eq!(subscriber.items(), vec![1, 2]);
    assert!(subscriber.is_completed());
    Ok(())
}
