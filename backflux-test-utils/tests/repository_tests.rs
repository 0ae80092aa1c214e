// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::Publisher;
use backflux_runtime::VirtualTimeScheduler;
use backflux_test_utils::{
    default_users, jesse, marie, mike, skyler, InMemoryRepository, ReactiveRepository,
    TestSubscriber, User, Verifier,
};
use std::time::Duration;

#[test]
fn test_repository_default_users() -> anyhow::Result<()> {
    // Arrange
    let repository = InMemoryRepository::new();

    // Act / Assert
    Verifier::create(repository.find_all())
        .expect_next(default_users())
        .verify_complete()?;
    Verifier::create(repository.find_first())
        .expect_next([skyler()])
        .verify_complete()?;
    Ok(())
}

#[test]
fn test_repository_empty_find_first_completes() -> anyhow::Result<()> {
    // Arrange
    let repository = InMemoryRepository::<User>::of(Vec::new());

    // Act / Assert
    Verifier::create(repository.find_first()).verify_complete()?;
    Ok(())
}

#[test]
fn test_repository_delayed_find_first_waits() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let repository = InMemoryRepository::of(vec![mike()])
        .with_delay(Duration::from_millis(250), scheduler.clone());
    let subscriber = TestSubscriber::unbounded();

    // Act
    repository.find_first().subscribe(subscriber.boxed())?;
    scheduler.advance_by(Duration::from_millis(249));

    // Assert
    assert_eq!(subscriber.item_count(), 0);
    scheduler.advance_by(Duration::from_millis(1));
    assert_eq!(subscriber.items(), vec![mike()]);
    assert!(subscriber.is_completed());
    Ok(())
}

#[test]
fn test_repository_delayed_find_all_spaces_items() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let repository = InMemoryRepository::of(vec![marie(), jesse()])
        .with_delay(Duration::from_millis(100), scheduler.clone());
    let subscriber = TestSubscriber::unbounded();

    // Act
    repository.find_all().subscribe(subscriber.boxed())?;

    // Assert
    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(subscriber.items(), vec![marie()]);
    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(subscriber.items(), vec![marie(), jesse()]);
    assert!(subscriber.is_completed());
    Ok(())
}

#[test]
fn test_user_display() {
    assert_eq!(
        skyler().to_string(),
        "User[username=swhite, firstname=Skyler, lastname=White]"
    );
}
