// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{BackfluxError, Publisher, Subscriber, SubscriptionRef};
use backflux_publisher::{empty, from_iter, from_iterator, from_option, just};
use backflux_test_utils::{TestSubscriber, Verifier};
use parking_lot::Mutex;
use std::sync::Arc;

/// Requests one more item from inside every `on_next`.
struct OneByOne {
    subscription: Option<SubscriptionRef>,
    seen: Arc<Mutex<Vec<i32>>>,
    depth: usize,
    max_depth: Arc<Mutex<usize>>,
    completed: Arc<Mutex<bool>>,
}

impl Subscriber<i32> for OneByOne {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.subscription = Some(subscription.clone());
        let _ = subscription.request(1);
    }

    fn on_next(&mut self, item: i32) {
        self.depth += 1;
        {
            let mut max_depth = self.max_depth.lock();
            *max_depth = (*max_depth).max(self.depth);
        }
        self.seen.lock().push(item);
        if let Some(subscription) = &self.subscription {
            let _ = subscription.request(1);
        }
        self.depth -= 1;
    }

    fn on_error(&mut self, _: BackfluxError) {}

    fn on_complete(&mut self) {
        *self.completed.lock() = true;
    }
}

#[test]
fn test_empty_completes_without_items() -> anyhow::Result<()> {
    Verifier::create(empty::<String>()).verify_complete()?;
    Ok(())
}

#[test]
fn test_empty_completes_on_first_request() -> anyhow::Result<()> {
    // Arrange
    let subscriber = TestSubscriber::<i32>::without_demand();
    empty().subscribe(subscriber.boxed())?;
    assert!(!subscriber.is_terminated());

    // Act
    subscriber.request(1)?;

    // Assert
    assert!(subscriber.is_completed());
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
fn test_just_completes_with_last_item_without_extra_request() -> anyhow::Result<()> {
    // Arrange
    let subscriber = TestSubscriber::with_demand(2);

    // Act
    just(["foo", "bar"]).subscribe(subscriber.boxed())?;

    // Assert
    assert_eq!(subscriber.items(), vec!["foo", "bar"]);
    assert!(subscriber.is_completed());
    Ok(())
}

#[test]
fn test_from_iter_respects_demand() -> anyhow::Result<()> {
    // Arrange
    let subscriber = TestSubscriber::with_demand(2);

    // Act
    from_iter(vec![1, 2, 3, 4, 5]).subscribe(subscriber.boxed())?;

    // Assert
    assert_eq!(subscriber.items(), vec![1, 2]);
    assert!(!subscriber.is_terminated());

    subscriber.request(10)?;
    assert_eq!(subscriber.items(), vec![1, 2, 3, 4, 5]);
    assert!(subscriber.is_completed());
    Ok(())
}

#[test]
fn test_from_iter_is_cold() -> anyhow::Result<()> {
    // Arrange
    let source = from_iter(vec!["a", "b"]);
    let first = TestSubscriber::unbounded();
    let second = TestSubscriber::unbounded();

    // Act
    source.subscribe(first.boxed())?;
    source.subscribe(second.boxed())?;

    // Assert
    assert_eq!(first.items(), vec!["a", "b"]);
    assert_eq!(second.items(), vec!["a", "b"]);
    Ok(())
}

#[test]
fn test_from_iter_zero_request_is_invalid_demand() -> anyhow::Result<()> {
    // Arrange
    let subscriber = TestSubscriber::without_demand();
    from_iter(vec![1]).subscribe(subscriber.boxed())?;

    // Act
    let result = subscriber.request(0);

    // Assert
    assert_eq!(result, Err(BackfluxError::invalid_demand(0)));
    assert!(!subscriber.is_terminated());
    Ok(())
}

#[test]
fn test_from_iter_cancel_stops_emission() -> anyhow::Result<()> {
    // Arrange
    let subscriber = TestSubscriber::with_demand(2);
    from_iter(0..1_000).subscribe(subscriber.boxed())?;

    // Act
    subscriber.cancel();
    subscriber.cancel();
    let _ = subscriber.request(5);

    // Assert
    assert_eq!(subscriber.items(), vec![0, 1]);
    assert!(!subscriber.is_terminated());
    Ok(())
}

#[test]
fn test_from_iterator_rejects_second_subscriber() -> anyhow::Result<()> {
    // Arrange
    let source = from_iterator(vec![1, 2, 3].into_iter());
    let first = TestSubscriber::unbounded();
    let second = TestSubscriber::unbounded();

    // Act
    source.subscribe(first.boxed())?;
    let result = source.subscribe(second.boxed());

    // Assert
    assert_eq!(first.items(), vec![1, 2, 3]);
    assert!(first.is_completed());
    assert!(matches!(result, Err(BackfluxError::IllegalState { .. })));
    assert!(!second.is_subscribed());
    Ok(())
}

#[test]
fn test_from_option_some_emits_value() -> anyhow::Result<()> {
    Verifier::create(from_option(Some("skyler")))
        .expect_next(["skyler"])
        .verify_complete()?;
    Ok(())
}

#[test]
fn test_from_option_none_completes_empty() -> anyhow::Result<()> {
    Verifier::create(from_option::<&str>(None)).verify_complete()?;
    Ok(())
}

#[test]
fn test_one_at_a_time_requests_deliver_everything() -> anyhow::Result<()> {
    // Arrange
    let subscriber = TestSubscriber::with_demand(1);
    let source = from_iter(1..=5);

    // Act
    source.subscribe(subscriber.boxed())?;
    while !subscriber.is_terminated() {
        subscriber.request(1)?;
    }

    // Assert
    assert_eq!(subscriber.items(), vec![1, 2, 3, 4, 5]);
    assert_eq!(subscriber.violations(), 0);
    Ok(())
}

#[test]
fn test_reentrant_request_from_on_next_does_not_recurse() -> anyhow::Result<()> {
    // Arrange
    let seen = Arc::new(Mutex::new(Vec::new()));
    let max_depth = Arc::new(Mutex::new(0));
    let completed = Arc::new(Mutex::new(false));
    let subscriber = OneByOne {
        subscription: None,
        seen: seen.clone(),
        depth: 0,
        max_depth: max_depth.clone(),
        completed: completed.clone(),
    };

    // Act
    from_iter(1..=1_000).subscribe(Box::new(subscriber))?;

    // Assert
    assert_eq!(*seen.lock(), (1..=1_000).collect::<Vec<_>>());
    assert_eq!(*max_depth.lock(), 1);
    assert!(*completed.lock());
    Ok(())
}
