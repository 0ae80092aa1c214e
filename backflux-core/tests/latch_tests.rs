// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::Latch;
use futures::executor::block_on;
use std::thread;
use std::time::Duration;

#[test]
fn test_latch_wait_timeout_expires_when_closed() {
    // Arrange
    let latch = Latch::new();

    // Act
    let opened = latch.wait_timeout(Duration::from_millis(10));

    // Assert
    assert!(!opened);
    assert!(!latch.is_open());
}

#[test]
fn test_latch_open_is_sticky() {
    // Arrange
    let latch = Latch::new();

    // Act
    latch.open();
    latch.open();

    // Assert
    assert!(latch.is_open());
    assert!(latch.wait_timeout(Duration::ZERO));
    block_on(latch.wait());
}

#[test]
fn test_latch_wakes_blocked_threads() {
    // Arrange
    let latch = Latch::new();

    // Act / Assert
    thread::scope(|scope| {
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let latch = latch.clone();
                scope.spawn(move || latch.wait_timeout(Duration::from_secs(5)))
            })
            .collect();
        thread::sleep(Duration::from_millis(10));
        latch.open();
        for waiter in waiters {
            assert_eq!(waiter.join().ok(), Some(true));
        }
    });
}

#[test]
fn test_latch_async_wait_from_other_thread() {
    // Arrange
    let latch = Latch::new();
    let opener = latch.clone();

    // Act
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        opener.open();
    });
    block_on(latch.wait());

    // Assert
    assert!(latch.is_open());
    assert!(handle.join().is_ok());
}

#[tokio::test]
async fn test_latch_wait_on_tokio() -> anyhow::Result<()> {
    // Arrange
    let latch = Latch::new();
    let opener = latch.clone();

    // Act
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        opener.open();
    });

    // Assert
    tokio::time::timeout(Duration::from_secs(1), latch.wait()).await?;
    Ok(())
}

#[test]
fn test_latch_wait_with_unbounded_timeout() {
    // Arrange
    let latch = Latch::new();
    let opener = latch.clone();

    // Act
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        opener.open();
    });
    let opened = latch.wait_timeout(Duration::MAX);

    // Assert
    assert!(opened);
    assert!(latch.wait_timeout(Duration::MAX));
    assert!(handle.join().is_ok());
}
