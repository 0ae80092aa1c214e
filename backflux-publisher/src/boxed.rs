// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{BoxPublisher, Publisher};
use std::sync::Arc;

/// Extension trait for type-erasing a publisher.
///
/// Needed wherever publishers of different concrete types share a
/// collection, as in [`race`](crate::race) and [`zip_all`](crate::zip_all).
pub trait BoxedExt<T>: Publisher<T> + Sized + 'static {
    /// Wraps `self` in a shared [`BoxPublisher`].
    fn boxed(self) -> BoxPublisher<T> {
        Arc::new(self)
    }
}

impl<P, T> BoxedExt<T> for P where P: Publisher<T> + 'static {}
