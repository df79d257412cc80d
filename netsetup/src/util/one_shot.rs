//! Single-delivery signal subscriptions.

use futures::stream::{FusedStream, Stream};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Wraps a signal stream so that it yields at most one item.
///
/// The inner stream is dropped as soon as the first item is taken, which
/// removes the underlying match rule. Later signals are never observed.
pub struct OneShot<S> {
    inner: Option<S>,
}

impl<S> OneShot<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: Some(stream),
        }
    }

    /// Whether the subscription is still live.
    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    /// Cancels the subscription without waiting for a delivery.
    pub fn cancel(&mut self) {
        self.inner = None;
    }
}

impl<S: Stream + Unpin> Stream for OneShot<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(stream) = self.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match Pin::new(stream).poll_next(cx) {
            Poll::Ready(item) => {
                self.inner = None;
                Poll::Ready(item)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<S: Stream + Unpin> FusedStream for OneShot<S> {
    fn is_terminated(&self) -> bool {
        self.inner.is_none()
    }
}
