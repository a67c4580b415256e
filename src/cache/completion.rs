//! Completion Module
//!
//! Future handed back by every cache operation.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

// == Completion ==
/// Resolves once the asynchronous part of a cache operation has finished.
///
/// The synchronous part (memory tier access) has already happened by the
/// time a `Completion` is returned, so dropping it without awaiting only
/// discards the result. A completion always resolves exactly once; if the
/// disk worker went away it resolves to the degraded outcome it was built
/// with.
#[derive(Debug)]
pub struct Completion<T> {
    state: State<T>,
}

#[derive(Debug)]
enum State<T> {
    Ready(Option<T>),
    Waiting {
        rx: oneshot::Receiver<T>,
        fallback: Option<T>,
    },
}

// No field is structurally pinned.
impl<T> Unpin for Completion<T> {}

impl<T> Completion<T> {
    /// A completion that resolves immediately.
    pub(crate) fn ready(value: T) -> Self {
        Self {
            state: State::Ready(Some(value)),
        }
    }

    /// A completion fed by the disk worker. `fallback` is yielded if the
    /// sender is dropped without sending.
    pub(crate) fn channel(fallback: T) -> (oneshot::Sender<T>, Self) {
        let (tx, rx) = oneshot::channel();
        let completion = Self {
            state: State::Waiting {
                rx,
                fallback: Some(fallback),
            },
        };
        (tx, completion)
    }

    /// Whether the result is available without waiting.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }
}

impl<T> Future for Completion<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = self.get_mut();
        match &mut this.state {
            State::Ready(value) => {
                Poll::Ready(value.take().expect("Completion polled after it resolved"))
            }
            State::Waiting { rx, fallback } => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(value)) => Poll::Ready(value),
                Poll::Ready(Err(_)) => Poll::Ready(
                    fallback
                        .take()
                        .expect("Completion polled after it resolved"),
                ),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}
