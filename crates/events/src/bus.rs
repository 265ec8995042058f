//! Change-feed publishing/subscription abstraction (mechanics only).
//!
//! A feed distributes messages to every subscriber (broadcast semantics). The
//! store publishes one message per committed write; consumers keep in-memory
//! views current without explicit reads.
//!
//! Delivery is best-effort and eventually consistent. Feeds carry full
//! snapshots rather than diffs, so a consumer that misses a message catches up
//! on the next one.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to a change feed.
///
/// Each subscription receives a copy of every message published after it was
/// created. Designed for single-threaded consumption.
///
/// ```ignore
/// let sub = feed.subscribe();
/// loop {
///     match sub.recv_timeout(Duration::from_secs(1)) {
///         Ok(snapshot) => view.replace(snapshot),
///         Err(RecvTimeoutError::Timeout) => continue,
///         Err(RecvTimeoutError::Disconnected) => break,
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently queued and return only the newest message.
    ///
    /// Snapshot consumers only care about the latest state.
    pub fn latest(&self) -> Option<M> {
        let mut last = None;
        while let Ok(msg) = self.receiver.try_recv() {
            last = Some(msg);
        }
        last
    }
}

/// Transport-agnostic change feed (pub/sub).
///
/// `publish` may fail (e.g. internal lock poisoning); the caller decides
/// whether that matters. The write the message describes is already durable.
pub trait ChangeFeed<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, F> ChangeFeed<M> for Arc<F>
where
    F: ChangeFeed<M> + ?Sized,
{
    type Error = F::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
