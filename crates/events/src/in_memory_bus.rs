//! In-memory change feed for tests/dev.

use std::sync::{Mutex, mpsc};

use crate::bus::{ChangeFeed, Subscription};

#[derive(Debug)]
pub enum InMemoryFeedError {
    /// Publish failed due to internal lock poisoning.
    Poisoned,
}

/// In-memory fan-out feed.
///
/// No IO, no async. Subscribers whose receiving end was dropped are pruned on
/// the next publish.
#[derive(Debug)]
pub struct InMemoryChangeFeed<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryChangeFeed<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscribers (as of the last publish).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryChangeFeed<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> ChangeFeed<M> for InMemoryChangeFeed<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryFeedError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self.subscribers.lock().map_err(|_| InMemoryFeedError::Poisoned)?;
        subs.retain(|tx| tx.send(message.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // A poisoned lock still yields a subscription; it just never fires.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}
