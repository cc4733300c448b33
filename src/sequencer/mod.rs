use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::debug;

/// Sequence number minted per issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryToken(u64);

impl QueryToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    Applied,
    /// A newer request was issued (or the sequencer was reset); result dropped.
    Superseded,
}

/// Applies results to visible state only when they answer the latest request.
///
/// Visible state is published through a `watch` channel, so observers always
/// see a whole value.
pub struct RequestSequencer<T> {
    latest: Mutex<u64>,
    visible: watch::Sender<T>,
}

impl<T> RequestSequencer<T>
where
    T: Default + Send + Sync,
{
    pub fn new() -> Self {
        let (visible, _) = watch::channel(T::default());
        Self {
            latest: Mutex::new(0),
            visible,
        }
    }

    fn latest(&self) -> MutexGuard<'_, u64> {
        self.latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn issue(&self) -> QueryToken {
        let mut latest = self.latest();
        *latest += 1;
        QueryToken(*latest)
    }

    pub fn accept(&self, token: QueryToken, result: T) -> Acceptance {
        // Held across the publish so a concurrent issue() cannot interleave.
        let latest = self.latest();
        if token.0 != *latest {
            debug!("Discarding superseded result for token {} (latest {})", token.0, *latest);
            return Acceptance::Superseded;
        }
        self.visible.send_replace(result);
        Acceptance::Applied
    }

    /// Clear visible state now and invalidate every in-flight token.
    pub fn reset(&self) {
        let mut latest = self.latest();
        *latest += 1;
        self.visible.send_replace(T::default());
    }

    pub fn is_latest(&self, token: QueryToken) -> bool {
        token.0 == *self.latest()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.visible.subscribe()
    }
}

impl<T: Clone> RequestSequencer<T> {
    pub fn current(&self) -> T {
        self.visible.borrow().clone()
    }
}

impl<T> Default for RequestSequencer<T>
where
    T: Default + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
