//! Keyed debouncing on tokio timers.
//!
//! Each key holds at most one pending timer. Scheduling again for the same key
//! aborts the previous timer, so only the last call in a burst fires. Once a
//! timer fires, its callback runs as a detached task; later calls do not
//! cancel it.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

struct Pending {
    generation: u64,
    timer: JoinHandle<()>,
}

struct Slots<K> {
    next_generation: u64,
    pending: HashMap<K, Pending>,
}

pub struct Debouncer<K> {
    slots: Arc<Mutex<Slots<K>>>,
}

fn lock<K>(slots: &Mutex<Slots<K>>) -> MutexGuard<'_, Slots<K>> {
    // A panicking callback never holds this lock, so the data is intact.
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + std::fmt::Debug + 'static,
{
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots {
                next_generation: 0,
                pending: HashMap::new(),
            })),
        }
    }

    /// Run `f` after `delay` unless `key` is scheduled again or cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, key: K, delay: Duration, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slots = lock(&self.slots);
        slots.next_generation += 1;
        let generation = slots.next_generation;

        let shared = Arc::clone(&self.slots);
        let timer_key = key.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut slots = lock(&shared);
                // A newer schedule may have replaced us after the sleep woke.
                match slots.pending.get(&timer_key) {
                    Some(p) if p.generation == generation => {
                        slots.pending.remove(&timer_key);
                    }
                    _ => return,
                }
            }

            debug!("Debounce timer fired for {:?}", timer_key);
            tokio::spawn(f());
        });

        if let Some(previous) = slots.pending.insert(key, Pending { generation, timer }) {
            previous.timer.abort();
        }
    }

    /// Drop the pending timer for `key`. Returns whether one was pending.
    pub fn cancel(&self, key: &K) -> bool {
        match lock(&self.slots).pending.remove(key) {
            Some(p) => {
                p.timer.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for (_, p) in lock(&self.slots).pending.drain() {
            p.timer.abort();
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        lock(&self.slots).pending.contains_key(key)
    }
}

impl<K> Default for Debouncer<K>
where
    K: Eq + Hash + Clone + Send + std::fmt::Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        for (_, p) in lock(&self.slots).pending.drain() {
            p.timer.abort();
        }
    }
}
