use crate::asset::BlockHash;
use crate::external::{BlockTrigger, SnapshotFetcher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Latest on-chain snapshot for one venue.
///
/// Follows a finalized-block trigger, refetches the snapshot on every new
/// block and fans successful updates out to subscribed edges. Fetches are
/// single-flight: a newer trigger aborts the in-flight fetch, so observers
/// never receive an out-of-order snapshot. Fetch failures only cost
/// freshness; the cache stays at its last-known-good value.
///
/// Every externally observable mutation happens under one mutex scoped to
/// the cache instance. The lock is never held across a suspension point.
pub struct RemoteStateCache<S> {
    label: String,
    fetcher: Arc<dyn SnapshotFetcher<S>>,
    trigger: BlockTrigger,
    fetch_timeout: Duration,
    inner: Mutex<CacheInner<S>>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

struct CacheInner<S> {
    snapshot: Option<S>,
    /// Bumped on every trigger; a fetch only publishes if its generation is
    /// still current, which makes most-recent-wins explicit.
    generation: u64,
    inflight: Option<JoinHandle<()>>,
    subscribers: Vec<SubscriberSlot<S>>,
    next_subscriber_id: u64,
}

struct SubscriberSlot<S> {
    id: u64,
    sender: mpsc::UnboundedSender<S>,
}

/// Keeps a subscription alive; dropping it unsubscribes the observer.
pub struct Subscription {
    id: u64,
    unsubscribe: Box<dyn Fn(u64) + Send + Sync>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        (self.unsubscribe)(self.id);
    }
}

fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicked holder cannot leave a half-applied update here: both the
    // snapshot swap and subscriber edits are single assignments.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: Clone + Send + Sync + 'static> RemoteStateCache<S> {
    pub fn new(
        label: impl Into<String>,
        fetcher: Arc<dyn SnapshotFetcher<S>>,
        trigger: BlockTrigger,
        fetch_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            fetcher,
            trigger,
            fetch_timeout,
            inner: Mutex::new(CacheInner {
                snapshot: None,
                generation: 0,
                inflight: None,
                subscribers: Vec::new(),
                next_subscriber_id: 0,
            }),
            driver: Mutex::new(None),
        })
    }

    /// Begin following the block trigger. Calling this while already active
    /// is a no-op.
    pub fn start(self: &Arc<Self>) {
        let mut driver = lock_recovering(&self.driver);
        if driver.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let mut receiver = self.trigger.subscribe();
        let label = self.label.clone();
        // Weak, so an abandoned cache is not kept alive by its own driver.
        let cache = Arc::downgrade(self);
        *driver = Some(tokio::spawn(async move {
            debug!(cache = %label, "state cache started");
            loop {
                match receiver.recv().await {
                    Ok(block) => {
                        let Some(cache) = cache.upgrade() else { break };
                        cache.refresh(block);
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // Only the latest block matters; skipping straight to
                        // it is the same as superseding the missed fetches.
                        debug!(cache = %label, missed, "trigger lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!(cache = %label, "state cache driver exited");
        }));
    }

    /// Stop following the trigger and cancel any in-flight fetch. The last
    /// known snapshot is retained. Safe to call repeatedly.
    pub fn stop(&self) {
        if let Some(handle) = lock_recovering(&self.driver).take() {
            handle.abort();
        }
        if let Some(inflight) = lock_recovering(&self.inner).inflight.take() {
            inflight.abort();
        }
    }

    /// Register an observer for the latest snapshot and every future change.
    /// With `deliver_current`, the current value (if any) is queued into the
    /// returned channel before this call returns.
    pub fn subscribe(
        self: &Arc<Self>,
        deliver_current: bool,
    ) -> (Subscription, mpsc::UnboundedReceiver<S>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let id = {
            let mut inner = lock_recovering(&self.inner);
            let id = inner.next_subscriber_id;
            inner.next_subscriber_id += 1;

            if deliver_current {
                if let Some(snapshot) = inner.snapshot.clone() {
                    let _ = sender.send(snapshot);
                }
            }

            inner.subscribers.push(SubscriberSlot { id, sender });
            id
        };

        let cache = Arc::clone(self);
        let subscription = Subscription {
            id,
            unsubscribe: Box::new(move |id| {
                let mut inner = lock_recovering(&cache.inner);
                inner.subscribers.retain(|slot| slot.id != id);
            }),
        };

        (subscription, receiver)
    }

    /// Last known snapshot, or `None` when nothing was fetched yet.
    pub fn current_snapshot(&self) -> Option<S> {
        lock_recovering(&self.inner).snapshot.clone()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Kick off a fetch for the given block, superseding any fetch still in
    /// flight.
    fn refresh(self: &Arc<Self>, block: BlockHash) {
        let generation = {
            let mut inner = lock_recovering(&self.inner);
            if let Some(stale) = inner.inflight.take() {
                stale.abort();
            }
            inner.generation += 1;
            inner.generation
        };

        debug!(cache = %self.label, ?block, generation, "refreshing snapshot");

        let cache = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let fetched =
                tokio::time::timeout(cache.fetch_timeout, cache.fetcher.fetch()).await;
            match fetched {
                Ok(Ok(snapshot)) => cache.publish(generation, snapshot),
                Ok(Err(error)) => {
                    warn!(cache = %cache.label, %error, "snapshot fetch failed, keeping last known state");
                }
                Err(_) => {
                    warn!(cache = %cache.label, "snapshot fetch timed out, keeping last known state");
                }
            }
        });

        let mut inner = lock_recovering(&self.inner);
        // The fetch may have already finished; storing a finished handle is
        // harmless, aborting it later is a no-op.
        if inner.generation == generation {
            inner.inflight = Some(handle);
        } else {
            handle.abort();
        }
    }

    fn publish(&self, generation: u64, snapshot: S) {
        let mut inner = lock_recovering(&self.inner);
        if inner.generation != generation {
            // Superseded by a newer trigger while the fetch ran.
            debug!(cache = %self.label, generation, "discarding superseded snapshot");
            return;
        }

        inner.snapshot = Some(snapshot.clone());
        inner.inflight = None;
        inner.subscribers.retain(|slot| slot.sender.send(snapshot.clone()).is_ok());
    }
}

#[cfg(test)]
impl<S: Clone + Send + Sync + 'static> RemoteStateCache<S> {
    /// Seed the snapshot directly, bypassing the trigger/fetch path.
    pub(crate) fn inject_snapshot(&self, snapshot: S) {
        let mut inner = lock_recovering(&self.inner);
        inner.snapshot = Some(snapshot.clone());
        inner.subscribers.retain(|slot| slot.sender.send(snapshot.clone()).is_ok());
    }
}

impl<S> Drop for RemoteStateCache<S> {
    fn drop(&mut self) {
        if let Some(handle) = lock_recovering(&self.driver).take() {
            handle.abort();
        }
        if let Some(inflight) = lock_recovering(&self.inner).inflight.take() {
            inflight.abort();
        }
    }
}
