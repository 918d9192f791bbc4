use crate::data_sync::providers::ExchangeProvider;
use crate::logic::graph::exchange_graph::ExchangeGraph;
use futures::future::join_all;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

fn read_recovering<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_recovering<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Merges every provider's edge enumeration into one exchange graph.
///
/// The merged graph is held behind an `Arc` swapped atomically on rebuild:
/// readers either see the previous complete graph or the next one. A rebuild
/// that loses any provider keeps the previous graph rather than publishing a
/// partial merge.
pub struct GraphAggregator {
    providers: Vec<Arc<dyn ExchangeProvider>>,
    graph: RwLock<Arc<ExchangeGraph>>,
    generation: watch::Sender<u64>,
    update_sender: mpsc::UnboundedSender<()>,
    update_receiver: Mutex<Option<mpsc::UnboundedReceiver<()>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl GraphAggregator {
    pub fn new(providers: Vec<Arc<dyn ExchangeProvider>>) -> Arc<Self> {
        let (update_sender, update_receiver) = mpsc::unbounded_channel();
        let (generation, _) = watch::channel(0);

        Arc::new(Self {
            providers,
            graph: RwLock::new(Arc::new(ExchangeGraph::new())),
            generation,
            update_sender,
            update_receiver: Mutex::new(Some(update_receiver)),
            task: Mutex::new(None),
        })
    }

    /// Channel providers poke to schedule a rebuild.
    pub fn update_handle(&self) -> mpsc::UnboundedSender<()> {
        self.update_sender.clone()
    }

    /// Current merged graph. Non-blocking and always complete; never a
    /// half-merged intermediate.
    pub fn current_graph(&self) -> Arc<ExchangeGraph> {
        Arc::clone(&read_recovering(&self.graph))
    }

    /// Watch the rebuild generation to learn when the graph changed.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Start draining the update channel, rebuilding once per pending batch
    /// of pokes. Idempotent.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let Some(mut receiver) =
            self.update_receiver.lock().unwrap_or_else(PoisonError::into_inner).take()
        else {
            return;
        };

        // Weak, so an abandoned aggregator is not kept alive by its own task.
        let aggregator = Arc::downgrade(self);
        *task = Some(tokio::spawn(async move {
            while receiver.recv().await.is_some() {
                // Collapse a burst of pokes into one rebuild.
                while receiver.try_recv().is_ok() {}
                let Some(aggregator) = aggregator.upgrade() else { break };
                aggregator.rebuild().await;
            }
        }));
    }

    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }

    /// Re-enumerate every provider and swap in the merged result. All
    /// providers must answer; any failure keeps the previous graph.
    pub async fn rebuild(&self) {
        let enumerations =
            join_all(self.providers.iter().map(|p| p.available_direct_swap_connections())).await;

        let mut edges = Vec::new();
        for (provider, result) in self.providers.iter().zip(enumerations) {
            match result {
                Ok(mut provided) => {
                    debug!(provider = provider.name(), edges = provided.len(), "provider enumerated");
                    edges.append(&mut provided);
                }
                Err(error) => {
                    warn!(provider = provider.name(), %error, "enumeration failed, keeping previous graph");
                    return;
                }
            }
        }

        let graph = Arc::new(ExchangeGraph::from_edges(edges));
        info!(assets = graph.asset_count(), edges = graph.edge_count(), "exchange graph rebuilt");

        *write_recovering(&self.graph) = graph;
        self.generation.send_modify(|generation| *generation += 1);
    }
}

impl Drop for GraphAggregator {
    fn drop(&mut self) {
        self.stop();
    }
}
