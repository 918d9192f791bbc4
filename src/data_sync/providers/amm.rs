use crate::asset::AssetRef;
use crate::constants::AMM_SWAP_WEIGHT;
use crate::data_sync::providers::ExchangeProvider;
use crate::data_sync::state_cache::RemoteStateCache;
use crate::errors::EnumerationError;
use crate::external::{BlockTrigger, SnapshotFetcher};
use crate::logic::edge::{AmmEdge, AmmHost, ExchangeEdge, PoolId, PoolReserves};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Static definition of one two-sided AMM pool on the provider's chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolDefinition {
    pub id: PoolId,
    pub asset_a: AssetRef,
    pub asset_b: AssetRef,
}

struct PoolEntry {
    definition: PoolDefinition,
    cache: Arc<RemoteStateCache<PoolReserves>>,
}

/// Exchange provider over the AMM pools of a single chain.
///
/// Each registered pool owns a remote state cache keyed to the chain's block
/// trigger; enumeration emits two directed edges per pool, both sharing that
/// cache so their quotes always read the same reserve snapshot.
pub struct AmmExchangeProvider {
    name: String,
    host: Arc<AmmHost>,
    trigger: BlockTrigger,
    fetch_timeout: Duration,
    pools: DashMap<PoolId, PoolEntry>,
    update: Mutex<Option<mpsc::UnboundedSender<()>>>,
}

impl AmmExchangeProvider {
    pub fn new(
        name: impl Into<String>,
        host: Arc<AmmHost>,
        trigger: BlockTrigger,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            host,
            trigger,
            fetch_timeout,
            pools: DashMap::new(),
            update: Mutex::new(None),
        }
    }

    /// Wire the aggregator's update channel so pool churn schedules a graph
    /// rebuild.
    pub fn set_update_notifier(&self, sender: mpsc::UnboundedSender<()>) {
        if let Ok(mut update) = self.update.lock() {
            *update = Some(sender);
        }
    }

    fn notify_update(&self) {
        if let Ok(update) = self.update.lock() {
            if let Some(sender) = update.as_ref() {
                let _ = sender.send(());
            }
        }
    }

    /// Register a pool and start syncing its reserves. Both pool assets must
    /// live on the provider's chain.
    pub fn register_pool(
        &self,
        definition: PoolDefinition,
        fetcher: Arc<dyn SnapshotFetcher<PoolReserves>>,
    ) -> Result<(), EnumerationError> {
        for asset in [&definition.asset_a, &definition.asset_b] {
            if asset.chain != self.host.chain {
                return Err(EnumerationError::Unavailable(format!(
                    "pool {:?} references {} outside chain {}",
                    definition.id, asset, self.host.chain
                )));
            }
        }

        let cache = RemoteStateCache::new(
            format!("{}/pool-{}", self.name, definition.id.0),
            fetcher,
            self.trigger.clone(),
            self.fetch_timeout,
        );
        cache.start();

        info!(provider = %self.name, pool = definition.id.0, "registered AMM pool");
        self.pools.insert(definition.id, PoolEntry { definition, cache });
        self.notify_update();
        Ok(())
    }

    /// Remove a pool, stopping its state sync. Unknown ids are a no-op.
    pub fn retire_pool(&self, id: PoolId) {
        if let Some((_, entry)) = self.pools.remove(&id) {
            entry.cache.stop();
            info!(provider = %self.name, pool = id.0, "retired AMM pool");
            self.notify_update();
        }
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    #[cfg(test)]
    pub(crate) fn inject_reserves(
        &self,
        id: PoolId,
        reserve_a: crate::asset::Balance,
        reserve_b: crate::asset::Balance,
    ) {
        if let Some(entry) = self.pools.get(&id) {
            entry.cache.inject_snapshot(PoolReserves { reserve_a, reserve_b });
        }
    }
}

#[async_trait]
impl ExchangeProvider for AmmExchangeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn available_direct_swap_connections(
        &self,
    ) -> Result<Vec<ExchangeEdge>, EnumerationError> {
        let mut edges = Vec::with_capacity(self.pools.len() * 2);

        for entry in self.pools.iter() {
            let PoolEntry { definition, cache } = entry.value();

            edges.push(ExchangeEdge::Amm(AmmEdge::new(
                definition.id,
                definition.asset_a.clone(),
                definition.asset_b.clone(),
                AMM_SWAP_WEIGHT,
                false,
                Arc::clone(cache),
                Arc::clone(&self.host),
            )));
            edges.push(ExchangeEdge::Amm(AmmEdge::new(
                definition.id,
                definition.asset_b.clone(),
                definition.asset_a.clone(),
                AMM_SWAP_WEIGHT,
                true,
                Arc::clone(cache),
                Arc::clone(&self.host),
            )));
        }

        debug!(provider = %self.name, edges = edges.len(), "enumerated AMM connections");
        Ok(edges)
    }
}
