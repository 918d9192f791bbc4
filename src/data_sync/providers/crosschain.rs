use crate::asset::AssetRef;
use crate::constants::CROSSCHAIN_TRANSFER_WEIGHT;
use crate::data_sync::providers::ExchangeProvider;
use crate::errors::EnumerationError;
use crate::logic::edge::{CrosschainEdge, CrosschainHost, ExchangeEdge, RouteId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, info};

fn default_enabled() -> bool {
    true
}

/// One configured directed transfer route between two chains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferRoute {
    pub id: u64,
    pub origin: AssetRef,
    pub destination: AssetRef,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Routing cost override; falls back to the standard transfer weight.
    #[serde(default)]
    pub weight: Option<u32>,
}

/// Route table loaded from TOML configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferRouteConfig {
    #[serde(default)]
    pub routes: Vec<TransferRoute>,
}

impl TransferRouteConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, EnumerationError> {
        toml::from_str(raw).map_err(|error| EnumerationError::StateDecode(error.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnumerationError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|error| EnumerationError::Unavailable(error.to_string()))?;
        Self::from_toml_str(&raw)
    }
}

/// Exchange provider over statically configured cross-chain transfer routes.
///
/// Routes come from configuration rather than on-chain discovery; the
/// provider's job is filtering disabled entries and attaching the shared
/// execution collaborators to each emitted edge.
pub struct CrosschainExchangeProvider {
    name: String,
    host: Arc<CrosschainHost>,
    routes: RwLock<Vec<TransferRoute>>,
    update: Mutex<Option<mpsc::UnboundedSender<()>>>,
}

impl CrosschainExchangeProvider {
    pub fn new(name: impl Into<String>, host: Arc<CrosschainHost>, config: TransferRouteConfig) -> Self {
        let name = name.into();
        info!(provider = %name, routes = config.routes.len(), "loaded transfer routes");
        Self { name, host, routes: RwLock::new(config.routes), update: Mutex::new(None) }
    }

    /// Wire the aggregator's update channel so route toggles schedule a
    /// graph rebuild.
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

    /// Toggle a route without reloading configuration. Returns false when the
    /// id is unknown.
    pub fn set_route_enabled(&self, id: u64, enabled: bool) -> bool {
        let Ok(mut routes) = self.routes.write() else {
            return false;
        };
        match routes.iter_mut().find(|route| route.id == id) {
            Some(route) => {
                route.enabled = enabled;
                drop(routes);
                info!(provider = %self.name, route = id, enabled, "route toggled");
                self.notify_update();
                true
            }
            None => false,
        }
    }

    pub fn route_count(&self) -> usize {
        self.routes.read().map(|routes| routes.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ExchangeProvider for CrosschainExchangeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn available_direct_swap_connections(
        &self,
    ) -> Result<Vec<ExchangeEdge>, EnumerationError> {
        let routes = self
            .routes
            .read()
            .map_err(|_| EnumerationError::Unavailable("route table lock poisoned".into()))?;

        let edges: Vec<ExchangeEdge> = routes
            .iter()
            .filter(|route| route.enabled)
            .map(|route| {
                ExchangeEdge::Crosschain(CrosschainEdge::new(
                    RouteId(route.id),
                    route.origin.clone(),
                    route.destination.clone(),
                    route.weight.unwrap_or(CROSSCHAIN_TRANSFER_WEIGHT),
                    Arc::clone(&self.host),
                ))
            })
            .collect();

        debug!(provider = %self.name, edges = edges.len(), "enumerated transfer routes");
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::edge::fixtures::crosschain_host;

    const ROUTES_TOML: &str = r#"
        [[routes]]
        id = 1
        origin = { chain = "polkadot", asset = 0 }
        destination = { chain = "hydration", asset = 0 }

        [[routes]]
        id = 2
        origin = { chain = "hydration", asset = 0 }
        destination = { chain = "polkadot", asset = 0 }
        enabled = false
        weight = 9
    "#;

    #[test]
    fn test_parse_route_config() {
        let config = TransferRouteConfig::from_toml_str(ROUTES_TOML).unwrap();
        assert_eq!(config.routes.len(), 2);
        assert!(matches!(
            TransferRouteConfig::from_toml_str("routes = 1"),
            Err(EnumerationError::StateDecode(_))
        ));
        assert!(config.routes[0].enabled);
        assert_eq!(config.routes[0].weight, None);
        assert!(!config.routes[1].enabled);
        assert_eq!(config.routes[1].weight, Some(9));
    }

    #[tokio::test]
    async fn test_enumeration_skips_disabled_routes() {
        let config = TransferRouteConfig::from_toml_str(ROUTES_TOML).unwrap();
        let provider = CrosschainExchangeProvider::new("xcm", crosschain_host(0, true), config);

        let edges = provider.available_direct_swap_connections().await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].origin(), &AssetRef::new("polkadot", 0));
        assert_eq!(edges[0].weight(), CROSSCHAIN_TRANSFER_WEIGHT);
    }

    #[tokio::test]
    async fn test_toggle_route() {
        let config = TransferRouteConfig::from_toml_str(ROUTES_TOML).unwrap();
        let provider = CrosschainExchangeProvider::new("xcm", crosschain_host(0, true), config);

        assert!(provider.set_route_enabled(2, true));
        let edges = provider.available_direct_swap_connections().await.unwrap();
        assert_eq!(edges.len(), 2);

        let reopened = edges.iter().find(|edge| edge.venue_key().1 == 2).unwrap();
        assert_eq!(reopened.weight(), 9);

        assert!(!provider.set_route_enabled(99, true));
    }

    #[tokio::test]
    async fn test_toggle_pokes_update_channel() {
        let config = TransferRouteConfig::from_toml_str(ROUTES_TOML).unwrap();
        let provider = CrosschainExchangeProvider::new("xcm", crosschain_host(0, true), config);

        let (sender, mut receiver) = mpsc::unbounded_channel();
        provider.set_update_notifier(sender);

        assert!(provider.set_route_enabled(1, false));
        assert!(receiver.try_recv().is_ok());

        // An unknown id changes nothing and must not schedule a rebuild.
        assert!(!provider.set_route_enabled(99, false));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_toggle_propagates_to_merged_graph() {
        use crate::logic::graph::GraphAggregator;

        let config = TransferRouteConfig::from_toml_str(ROUTES_TOML).unwrap();
        let provider =
            Arc::new(CrosschainExchangeProvider::new("xcm", crosschain_host(0, true), config));

        let aggregator =
            GraphAggregator::new(vec![provider.clone() as Arc<dyn ExchangeProvider>]);
        provider.set_update_notifier(aggregator.update_handle());
        aggregator.start();

        aggregator.rebuild().await;
        assert_eq!(aggregator.current_graph().edge_count(), 1);

        let mut changes = aggregator.subscribe_changes();
        provider.set_route_enabled(1, false);
        changes.changed().await.unwrap();
        assert_eq!(aggregator.current_graph().edge_count(), 0);

        aggregator.stop();
    }
}
