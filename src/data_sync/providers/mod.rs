pub mod amm;
pub mod crosschain;

pub use amm::{AmmExchangeProvider, PoolDefinition};
pub use crosschain::{CrosschainExchangeProvider, TransferRoute, TransferRouteConfig};

use crate::errors::EnumerationError;
use crate::logic::edge::ExchangeEdge;
use async_trait::async_trait;

/// One venue family's contribution to the routing graph.
///
/// Providers own the venue-specific state and enumerate the directed edges
/// currently on offer; the aggregator merges the enumerations of every
/// registered provider into a single graph.
#[async_trait]
pub trait ExchangeProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Enumerate every directed single-hop connection the venue currently
    /// offers. An empty list is a valid answer; an error marks the whole
    /// provider unavailable for this rebuild.
    async fn available_direct_swap_connections(&self)
    -> Result<Vec<ExchangeEdge>, EnumerationError>;
}
