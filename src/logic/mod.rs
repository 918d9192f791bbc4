//! Routing Logic Layer
//!
//! Pure routing over the merged exchange graph: edge quoting, path
//! enumeration and best-route selection. Nothing in this layer touches the
//! network; all state comes from the data synchronization layer's caches.

pub mod edge;
pub mod graph;
pub mod pathfinder;
pub mod types;

pub use edge::{
    AmmEdge, AmmHost, CrosschainEdge, CrosschainHost, ExchangeEdge, PoolId, PoolReserves, RouteId,
    VenueKind,
};
pub use graph::{ExchangeGraph, ExchangePath, GraphAggregator, PathHash, QuotedPath};
pub use pathfinder::PathFinder;
pub use types::{ExecutionArgs, Quote, SwapDirection, SwapLimit};
