// Three-Layer Architecture
pub mod data_sync;  // Data Layer: Remote state caches, exchange providers
pub mod logic;      // Logic Layer: Exchange graph, path finding, quoting
pub mod execution;  // Execution Layer: Atomic operations, route execution

// Common types and external collaborator interfaces
pub mod asset;
pub mod constants;
pub mod errors;
pub mod external;

// Re-export key components from each layer
pub use asset::{AccountId, AssetRef, Balance, BlockHash, ChainId};
pub use data_sync::{
    AmmExchangeProvider, CrosschainExchangeProvider, EngineConfig, ExchangeProvider,
    PoolDefinition, RemoteStateCache, Subscription, TransferRoute, TransferRouteConfig,
};
pub use errors::{EnumerationError, ExecutionError, PathError, QuoteError};
pub use execution::{
    AmmLeg, AmmOperation, AtomicOperation, CrosschainOperation, ExecutionManager, OperationFee,
    build_operations,
};
pub use external::{BlockTrigger, CallData, ResolvedTransfer};
pub use logic::{
    AmmEdge, AmmHost, CrosschainEdge, CrosschainHost, ExchangeEdge, ExchangeGraph, ExchangePath,
    ExecutionArgs, GraphAggregator, PathFinder, PathHash, PoolId, PoolReserves, Quote, QuotedPath,
    RouteId, SwapDirection, SwapLimit, VenueKind,
};
