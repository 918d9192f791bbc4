//! Data Synchronization Layer
//!
//! Keeps the engine's view of every venue current:
//!
//! - Per-venue remote state caches following finalized-block triggers
//! - Exchange providers enumerating the edges each venue family offers
//! - Single-flight fetches so observers never see an out-of-order snapshot

pub mod config;
pub mod providers;
pub mod state_cache;

pub use config::EngineConfig;
pub use providers::{
    AmmExchangeProvider, CrosschainExchangeProvider, ExchangeProvider, PoolDefinition,
    TransferRoute, TransferRouteConfig,
};
pub use state_cache::{RemoteStateCache, Subscription};
