pub mod aggregator;
pub mod exchange_graph;
pub mod path;

pub use aggregator::GraphAggregator;
pub use exchange_graph::{ExchangeGraph, FastHashMap, FastHasher};
pub use path::{ExchangePath, PathHash, QuotedPath};
