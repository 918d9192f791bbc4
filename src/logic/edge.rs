use crate::asset::{AssetRef, Balance, ChainId};
use crate::data_sync::state_cache::RemoteStateCache;
use crate::errors::{ExecutionError, QuoteError};
use crate::execution::operation::{AmmLeg, AmmOperation, AtomicOperation, CrosschainOperation};
use crate::external::{ChainConnection, SigningProvider, TransferResolver};
use crate::logic::types::{ExecutionArgs, Quote, SwapDirection};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use strum_macros::{Display, EnumString};

/// Venue families the engine can route through.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueKind {
    Amm,
    Crosschain,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(pub u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(pub u64);

/// Reserve pair of an AMM pool, oriented as `(asset_a, asset_b)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserves {
    pub reserve_a: Balance,
    pub reserve_b: Balance,
}

/// Collaborator bundle shared by all AMM edges of one chain.
pub struct AmmHost {
    pub chain: ChainId,
    pub connection: Arc<dyn ChainConnection>,
    pub signing: Arc<dyn SigningProvider>,
}

/// Collaborator bundle shared by all cross-chain edges of one provider.
pub struct CrosschainHost {
    pub resolver: Arc<dyn TransferResolver>,
    pub connection: Arc<dyn ChainConnection>,
    pub signing: Arc<dyn SigningProvider>,
}

/// One directed, single-hop exchange opportunity at one venue.
///
/// A closed enum over the known venue families: routing and composition can
/// match exhaustively instead of dispatching through an open trait object.
#[derive(Clone)]
pub enum ExchangeEdge {
    Amm(AmmEdge),
    Crosschain(CrosschainEdge),
}

/// Directed swap through one AMM pool. Holds a reference to the pool's state
/// cache, never a copy of the reserves, so quotes always run against the
/// freshest snapshot.
#[derive(Clone)]
pub struct AmmEdge {
    pub pool_id: PoolId,
    origin: AssetRef,
    destination: AssetRef,
    weight: u32,
    /// True when the edge runs against the pool orientation (b -> a).
    reversed: bool,
    cache: Arc<RemoteStateCache<PoolReserves>>,
    host: Arc<AmmHost>,
}

/// Directed transfer along one configured cross-chain route.
#[derive(Clone)]
pub struct CrosschainEdge {
    pub route_id: RouteId,
    origin: AssetRef,
    destination: AssetRef,
    weight: u32,
    host: Arc<CrosschainHost>,
}

impl AmmEdge {
    pub fn new(
        pool_id: PoolId,
        origin: AssetRef,
        destination: AssetRef,
        weight: u32,
        reversed: bool,
        cache: Arc<RemoteStateCache<PoolReserves>>,
        host: Arc<AmmHost>,
    ) -> Self {
        Self { pool_id, origin, destination, weight, reversed, cache, host }
    }

    fn oriented_reserves(&self) -> Option<(Balance, Balance)> {
        let reserves = self.cache.current_snapshot()?;
        if self.reversed {
            Some((reserves.reserve_b, reserves.reserve_a))
        } else {
            Some((reserves.reserve_a, reserves.reserve_b))
        }
    }

    /// Reserve-bounded quote. The venue trades one-to-one up to its
    /// liquidity: selling fails once the input exceeds the input-side
    /// reserve, buying fails once the requested output would draw the
    /// output-side reserve below zero.
    fn quote(&self, amount: Balance, direction: SwapDirection) -> Result<Quote, QuoteError> {
        let (reserve_in, reserve_out) =
            self.oriented_reserves().ok_or(QuoteError::MissingSnapshot)?;

        match direction {
            SwapDirection::SellExactIn => {
                if amount > reserve_in {
                    return Err(QuoteError::InsufficientLiquidity {
                        requested: amount,
                        available: reserve_in,
                    });
                }
                if amount > reserve_out {
                    return Err(QuoteError::InsufficientLiquidity {
                        requested: amount,
                        available: reserve_out,
                    });
                }
                Ok(Quote::new(amount, amount, direction))
            }
            SwapDirection::BuyExactOut => {
                if amount > reserve_out {
                    return Err(QuoteError::InsufficientLiquidity {
                        requested: amount,
                        available: reserve_out,
                    });
                }
                Ok(Quote::new(amount, amount, direction))
            }
        }
    }
}

impl CrosschainEdge {
    pub fn new(
        route_id: RouteId,
        origin: AssetRef,
        destination: AssetRef,
        weight: u32,
        host: Arc<CrosschainHost>,
    ) -> Self {
        Self { route_id, origin, destination, weight, host }
    }

    /// Identity quote: a transfer moves the full amount, and its protocol
    /// fee is only resolved at execution time. A composed quote through a
    /// cross-chain leg is therefore optimistic versus actual execution cost.
    fn quote(&self, amount: Balance, direction: SwapDirection) -> Quote {
        Quote::new(amount, amount, direction)
    }
}

impl ExchangeEdge {
    pub fn origin(&self) -> &AssetRef {
        match self {
            ExchangeEdge::Amm(edge) => &edge.origin,
            ExchangeEdge::Crosschain(edge) => &edge.origin,
        }
    }

    pub fn destination(&self) -> &AssetRef {
        match self {
            ExchangeEdge::Amm(edge) => &edge.destination,
            ExchangeEdge::Crosschain(edge) => &edge.destination,
        }
    }

    /// Fixed routing cost; lower is preferred by the path finder.
    pub fn weight(&self) -> u32 {
        match self {
            ExchangeEdge::Amm(edge) => edge.weight,
            ExchangeEdge::Crosschain(edge) => edge.weight,
        }
    }

    pub fn kind(&self) -> VenueKind {
        match self {
            ExchangeEdge::Amm(_) => VenueKind::Amm,
            ExchangeEdge::Crosschain(_) => VenueKind::Crosschain,
        }
    }

    /// Venue component of the edge identity, totally ordered so the path
    /// finder's final tie-break is deterministic.
    pub fn venue_key(&self) -> (VenueKind, u64) {
        match self {
            ExchangeEdge::Amm(edge) => (VenueKind::Amm, edge.pool_id.0),
            ExchangeEdge::Crosschain(edge) => (VenueKind::Crosschain, edge.route_id.0),
        }
    }

    /// Quote this edge against the current cached venue state. Pure function
    /// of amount, direction and the snapshot; no suspension.
    pub fn quote(&self, amount: Balance, direction: SwapDirection) -> Result<Quote, QuoteError> {
        match self {
            ExchangeEdge::Amm(edge) => edge.quote(amount, direction),
            ExchangeEdge::Crosschain(edge) => Ok(edge.quote(amount, direction)),
        }
    }

    /// Start a new single-leg atomic operation from this edge. Fails when no
    /// signing account can be resolved for the chains involved.
    pub fn begin_operation(&self, args: ExecutionArgs) -> Result<AtomicOperation, ExecutionError> {
        match self {
            ExchangeEdge::Amm(edge) => {
                let account = edge
                    .host
                    .signing
                    .resolve_account(&edge.host.chain)
                    .ok_or_else(|| ExecutionError::NoAccount(edge.host.chain.clone()))?;

                Ok(AtomicOperation::Amm(AmmOperation::new(
                    Arc::clone(&edge.host),
                    account,
                    AmmLeg {
                        pool_id: edge.pool_id,
                        asset_in: edge.origin.clone(),
                        asset_out: edge.destination.clone(),
                    },
                    args,
                )))
            }
            ExchangeEdge::Crosschain(edge) => {
                let origin_account = edge
                    .host
                    .signing
                    .resolve_account(&edge.origin.chain)
                    .ok_or_else(|| ExecutionError::NoAccount(edge.origin.chain.clone()))?;
                let destination_account = edge
                    .host
                    .signing
                    .resolve_account(&edge.destination.chain)
                    .ok_or_else(|| ExecutionError::NoAccount(edge.destination.chain.clone()))?;

                Ok(AtomicOperation::Crosschain(CrosschainOperation::new(
                    Arc::clone(&edge.host),
                    edge.route_id,
                    edge.origin.clone(),
                    edge.destination.clone(),
                    origin_account,
                    destination_account,
                    args,
                )))
            }
        }
    }

    /// Try to fold this edge into an already-started operation as its next
    /// leg. `None` means the venue family cannot extend that unit and the
    /// builder has to start a fresh one: AMM legs compose on the same chain,
    /// cross-chain transfers never compose.
    pub fn append_to_operation(
        &self,
        operation: &AtomicOperation,
        args: ExecutionArgs,
    ) -> Option<AtomicOperation> {
        match (self, operation) {
            (ExchangeEdge::Amm(edge), AtomicOperation::Amm(existing))
                if existing.chain() == &edge.host.chain =>
            {
                let leg = AmmLeg {
                    pool_id: edge.pool_id,
                    asset_in: edge.origin.clone(),
                    asset_out: edge.destination.clone(),
                };
                Some(AtomicOperation::Amm(existing.appending_leg(leg, &args)))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for ExchangeEdge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (kind, venue) = self.venue_key();
        write!(f, "{}#{}({} -> {})", kind, venue, self.origin(), self.destination())
    }
}

impl Debug for ExchangeEdge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{amm_edge_with_reserves, crosschain_host};
    use super::*;
    use crate::external::mocks::{MockConnection, MockFetcher, MockSigner};
    use crate::external::{BlockTrigger, SnapshotFetcher};
    use crate::logic::types::SwapLimit;
    use std::time::Duration;

    fn args() -> ExecutionArgs {
        ExecutionArgs {
            swap_limit: SwapLimit {
                direction: SwapDirection::SellExactIn,
                amount_in: 100,
                amount_out: 100,
                slippage_bps: 50,
            },
            fee_asset: AssetRef::new("hydration", 0),
        }
    }

    #[test]
    fn test_amm_quote_within_liquidity() {
        let edge = amm_edge_with_reserves(
            1,
            AssetRef::new("hydration", 0),
            AssetRef::new("hydration", 5),
            2,
            Some(PoolReserves { reserve_a: 1000, reserve_b: 1000 }),
        );

        let quote = edge.quote(100, SwapDirection::SellExactIn).unwrap();
        assert_eq!(quote.amount_in, 100);
        assert_eq!(quote.amount_out, 100);
    }

    #[test]
    fn test_amm_quote_insufficient_liquidity() {
        let edge = amm_edge_with_reserves(
            1,
            AssetRef::new("hydration", 0),
            AssetRef::new("hydration", 5),
            2,
            Some(PoolReserves { reserve_a: 1000, reserve_b: 1000 }),
        );

        let err = edge.quote(2000, SwapDirection::SellExactIn).unwrap_err();
        assert_eq!(err, QuoteError::InsufficientLiquidity { requested: 2000, available: 1000 });

        let err = edge.quote(1500, SwapDirection::BuyExactOut).unwrap_err();
        assert!(matches!(err, QuoteError::InsufficientLiquidity { .. }));
    }

    #[test]
    fn test_amm_quote_monotonic_until_bound() {
        let edge = amm_edge_with_reserves(
            1,
            AssetRef::new("hydration", 0),
            AssetRef::new("hydration", 5),
            2,
            Some(PoolReserves { reserve_a: 500, reserve_b: 500 }),
        );

        let mut last_out = 0;
        for amount in [1u128, 10, 100, 499, 500] {
            let quote = edge.quote(amount, SwapDirection::SellExactIn).unwrap();
            assert!(quote.amount_out >= last_out);
            last_out = quote.amount_out;
        }
        assert!(edge.quote(501, SwapDirection::SellExactIn).is_err());
    }

    #[test]
    fn test_amm_quote_missing_snapshot() {
        let edge = amm_edge_with_reserves(
            1,
            AssetRef::new("hydration", 0),
            AssetRef::new("hydration", 5),
            2,
            None,
        );

        assert_eq!(
            edge.quote(100, SwapDirection::SellExactIn).unwrap_err(),
            QuoteError::MissingSnapshot
        );
    }

    #[test]
    fn test_crosschain_quote_is_identity() {
        let edge = ExchangeEdge::Crosschain(CrosschainEdge::new(
            RouteId(9),
            AssetRef::new("polkadot", 0),
            AssetRef::new("hydration", 0),
            6,
            crosschain_host(7, true),
        ));

        let quote = edge.quote(1_000_000, SwapDirection::SellExactIn).unwrap();
        assert_eq!(quote.amount_out, 1_000_000);
    }

    #[test]
    fn test_begin_operation_requires_account() {
        let host = Arc::new(AmmHost {
            chain: ChainId::new("hydration"),
            connection: Arc::new(MockConnection::new(10)),
            signing: Arc::new(MockSigner::default()),
        });
        let cache = RemoteStateCache::new(
            "pool-1",
            Arc::new(MockFetcher::constant(PoolReserves { reserve_a: 1, reserve_b: 1 }))
                as Arc<dyn SnapshotFetcher<PoolReserves>>,
            BlockTrigger::new(4),
            Duration::from_secs(1),
        );
        let edge = ExchangeEdge::Amm(AmmEdge::new(
            PoolId(1),
            AssetRef::new("hydration", 0),
            AssetRef::new("hydration", 5),
            2,
            false,
            cache,
            host,
        ));

        let err = edge.begin_operation(args()).unwrap_err();
        assert!(matches!(err, ExecutionError::NoAccount(chain) if chain == ChainId::new("hydration")));
    }

    #[test]
    fn test_crosschain_never_composes() {
        let crosschain = ExchangeEdge::Crosschain(CrosschainEdge::new(
            RouteId(1),
            AssetRef::new("polkadot", 0),
            AssetRef::new("hydration", 0),
            6,
            crosschain_host(7, true),
        ));

        let amm = amm_edge_with_reserves(
            2,
            AssetRef::new("hydration", 0),
            AssetRef::new("hydration", 5),
            2,
            Some(PoolReserves { reserve_a: 10, reserve_b: 10 }),
        );

        let operation = amm.begin_operation(args()).unwrap();
        assert!(crosschain.append_to_operation(&operation, args()).is_none());

        let transfer = crosschain.begin_operation(args()).unwrap();
        assert!(amm.append_to_operation(&transfer, args()).is_none());
    }

    #[test]
    fn test_amm_composes_on_same_chain_only() {
        let first = amm_edge_with_reserves(
            1,
            AssetRef::new("hydration", 0),
            AssetRef::new("hydration", 5),
            2,
            Some(PoolReserves { reserve_a: 10, reserve_b: 10 }),
        );
        let same_chain = amm_edge_with_reserves(
            2,
            AssetRef::new("hydration", 5),
            AssetRef::new("hydration", 9),
            2,
            Some(PoolReserves { reserve_a: 10, reserve_b: 10 }),
        );
        let other_chain = amm_edge_with_reserves(
            3,
            AssetRef::new("statemint", 5),
            AssetRef::new("statemint", 9),
            2,
            Some(PoolReserves { reserve_a: 10, reserve_b: 10 }),
        );

        let operation = first.begin_operation(args()).unwrap();

        let extended = same_chain.append_to_operation(&operation, args()).unwrap();
        assert_eq!(extended.leg_count(), 2);

        assert!(other_chain.append_to_operation(&operation, args()).is_none());
    }
}
