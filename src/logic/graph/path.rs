use crate::asset::{AssetRef, Balance};
use crate::errors::PathError;
use crate::logic::edge::ExchangeEdge;
use crate::logic::types::{Quote, SwapDirection};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{Debug, Display, Formatter};

/// Stable identity of an exchange path, independent of quoted amounts.
///
/// Hashes the asset sequence together with the venue of every hop, so two
/// paths through the same assets but different pools get distinct hashes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathHash(pub [u8; 32]);

impl PathHash {
    fn compute(assets: &[AssetRef], edges: &[ExchangeEdge]) -> Self {
        let mut hasher = Sha256::new();
        for asset in assets {
            hasher.update(asset.hash_bytes());
        }
        for edge in edges {
            let (kind, id) = edge.venue_key();
            hasher.update([kind as u8]);
            hasher.update(id.to_le_bytes());
        }
        Self(hasher.finalize().into())
    }
}

impl Display for PathHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Debug for PathHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PathHash({self})")
    }
}

/// Ordered sequence of edges where each edge's destination is the next
/// edge's origin and no asset repeats.
#[derive(Clone)]
pub struct ExchangePath {
    hash: PathHash,
    assets: Vec<AssetRef>,
    edges: Vec<ExchangeEdge>,
}

impl ExchangePath {
    pub fn new_first(edge: ExchangeEdge) -> Self {
        let assets = vec![edge.origin().clone(), edge.destination().clone()];
        let edges = vec![edge];
        let hash = PathHash::compute(&assets, &edges);
        Self { hash, assets, edges }
    }

    /// Extend the path by one hop, rejecting disconnected edges and cycles.
    pub fn push_hop(&mut self, edge: ExchangeEdge) -> Result<(), PathError> {
        let index = self.edges.len();
        let last = self.assets.last().ok_or(PathError::Empty)?;
        if edge.origin() != last {
            return Err(PathError::Disconnected { index });
        }
        if self.assets.contains(edge.destination()) {
            return Err(PathError::RepeatedAsset { asset: edge.destination().clone() });
        }

        self.assets.push(edge.destination().clone());
        self.edges.push(edge);
        self.hash = PathHash::compute(&self.assets, &self.edges);
        Ok(())
    }

    pub fn from_edges(edges: Vec<ExchangeEdge>) -> Result<Self, PathError> {
        let mut iter = edges.into_iter();
        let first = iter.next().ok_or(PathError::Empty)?;
        let mut path = Self::new_first(first);
        for edge in iter {
            path.push_hop(edge)?;
        }
        Ok(path)
    }

    pub fn hash(&self) -> PathHash {
        self.hash
    }

    /// Number of hops.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn origin(&self) -> &AssetRef {
        &self.assets[0]
    }

    pub fn destination(&self) -> &AssetRef {
        &self.assets[self.assets.len() - 1]
    }

    pub fn assets(&self) -> &[AssetRef] {
        &self.assets
    }

    pub fn edges(&self) -> &[ExchangeEdge] {
        &self.edges
    }

    pub fn total_weight(&self) -> u64 {
        self.edges.iter().map(|edge| u64::from(edge.weight())).sum()
    }

    /// Validate the path against a hop limit. The path finder never builds
    /// past its own bound; this guards paths assembled directly from edges.
    pub fn ensure_hop_bound(&self, max_hops: u8) -> Result<(), PathError> {
        if self.len() > usize::from(max_hops) {
            return Err(PathError::TooManyHops { hops: self.len(), max: usize::from(max_hops) });
        }
        Ok(())
    }
}

impl Debug for ExchangePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let route: Vec<String> = self.assets.iter().map(ToString::to_string).collect();
        write!(f, "ExchangePath({})", route.join(" -> "))
    }
}

/// A path quoted end to end, with the per-leg amounts that produced it.
#[derive(Clone, Debug)]
pub struct QuotedPath {
    pub path: ExchangePath,
    pub leg_quotes: Vec<Quote>,
    pub direction: SwapDirection,
    pub amount_in: Balance,
    pub amount_out: Balance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::edge::PoolReserves;
    use crate::logic::edge::fixtures::{amm_edge_with_reserves, crosschain_edge};

    fn reserves() -> Option<PoolReserves> {
        Some(PoolReserves { reserve_a: 1000, reserve_b: 1000 })
    }

    #[test]
    fn test_single_hop_path() {
        let a = AssetRef::new("hydration", 0);
        let b = AssetRef::new("hydration", 5);
        let path = ExchangePath::new_first(amm_edge_with_reserves(1, a.clone(), b.clone(), 2, reserves()));

        assert_eq!(path.len(), 1);
        assert_eq!(path.origin(), &a);
        assert_eq!(path.destination(), &b);
        assert_eq!(path.total_weight(), 2);
    }

    #[test]
    fn test_push_hop_rejects_disconnected() {
        let a = AssetRef::new("polkadot", 0);
        let b = AssetRef::new("hydration", 0);
        let c = AssetRef::new("hydration", 5);
        let d = AssetRef::new("hydration", 9);

        let mut path = ExchangePath::new_first(crosschain_edge(1, a, b, 6));
        let err = path.push_hop(amm_edge_with_reserves(1, c, d, 2, reserves())).unwrap_err();
        assert!(matches!(err, PathError::Disconnected { index: 1 }));
    }

    #[test]
    fn test_push_hop_rejects_cycle() {
        let a = AssetRef::new("hydration", 0);
        let b = AssetRef::new("hydration", 5);

        let mut path =
            ExchangePath::new_first(amm_edge_with_reserves(1, a.clone(), b.clone(), 2, reserves()));
        let err = path.push_hop(amm_edge_with_reserves(2, b, a.clone(), 2, reserves())).unwrap_err();
        assert!(matches!(err, PathError::RepeatedAsset { asset } if asset == a));
    }

    #[test]
    fn test_hash_distinguishes_venues() {
        let a = AssetRef::new("hydration", 0);
        let b = AssetRef::new("hydration", 5);

        let via_pool_1 = ExchangePath::new_first(amm_edge_with_reserves(1, a.clone(), b.clone(), 2, reserves()));
        let via_pool_2 = ExchangePath::new_first(amm_edge_with_reserves(2, a.clone(), b.clone(), 2, reserves()));
        let same_as_1 = ExchangePath::new_first(amm_edge_with_reserves(1, a, b, 2, reserves()));

        assert_ne!(via_pool_1.hash(), via_pool_2.hash());
        assert_eq!(via_pool_1.hash(), same_as_1.hash());
    }

    #[test]
    fn test_from_edges_builds_multi_hop() {
        let a = AssetRef::new("polkadot", 0);
        let b = AssetRef::new("hydration", 0);
        let c = AssetRef::new("hydration", 5);

        let path = ExchangePath::from_edges(vec![
            crosschain_edge(1, a.clone(), b.clone(), 6),
            amm_edge_with_reserves(1, b, c.clone(), 2, reserves()),
        ])
        .unwrap();

        assert_eq!(path.len(), 2);
        assert_eq!(path.origin(), &a);
        assert_eq!(path.destination(), &c);
        assert_eq!(path.total_weight(), 8);
        assert!(matches!(ExchangePath::from_edges(vec![]), Err(PathError::Empty)));
    }

    #[test]
    fn test_ensure_hop_bound() {
        let a = AssetRef::new("c0", 0);
        let b = AssetRef::new("c1", 0);
        let c = AssetRef::new("c2", 0);

        let path = ExchangePath::from_edges(vec![
            crosschain_edge(1, a, b.clone(), 6),
            crosschain_edge(2, b, c, 6),
        ])
        .unwrap();

        assert!(path.ensure_hop_bound(2).is_ok());
        let err = path.ensure_hop_bound(1).unwrap_err();
        assert!(matches!(err, PathError::TooManyHops { hops: 2, max: 1 }));
    }
}
