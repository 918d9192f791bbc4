use crate::asset::AssetRef;
use crate::logic::edge::ExchangeEdge;
use ahash::RandomState;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

pub type FastHasher = RandomState;
pub type FastHashMap<K, V> = HashMap<K, V, FastHasher>;

/// Merged view of every exchange opportunity currently on offer.
///
/// Directed multigraph: assets are nodes, each arc holds every edge between
/// the same ordered asset pair. Instances are immutable once built; the
/// aggregator replaces the whole snapshot instead of mutating it in place,
/// so readers never observe a half-merged graph.
#[derive(Default)]
pub struct ExchangeGraph {
    graph: DiGraph<AssetRef, Vec<ExchangeEdge>, usize>,
    asset_index: FastHashMap<AssetRef, NodeIndex<usize>>,
}

impl ExchangeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the merged graph from every provider's edge list.
    pub fn from_edges(edges: impl IntoIterator<Item = ExchangeEdge>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    fn add_or_get_asset_idx(&mut self, asset: &AssetRef) -> NodeIndex<usize> {
        if let Some(&idx) = self.asset_index.get(asset) {
            return idx;
        }
        let idx = self.graph.add_node(asset.clone());
        self.asset_index.insert(asset.clone(), idx);
        idx
    }

    fn add_edge(&mut self, edge: ExchangeEdge) {
        let origin = self.add_or_get_asset_idx(edge.origin());
        let destination = self.add_or_get_asset_idx(edge.destination());

        if let Some(arc) = self.graph.find_edge(origin, destination) {
            if let Some(edges) = self.graph.edge_weight_mut(arc) {
                edges.push(edge);
            }
        } else {
            self.graph.add_edge(origin, destination, vec![edge]);
        }
    }

    pub fn asset_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_weights().map(Vec::len).sum()
    }

    pub fn contains_asset(&self, asset: &AssetRef) -> bool {
        self.asset_index.contains_key(asset)
    }

    pub fn assets(&self) -> impl Iterator<Item = &AssetRef> {
        self.graph.node_weights()
    }

    /// All edges leaving the given asset. Empty when the asset is unknown.
    pub fn outgoing(&self, asset: &AssetRef) -> Vec<&ExchangeEdge> {
        let Some(&idx) = self.asset_index.get(asset) else {
            return Vec::new();
        };
        self.graph.edges(idx).flat_map(|arc| arc.weight().iter()).collect()
    }

    pub fn all_edges(&self) -> impl Iterator<Item = &ExchangeEdge> {
        self.graph.edge_weights().flat_map(|edges| edges.iter())
    }
}

impl Debug for ExchangeGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExchangeGraph(assets={}, edges={})", self.asset_count(), self.edge_count())
    }
}
