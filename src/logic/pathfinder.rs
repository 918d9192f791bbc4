use crate::asset::{AssetRef, Balance};
use crate::constants::DEFAULT_MAX_HOPS;
use crate::errors::PathError;
use crate::logic::edge::ExchangeEdge;
use crate::logic::graph::{ExchangeGraph, ExchangePath, QuotedPath};
use crate::logic::types::{Quote, SwapDirection};
use tracing::debug;

/// Finds the lowest-weight route between two assets and quotes it.
///
/// The search runs purely on fixed edge weights; liquidity and price are
/// only evaluated along the chosen path afterwards. When a leg of the chosen
/// path fails to quote the whole request fails, deliberately without falling
/// back to the next-best path.
#[derive(Clone, Copy, Debug)]
pub struct PathFinder {
    max_hops: u8,
}

impl PathFinder {
    pub fn new(max_hops: u8) -> Self {
        Self { max_hops }
    }

    /// Enumerate every simple path from `from` to `to` within the hop bound.
    pub fn find_paths(
        &self,
        graph: &ExchangeGraph,
        from: &AssetRef,
        to: &AssetRef,
    ) -> Vec<ExchangePath> {
        let mut found = Vec::new();
        let mut visited = vec![from.clone()];
        let mut trail: Vec<ExchangeEdge> = Vec::new();
        self.walk(graph, from, to, &mut visited, &mut trail, &mut found);
        found
    }

    fn walk(
        &self,
        graph: &ExchangeGraph,
        position: &AssetRef,
        to: &AssetRef,
        visited: &mut Vec<AssetRef>,
        trail: &mut Vec<ExchangeEdge>,
        found: &mut Vec<ExchangePath>,
    ) {
        if trail.len() >= usize::from(self.max_hops) {
            return;
        }

        for edge in graph.outgoing(position) {
            let next = edge.destination();
            if visited.contains(next) {
                continue;
            }

            trail.push(edge.clone());
            if next == to {
                if let Ok(path) = ExchangePath::from_edges(trail.clone()) {
                    found.push(path);
                }
            } else {
                visited.push(next.clone());
                self.walk(graph, next, to, visited, trail, found);
                visited.pop();
            }
            trail.pop();
        }
    }

    /// Lowest-weight path by graph cost, then quoted end to end.
    pub fn find_best_path(
        &self,
        graph: &ExchangeGraph,
        from: &AssetRef,
        to: &AssetRef,
        amount: Balance,
        direction: SwapDirection,
    ) -> Result<QuotedPath, PathError> {
        let candidates = self.find_paths(graph, from, to);
        debug!(%from, %to, candidates = candidates.len(), "path search finished");

        let best = candidates
            .into_iter()
            .min_by_key(rank)
            .ok_or_else(|| PathError::NoRoute { from: from.clone(), to: to.clone() })?;

        quote_path(best, amount, direction)
    }
}

impl Default for PathFinder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HOPS)
    }
}

/// Selection key: total weight, then fewer hops, then the first edge's
/// weight, then the venue-key sequence so equal-cost alternatives resolve
/// the same way on every run.
fn rank(path: &ExchangePath) -> (u64, usize, u32, Vec<(crate::logic::edge::VenueKind, u64)>) {
    let first_weight = path.edges().first().map(ExchangeEdge::weight).unwrap_or(0);
    let venues = path.edges().iter().map(ExchangeEdge::venue_key).collect();
    (path.total_weight(), path.len(), first_weight, venues)
}

/// Quote each leg sequentially: for a sell, the output of leg i feeds leg
/// i+1; for a buy, the required input of leg i+1 becomes leg i's target.
fn quote_path(
    path: ExchangePath,
    amount: Balance,
    direction: SwapDirection,
) -> Result<QuotedPath, PathError> {
    let mut leg_quotes: Vec<Quote> = Vec::with_capacity(path.len());

    match direction {
        SwapDirection::SellExactIn => {
            let mut running = amount;
            for (index, edge) in path.edges().iter().enumerate() {
                let quote = edge
                    .quote(running, direction)
                    .map_err(|source| PathError::LegQuote { index, source })?;
                running = quote.amount_out;
                leg_quotes.push(quote);
            }
        }
        SwapDirection::BuyExactOut => {
            let mut running = amount;
            for (index, edge) in path.edges().iter().enumerate().rev() {
                let quote = edge
                    .quote(running, direction)
                    .map_err(|source| PathError::LegQuote { index, source })?;
                running = quote.amount_in;
                leg_quotes.push(quote);
            }
            leg_quotes.reverse();
        }
    }

    let (amount_in, amount_out) = match direction {
        SwapDirection::SellExactIn => {
            (amount, leg_quotes.last().map(|quote| quote.amount_out).unwrap_or(amount))
        }
        SwapDirection::BuyExactOut => {
            (leg_quotes.first().map(|quote| quote.amount_in).unwrap_or(amount), amount)
        }
    };

    Ok(QuotedPath { path, leg_quotes, direction, amount_in, amount_out })
}
