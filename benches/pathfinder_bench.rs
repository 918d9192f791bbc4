use asset_exchange::external::mocks::{MockConnection, MockResolver, MockSigner};
use asset_exchange::{
    AccountId, AssetRef, CrosschainEdge, CrosschainHost, ExchangeEdge, ExchangeGraph, PathFinder,
    RouteId, SwapDirection,
};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

fn host() -> Arc<CrosschainHost> {
    Arc::new(CrosschainHost {
        resolver: Arc::new(MockResolver::new(0, true)),
        connection: Arc::new(MockConnection::new(1)),
        signing: Arc::new(MockSigner::universal(AccountId::repeat_byte(1))),
    })
}

/// Dense mesh: every chain's native asset connects to every other.
fn mesh_graph(chains: usize) -> ExchangeGraph {
    let host = host();
    let mut edges = Vec::new();
    let mut route = 0u64;

    for from in 0..chains {
        for to in 0..chains {
            if from == to {
                continue;
            }
            route += 1;
            edges.push(ExchangeEdge::Crosschain(CrosschainEdge::new(
                RouteId(route),
                AssetRef::new(format!("chain-{from}").as_str(), 0),
                AssetRef::new(format!("chain-{to}").as_str(), 0),
                6,
                Arc::clone(&host),
            )));
        }
    }

    ExchangeGraph::from_edges(edges)
}

fn benchmark_find_paths(c: &mut Criterion) {
    let graph = mesh_graph(8);
    let from = AssetRef::new("chain-0", 0);
    let to = AssetRef::new("chain-7", 0);
    let finder = PathFinder::new(3);

    c.bench_function("find_paths_mesh_8", |b| {
        b.iter(|| {
            let paths = finder.find_paths(black_box(&graph), black_box(&from), black_box(&to));
            black_box(paths);
        })
    });
}

fn benchmark_find_best_path(c: &mut Criterion) {
    let graph = mesh_graph(8);
    let from = AssetRef::new("chain-0", 0);
    let to = AssetRef::new("chain-7", 0);
    let finder = PathFinder::new(3);

    c.bench_function("find_best_path_mesh_8", |b| {
        b.iter(|| {
            finder
                .find_best_path(
                    black_box(&graph),
                    black_box(&from),
                    black_box(&to),
                    black_box(1_000),
                    SwapDirection::SellExactIn,
                )
                .unwrap();
        })
    });
}

criterion_group!(benches, benchmark_find_paths, benchmark_find_best_path);
criterion_main!(benches);
