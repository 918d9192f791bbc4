/// Base routing weight pinned by the AMM provider for a same-chain swap edge.
pub const AMM_SWAP_WEIGHT: u32 = 2;

/// Base routing weight pinned by the cross-chain provider for a transfer edge.
/// Higher than the AMM base weight so a same-chain route wins when both exist.
pub const CROSSCHAIN_TRANSFER_WEIGHT: u32 = 6;

/// Hop bound applied during path search. Longer paths compound fees and
/// slippage past the point of being executable.
pub const DEFAULT_MAX_HOPS: u8 = 4;

/// Default timeout applied around a single venue snapshot fetch.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
