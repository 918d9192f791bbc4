use crate::asset::{AssetRef, Balance, ChainId};

/// A provider could not list its edges. Recoverable: the aggregator keeps the
/// previous graph and retries on the next update signal.
#[derive(Debug, thiserror::Error)]
pub enum EnumerationError {
    #[error("failed to decode venue state: {0}")]
    StateDecode(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Quoting against the cached venue snapshot failed. Surfaced immediately,
/// never retried by the engine itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: Balance, available: Balance },
    #[error("no state snapshot fetched yet for venue")]
    MissingSnapshot,
    #[error("direction not supported by venue")]
    UnsupportedDirection,
}

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: AssetRef, to: AssetRef },
    #[error("path must contain at least one edge")]
    Empty,
    #[error("edge {index} origin does not match previous destination")]
    Disconnected { index: usize },
    #[error("asset {asset} appears twice in path")]
    RepeatedAsset { asset: AssetRef },
    #[error("path of {hops} hops exceeds maximum of {max}")]
    TooManyHops { hops: usize, max: usize },
    #[error("quoting leg {index} failed: {source}")]
    LegQuote {
        index: usize,
        #[source]
        source: QuoteError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("no signing account for chain {0}")]
    NoAccount(ChainId),
    #[error("fee estimation failed on chain {chain}: {reason}")]
    FeeEstimation { chain: ChainId, reason: String },
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: Balance, available: Balance },
    #[error("submission failed on chain {chain}: {reason}")]
    Submission { chain: ChainId, reason: String },
    #[error("transfer route resolution failed: {0}")]
    RouteResolution(String),
    /// An earlier unit already moved funds before a later unit failed. Real
    /// state changed even though the overall intent did not complete, so this
    /// must stay distinguishable from a clean pre-execution failure.
    #[error("route partially completed: {completed_units} of {total_units} units executed before failure")]
    PartialCompletion {
        completed_units: usize,
        total_units: usize,
        #[source]
        source: Box<ExecutionError>,
    },
    #[error("expected a single atomic unit, route built {0}")]
    SingleUnitExpected(usize),
    #[error("route produced no executable units")]
    EmptyRoute,
}

impl ExecutionError {
    /// True when funds moved before the failure.
    pub fn is_partial(&self) -> bool {
        matches!(self, ExecutionError::PartialCompletion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_completion_is_distinguishable() {
        let clean = ExecutionError::Submission {
            chain: ChainId::new("hydration"),
            reason: "dropped".to_string(),
        };
        let partial = ExecutionError::PartialCompletion {
            completed_units: 1,
            total_units: 2,
            source: Box::new(ExecutionError::Submission {
                chain: ChainId::new("hydration"),
                reason: "dropped".to_string(),
            }),
        };

        assert!(!clean.is_partial());
        assert!(partial.is_partial());
        assert!(partial.to_string().contains("1 of 2"));
    }

    #[test]
    fn test_quote_error_display() {
        let err = QuoteError::InsufficientLiquidity { requested: 2000, available: 1000 };
        assert_eq!(err.to_string(), "insufficient liquidity: requested 2000, available 1000");
    }
}
