use crate::asset::{AssetRef, Balance};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Direction of a swap request.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapDirection {
    /// The input amount is fixed; the output floats.
    SellExactIn,
    /// The output amount is fixed; the input floats.
    BuyExactOut,
}

/// Amount pair produced by quoting one edge or a composed path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub amount_in: Balance,
    pub amount_out: Balance,
    pub direction: SwapDirection,
}

impl Quote {
    pub fn new(amount_in: Balance, amount_out: Balance, direction: SwapDirection) -> Self {
        Self { amount_in, amount_out, direction }
    }
}

/// Quoted bounds one atomic unit must respect at execution time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapLimit {
    pub direction: SwapDirection,
    pub amount_in: Balance,
    pub amount_out: Balance,
    /// Tolerated deviation from the quoted amounts, in basis points.
    pub slippage_bps: u32,
}

impl SwapLimit {
    /// Re-anchor the limit to a concrete input amount, used when a preceding
    /// unit delivered slightly more or less than quoted.
    pub fn replacing_amount_in(&self, amount_in: Balance) -> Self {
        Self { amount_in, ..self.clone() }
    }
}

/// Everything an edge needs to start or extend an atomic operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionArgs {
    pub swap_limit: SwapLimit,
    /// Asset the unit's on-chain fee is paid in. Only the first unit of a
    /// route gets a caller-chosen fee asset; later units pay in their own
    /// origin asset.
    pub fee_asset: AssetRef,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_direction_display() {
        assert_eq!(SwapDirection::SellExactIn.to_string(), "SELL_EXACT_IN");
        assert_eq!(SwapDirection::BuyExactOut.to_string(), "BUY_EXACT_OUT");
        assert_eq!(SwapDirection::from_str("SELL_EXACT_IN").unwrap(), SwapDirection::SellExactIn);
    }

    #[test]
    fn test_replacing_amount_in() {
        let limit = SwapLimit {
            direction: SwapDirection::SellExactIn,
            amount_in: 100,
            amount_out: 95,
            slippage_bps: 50,
        };

        let adjusted = limit.replacing_amount_in(90);
        assert_eq!(adjusted.amount_in, 90);
        assert_eq!(adjusted.amount_out, 95);
        assert_eq!(adjusted.slippage_bps, 50);
    }
}
