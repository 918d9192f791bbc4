use crate::asset::{AccountId, AssetRef, Balance, ChainId};
use crate::errors::ExecutionError;
use crate::execution::fee::OperationFee;
use crate::external::CallData;
use crate::logic::edge::{AmmHost, CrosschainHost, PoolId, RouteId};
use crate::logic::types::{ExecutionArgs, SwapDirection, SwapLimit};
use serde_json::json;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, info};

/// One pool hop inside a folded AMM unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmmLeg {
    pub pool_id: PoolId,
    pub asset_in: AssetRef,
    pub asset_out: AssetRef,
}

/// One submittable execution unit of a route. Everything inside a unit
/// settles in a single on-chain submission; splitting a route into several
/// units is what makes partial completion possible.
pub enum AtomicOperation {
    Amm(AmmOperation),
    Crosschain(CrosschainOperation),
}

/// One or more AMM swaps on the same chain, submitted as a single router
/// call.
pub struct AmmOperation {
    host: Arc<AmmHost>,
    account: AccountId,
    legs: Vec<AmmLeg>,
    args: ExecutionArgs,
}

/// A single cross-chain transfer. Never folds with other legs; the protocol
/// fee of the transfer is only known once the route is resolved.
pub struct CrosschainOperation {
    host: Arc<CrosschainHost>,
    route_id: RouteId,
    origin: AssetRef,
    destination: AssetRef,
    origin_account: AccountId,
    destination_account: AccountId,
    args: ExecutionArgs,
}

fn amount_string(amount: Balance) -> String {
    // Amounts are encoded as decimal strings, u128 does not fit a JSON number.
    amount.to_string()
}

impl AmmOperation {
    pub fn new(host: Arc<AmmHost>, account: AccountId, first_leg: AmmLeg, args: ExecutionArgs) -> Self {
        Self { host, account, legs: vec![first_leg], args }
    }

    /// Extend the unit by one more same-chain leg. The unit keeps its input
    /// side and fee asset; only the output side moves to the new leg's quote.
    pub fn appending_leg(&self, leg: AmmLeg, args: &ExecutionArgs) -> Self {
        let mut legs = self.legs.clone();
        legs.push(leg);

        let swap_limit = SwapLimit {
            amount_out: args.swap_limit.amount_out,
            ..self.args.swap_limit.clone()
        };

        Self {
            host: Arc::clone(&self.host),
            account: self.account,
            legs,
            args: ExecutionArgs { swap_limit, fee_asset: self.args.fee_asset.clone() },
        }
    }

    pub fn chain(&self) -> &ChainId {
        &self.host.chain
    }

    pub fn legs(&self) -> &[AmmLeg] {
        &self.legs
    }

    fn call(&self, amount_in: Balance) -> CallData {
        let method = match self.args.swap_limit.direction {
            SwapDirection::SellExactIn => "swap_exact_in",
            SwapDirection::BuyExactOut => "swap_exact_out",
        };

        let legs: Vec<_> = self
            .legs
            .iter()
            .map(|leg| {
                json!({
                    "pool": leg.pool_id.0,
                    "asset_in": leg.asset_in,
                    "asset_out": leg.asset_out,
                })
            })
            .collect();

        CallData {
            section: "amm_router",
            method,
            payload: json!({
                "legs": legs,
                "amount_in": amount_string(amount_in),
                "amount_out": amount_string(self.args.swap_limit.amount_out),
                "slippage_bps": self.args.swap_limit.slippage_bps,
                "fee_asset": self.args.fee_asset,
            }),
        }
    }

    async fn estimate_fee(&self) -> Result<OperationFee, ExecutionError> {
        let call = self.call(self.args.swap_limit.amount_in);
        let fee = self.host.connection.estimate_call_fee(&self.host.chain, &call).await?;
        Ok(OperationFee::from_account(fee))
    }

    async fn submit(&self, amount_in: Balance) -> Result<Balance, ExecutionError> {
        let call = self.call(amount_in);
        info!(chain = %self.host.chain, legs = self.legs.len(), amount_in, "submitting AMM unit");
        self.host.connection.submit_and_confirm(&self.host.chain, &call, &self.account).await
    }
}

impl CrosschainOperation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: Arc<CrosschainHost>,
        route_id: RouteId,
        origin: AssetRef,
        destination: AssetRef,
        origin_account: AccountId,
        destination_account: AccountId,
        args: ExecutionArgs,
    ) -> Self {
        Self { host, route_id, origin, destination, origin_account, destination_account, args }
    }

    fn call(&self, amount_in: Balance) -> CallData {
        CallData {
            section: "crosschain",
            method: "transfer",
            payload: json!({
                "route": self.route_id.0,
                "origin": self.origin,
                "destination": self.destination,
                "amount_in": amount_string(amount_in),
            }),
        }
    }

    /// Origin network fee plus the resolved protocol fee, split by whether
    /// the protocol fee comes out of the moving amount.
    async fn estimate_fee(&self) -> Result<OperationFee, ExecutionError> {
        let resolved = self
            .host
            .resolver
            .resolve_route(&self.origin, &self.destination, &self.destination_account)
            .await?;

        let call = self.call(self.args.swap_limit.amount_in);
        let origin_fee =
            self.host.connection.estimate_call_fee(&self.origin.chain, &call).await?;

        let mut fee = OperationFee::from_account(origin_fee);
        if resolved.fee_deducted_from_amount {
            fee.paid_from_amount = resolved.protocol_fee;
        } else {
            fee.paid_from_account = fee.paid_from_account.saturating_add(resolved.protocol_fee);
        }
        Ok(fee)
    }

    async fn submit(&self, amount_in: Balance) -> Result<Balance, ExecutionError> {
        let resolved = self
            .host
            .resolver
            .resolve_route(&self.origin, &self.destination, &self.destination_account)
            .await?;
        debug!(route = self.route_id.0, reserve = ?resolved.reserve_chain, "transfer route resolved");

        let call = self.call(amount_in);
        info!(
            origin = %self.origin, destination = %self.destination, amount_in,
            "submitting cross-chain unit"
        );
        let delivered = self
            .host
            .connection
            .submit_and_confirm(&self.origin.chain, &call, &self.origin_account)
            .await?;

        if resolved.fee_deducted_from_amount {
            Ok(delivered.saturating_sub(resolved.protocol_fee))
        } else {
            Ok(delivered)
        }
    }
}

impl AtomicOperation {
    pub fn leg_count(&self) -> usize {
        match self {
            AtomicOperation::Amm(operation) => operation.legs.len(),
            AtomicOperation::Crosschain(_) => 1,
        }
    }

    pub fn swap_limit(&self) -> &SwapLimit {
        match self {
            AtomicOperation::Amm(operation) => &operation.args.swap_limit,
            AtomicOperation::Crosschain(operation) => &operation.args.swap_limit,
        }
    }

    pub fn fee_asset(&self) -> &AssetRef {
        match self {
            AtomicOperation::Amm(operation) => &operation.args.fee_asset,
            AtomicOperation::Crosschain(operation) => &operation.args.fee_asset,
        }
    }

    pub fn origin_chain(&self) -> &ChainId {
        match self {
            AtomicOperation::Amm(operation) => &operation.host.chain,
            AtomicOperation::Crosschain(operation) => &operation.origin.chain,
        }
    }

    /// Input needed to obtain `amount_out` from this unit. Identity under
    /// the reserve-bounded venue model.
    pub fn required_amount_for_out(&self, amount_out: Balance) -> Balance {
        amount_out
    }

    pub async fn estimate_fee(&self) -> Result<OperationFee, ExecutionError> {
        match self {
            AtomicOperation::Amm(operation) => operation.estimate_fee().await,
            AtomicOperation::Crosschain(operation) => operation.estimate_fee().await,
        }
    }

    /// Submit the unit with a concrete input amount, returning the amount
    /// delivered to the unit's destination.
    pub async fn submit(&self, amount_in: Balance) -> Result<Balance, ExecutionError> {
        match self {
            AtomicOperation::Amm(operation) => operation.submit(amount_in).await,
            AtomicOperation::Crosschain(operation) => operation.submit(amount_in).await,
        }
    }
}

impl Debug for AtomicOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicOperation::Amm(operation) => {
                write!(f, "AmmOperation(chain={}, legs={})", operation.host.chain, operation.legs.len())
            }
            AtomicOperation::Crosschain(operation) => write!(
                f,
                "CrosschainOperation(route={}, {} -> {})",
                operation.route_id.0, operation.origin, operation.destination
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockConnection, MockResolver, MockSigner};

    fn args(amount_in: Balance, amount_out: Balance) -> ExecutionArgs {
        ExecutionArgs {
            swap_limit: SwapLimit {
                direction: SwapDirection::SellExactIn,
                amount_in,
                amount_out,
                slippage_bps: 50,
            },
            fee_asset: AssetRef::new("hydration", 0),
        }
    }

    fn amm_host(connection: Arc<MockConnection>) -> Arc<AmmHost> {
        Arc::new(AmmHost {
            chain: "hydration".into(),
            connection,
            signing: Arc::new(MockSigner::universal(AccountId::repeat_byte(1))),
        })
    }

    fn crosschain_host(
        connection: Arc<MockConnection>,
        fee: Balance,
        deducted: bool,
    ) -> Arc<CrosschainHost> {
        Arc::new(CrosschainHost {
            resolver: Arc::new(MockResolver::new(fee, deducted)),
            connection,
            signing: Arc::new(MockSigner::universal(AccountId::repeat_byte(1))),
        })
    }

    fn leg(pool: u64, asset_in: AssetRef, asset_out: AssetRef) -> AmmLeg {
        AmmLeg { pool_id: PoolId(pool), asset_in, asset_out }
    }

    #[tokio::test]
    async fn test_amm_unit_fee_and_submit() {
        let connection = Arc::new(MockConnection::new(12));
        let operation = AmmOperation::new(
            amm_host(Arc::clone(&connection)),
            AccountId::repeat_byte(1),
            leg(1, AssetRef::new("hydration", 0), AssetRef::new("hydration", 5)),
            args(100, 100),
        );
        let unit = AtomicOperation::Amm(operation);

        let fee = unit.estimate_fee().await.unwrap();
        assert_eq!(fee, OperationFee::from_account(12));

        let delivered = unit.submit(100).await.unwrap();
        assert_eq!(delivered, 100);
        assert_eq!(unit.required_amount_for_out(50), 50);
        assert_eq!(format!("{unit:?}"), "AmmOperation(chain=hydration, legs=1)");

        let submissions = connection.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].section, "amm_router");
        assert_eq!(submissions[0].method, "swap_exact_in");
        assert_eq!(submissions[0].payload["amount_in"], "100");
    }

    #[tokio::test]
    async fn test_appending_leg_keeps_input_side() {
        let connection = Arc::new(MockConnection::new(12));
        let first = AmmOperation::new(
            amm_host(connection),
            AccountId::repeat_byte(1),
            leg(1, AssetRef::new("hydration", 0), AssetRef::new("hydration", 5)),
            args(100, 98),
        );

        let folded = first.appending_leg(
            leg(2, AssetRef::new("hydration", 5), AssetRef::new("hydration", 9)),
            &args(98, 95),
        );

        assert_eq!(folded.legs().len(), 2);
        assert_eq!(folded.args.swap_limit.amount_in, 100);
        assert_eq!(folded.args.swap_limit.amount_out, 95);
        assert_eq!(folded.args.fee_asset, AssetRef::new("hydration", 0));
    }

    #[tokio::test]
    async fn test_crosschain_fee_deducted_from_amount() {
        let connection = Arc::new(MockConnection::new(3));
        let unit = AtomicOperation::Crosschain(CrosschainOperation::new(
            crosschain_host(Arc::clone(&connection), 7, true),
            RouteId(1),
            AssetRef::new("polkadot", 0),
            AssetRef::new("hydration", 0),
            AccountId::repeat_byte(1),
            AccountId::repeat_byte(2),
            args(500, 500),
        ));

        let fee = unit.estimate_fee().await.unwrap();
        assert_eq!(fee.paid_from_account, 3);
        assert_eq!(fee.paid_from_amount, 7);

        // The transfer moves 500 but the protocol keeps its 7 on the way.
        let delivered = unit.submit(500).await.unwrap();
        assert_eq!(delivered, 493);
    }

    #[tokio::test]
    async fn test_crosschain_fee_from_account() {
        let connection = Arc::new(MockConnection::new(3));
        let unit = AtomicOperation::Crosschain(CrosschainOperation::new(
            crosschain_host(Arc::clone(&connection), 7, false),
            RouteId(1),
            AssetRef::new("polkadot", 0),
            AssetRef::new("hydration", 0),
            AccountId::repeat_byte(1),
            AccountId::repeat_byte(2),
            args(500, 500),
        ));

        let fee = unit.estimate_fee().await.unwrap();
        assert_eq!(fee.paid_from_account, 10);
        assert_eq!(fee.paid_from_amount, 0);

        assert_eq!(unit.submit(500).await.unwrap(), 500);
    }
}
