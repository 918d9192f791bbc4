use crate::asset::{AssetRef, Balance};
use crate::errors::ExecutionError;
use crate::execution::fee::OperationFee;
use crate::execution::operation::AtomicOperation;
use crate::logic::graph::QuotedPath;
use crate::logic::types::{ExecutionArgs, SwapLimit};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Split a quoted route into its atomic execution units.
///
/// Each edge first tries to fold into the unit under construction; venues
/// that cannot compose start a fresh unit. Only the route's first unit pays
/// its fee in the caller-chosen asset, later units pay in their own origin
/// asset since the caller's fee asset may not exist on their chain.
pub fn build_operations(
    route: &QuotedPath,
    slippage_bps: u32,
    fee_asset: AssetRef,
) -> Result<Vec<AtomicOperation>, ExecutionError> {
    let mut units: Vec<AtomicOperation> = Vec::new();

    for (edge, quote) in route.path.edges().iter().zip(&route.leg_quotes) {
        let swap_limit = SwapLimit {
            direction: route.direction,
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            slippage_bps,
        };

        if let Some(last) = units.last() {
            let args = ExecutionArgs { swap_limit: swap_limit.clone(), fee_asset: edge.origin().clone() };
            if let Some(extended) = edge.append_to_operation(last, args) {
                let last_index = units.len() - 1;
                units[last_index] = extended;
                continue;
            }
        }

        let fee_asset = if units.is_empty() { fee_asset.clone() } else { edge.origin().clone() };
        units.push(edge.begin_operation(ExecutionArgs { swap_limit, fee_asset })?);
    }

    if units.is_empty() {
        return Err(ExecutionError::EmptyRoute);
    }

    info!(hops = route.path.len(), units = units.len(), "route split into execution units");
    Ok(units)
}

/// Drives a route's units sequentially, feeding each unit's delivered amount
/// into the next.
pub struct ExecutionManager {
    units: Vec<AtomicOperation>,
    unit_started: Option<mpsc::UnboundedSender<usize>>,
}

impl ExecutionManager {
    pub fn new(units: Vec<AtomicOperation>) -> Result<Self, ExecutionError> {
        if units.is_empty() {
            return Err(ExecutionError::EmptyRoute);
        }
        Ok(Self { units, unit_started: None })
    }

    pub fn from_route(
        route: &QuotedPath,
        slippage_bps: u32,
        fee_asset: AssetRef,
    ) -> Result<Self, ExecutionError> {
        Self::new(build_operations(route, slippage_bps, fee_asset)?)
    }

    /// Report the index of each unit as it starts executing, so a caller can
    /// show progress across submission boundaries.
    pub fn with_unit_notifications(mut self, sender: mpsc::UnboundedSender<usize>) -> Self {
        self.unit_started = Some(sender);
        self
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn units(&self) -> &[AtomicOperation] {
        &self.units
    }

    /// Fee of the whole route, summed across units with the account/amount
    /// split preserved.
    pub async fn estimate_total_fee(&self) -> Result<OperationFee, ExecutionError> {
        let mut total = OperationFee::default();
        for unit in &self.units {
            total.accumulate(unit.estimate_fee().await?);
        }
        Ok(total)
    }

    /// Extra input needed on top of the swap amount to cover the
    /// account-paid fees of units after the first. Under the identity venue
    /// model, an amount owed on a later unit maps one-to-one back to the
    /// route's input asset.
    pub async fn intermediate_fees_in_asset_in(&self) -> Result<Balance, ExecutionError> {
        let mut total: Balance = 0;
        for unit in self.units.iter().skip(1) {
            let fee = unit.estimate_fee().await?.paid_from_account;
            total = total.saturating_add(unit.required_amount_for_out(fee));
        }
        Ok(total)
    }

    /// Execute every unit in order. A failure after the first unit has
    /// settled is reported as partial completion, since funds already moved.
    pub async fn execute(&self, amount_in: Balance) -> Result<Balance, ExecutionError> {
        let total_units = self.units.len();
        let mut running = amount_in;

        for (index, unit) in self.units.iter().enumerate() {
            if let Some(sender) = &self.unit_started {
                let _ = sender.send(index);
            }

            let result = async {
                unit.estimate_fee().await?;
                unit.submit(running).await
            }
            .await;

            match result {
                Ok(delivered) => running = delivered,
                Err(source) if index > 0 => {
                    warn!(unit = index, total_units, %source, "route failed after partial execution");
                    return Err(ExecutionError::PartialCompletion {
                        completed_units: index,
                        total_units,
                        source: Box::new(source),
                    });
                }
                Err(source) => return Err(source),
            }
        }

        Ok(running)
    }

    /// Fast path for routes that collapsed into a single unit.
    pub async fn submit_single(&self, amount_in: Balance) -> Result<Balance, ExecutionError> {
        if self.units.len() != 1 {
            return Err(ExecutionError::SingleUnitExpected(self.units.len()));
        }
        self.units[0].estimate_fee().await?;
        self.units[0].submit(amount_in).await
    }
}
