//! Trading-fee routing
//!
//! Collected fees are denominated in asset0 and leave the pool at the end of
//! a settlement, before reserves are reconciled. The destination depends on
//! the factory's per-pair trade-mining flag; an unset destination silently
//! leaves the fee inside the pool, where reconciliation absorbs it into
//! reserves. The transfer is capped at the pool's held balance so an
//! accounting mismatch cannot abort an otherwise valid settlement.

use crate::collaborators::{PoolFactory, TokenLedger};
use crate::error::PairError;
use ethereum_types::{Address, U256};
use tracing::debug;

/// Routes `fee` units of asset0 out of the pool. Returns the amount actually
/// transferred.
pub fn route_fee(
    factory: &dyn PoolFactory,
    token0: &dyn TokenLedger,
    pool: Address,
    counter_asset: Address,
    fee: U256,
) -> Result<U256, PairError> {
    if fee.is_zero() {
        return Ok(U256::zero());
    }

    let destination = if factory.trade_mining_enabled(counter_asset) {
        factory.fee_receiver()
    } else {
        factory.lp_fee_vault(counter_asset)
    };
    if destination.is_zero() {
        debug!(%fee, "fee destination unset, absorbing into reserves");
        return Ok(U256::zero());
    }

    let held = token0.balance_of(pool);
    let amount = fee.min(held);
    if amount.is_zero() {
        return Ok(U256::zero());
    }

    match token0.transfer(pool, destination, amount) {
        Ok(true) => {
            debug!(%amount, ?destination, "fee routed");
            Ok(amount)
        }
        Ok(false) => Err(PairError::TransferFailed(format!(
            "fee transfer of {amount} to {destination:?} returned false"
        ))),
        Err(e) => Err(PairError::TransferFailed(e.to_string())),
    }
}
