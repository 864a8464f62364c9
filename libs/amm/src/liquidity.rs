//! Share issuance and redemption formulas
//!
//! Minting values a two-asset deposit at the mint-adjusted NAV; burning
//! converts a share balance back into one chosen asset at the burn-adjusted
//! NAV, with the fee always denominated in asset0.

use crate::wide::{add, div, mul, sub};
use crate::{AmmError, OraclePrice, K_BASE, NAVPS_BASE, THETA_BASE};
use ethereum_types::U256;

/// Result of a burn settlement calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnOut {
    /// Amount of the chosen output asset owed to the redeemer.
    pub amount_out: U256,
    /// Fee retained by the pool, denominated in asset0.
    pub fee: U256,
}

/// Shares minted for a deposit of both assets at the given NAV-per-share:
///
/// `liquidity = amount0 * BASE / navps
///  + amount1 * BASE * ethAmount * K_BASE / navps / erc20Amount / (K_BASE+K)`
pub fn calc_liquidity(
    amount0: U256,
    amount1: U256,
    navps: U256,
    quote: &OraclePrice,
) -> Result<U256, AmmError> {
    let part0 = div(mul(amount0, NAVPS_BASE)?, navps)?;
    let value1 = mul(mul(mul(amount1, NAVPS_BASE)?, quote.eth_amount)?, K_BASE)?;
    let part1 = div(
        div(div(value1, navps)?, quote.erc20_amount)?,
        quote.buy_spread()?,
    )?;
    add(part0, part1)
}

/// Redemption of `liquidity` shares into asset0. The redeemed value is
/// `liquidity * navps / BASE`; the fee comes out of that value.
pub fn calc_out_token0_for_burn(
    liquidity: U256,
    navps: U256,
    quote: &OraclePrice,
) -> Result<BurnOut, AmmError> {
    let value0 = div(mul(liquidity, navps)?, NAVPS_BASE)?;
    let fee = if quote.theta.is_zero() {
        U256::zero()
    } else {
        div(mul(value0, quote.theta)?, THETA_BASE)?
    };
    Ok(BurnOut {
        amount_out: sub(value0, fee)?,
        fee,
    })
}

/// Redemption of `liquidity` shares into asset1. The post-NAV value is
/// converted through the sell-side exchange rate with the fee factor applied,
/// while the collected fee itself stays in asset0.
pub fn calc_out_token1_for_burn(
    liquidity: U256,
    navps: U256,
    quote: &OraclePrice,
) -> Result<BurnOut, AmmError> {
    let value0 = div(mul(liquidity, navps)?, NAVPS_BASE)?;
    let converted = mul(mul(value0, quote.erc20_amount)?, quote.sell_spread()?)?;
    let amount_out = div(
        div(
            div(mul(converted, quote.fee_complement()?)?, quote.eth_amount)?,
            K_BASE,
        )?,
        THETA_BASE,
    )?;
    let fee = if quote.theta.is_zero() {
        U256::zero()
    } else {
        div(mul(value0, quote.theta)?, THETA_BASE)?
    };
    Ok(BurnOut { amount_out, fee })
}
