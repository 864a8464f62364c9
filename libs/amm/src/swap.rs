//! Exact-input and exact-output swap quotes
//!
//! Forward quotes (`calc_out_token0`, `calc_out_token1`) price an already
//! tendered input; inverse quotes (`calc_in_needed_token1`,
//! `calc_in_needed_token0`) solve the same formulas for the input required to
//! reach a target output. Every division is a floor division performed after
//! all multiplications, and there is no rounding-up path: composing a forward
//! quote with its inverse reproduces the input only up to truncation. That
//! asymmetry is part of the pool's contract and must not be "fixed".
//!
//! Fees are always denominated in asset0. The asset0-out direction charges
//! the fee out of the converted value; the asset1-out direction charges it
//! directly on the asset0 input.

use crate::wide::{div, mul};
use crate::{AmmError, OraclePrice, K_BASE, THETA_BASE};
use ethereum_types::U256;

/// Result of an exact-input quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOut {
    /// Amount of the requested output asset.
    pub amount_out: U256,
    /// Fee retained by the pool, denominated in asset0.
    pub fee: U256,
}

/// Exact-input quote for asset0 out (asset1 tendered):
///
/// `amountOut = amountIn * ethAmount * K_BASE * (THETA_BASE-theta)
///  / erc20Amount / (K_BASE+K) / THETA_BASE`
///
/// The fee, when `theta != 0`, reuses the same numerator with `theta` in
/// place of `(THETA_BASE-theta)`.
pub fn calc_out_token0(amount_in: U256, quote: &OraclePrice) -> Result<SwapOut, AmmError> {
    let spread = quote.buy_spread()?;
    let value = mul(mul(amount_in, quote.eth_amount)?, K_BASE)?;
    let amount_out = div(
        div(
            div(mul(value, quote.fee_complement()?)?, quote.erc20_amount)?,
            spread,
        )?,
        THETA_BASE,
    )?;
    let fee = if quote.theta.is_zero() {
        U256::zero()
    } else {
        div(
            div(div(mul(value, quote.theta)?, quote.erc20_amount)?, spread)?,
            THETA_BASE,
        )?
    };
    Ok(SwapOut { amount_out, fee })
}

/// Exact-input quote for asset1 out (asset0 tendered):
///
/// `amountOut = amountIn * erc20Amount * (K_BASE-K) * (THETA_BASE-theta)
///  / ethAmount / K_BASE / THETA_BASE`
///
/// Fee: `amountIn * theta / THETA_BASE`.
pub fn calc_out_token1(amount_in: U256, quote: &OraclePrice) -> Result<SwapOut, AmmError> {
    let spread = quote.sell_spread()?;
    let value = mul(mul(amount_in, quote.erc20_amount)?, spread)?;
    let amount_out = div(
        div(
            div(mul(value, quote.fee_complement()?)?, quote.eth_amount)?,
            K_BASE,
        )?,
        THETA_BASE,
    )?;
    let fee = if quote.theta.is_zero() {
        U256::zero()
    } else {
        div(mul(amount_in, quote.theta)?, THETA_BASE)?
    };
    Ok(SwapOut { amount_out, fee })
}

/// Input of asset1 needed for an exact amount of asset0 out; the algebraic
/// inverse of [`calc_out_token0`] under floor division:
///
/// `amountIn = amountOut * erc20Amount * (K_BASE+K) * THETA_BASE
///  / ethAmount / K_BASE / (THETA_BASE-theta)`
pub fn calc_in_needed_token1(amount_out: U256, quote: &OraclePrice) -> Result<U256, AmmError> {
    let value = mul(
        mul(mul(amount_out, quote.erc20_amount)?, quote.buy_spread()?)?,
        THETA_BASE,
    )?;
    div(
        div(div(value, quote.eth_amount)?, K_BASE)?,
        quote.fee_complement()?,
    )
}

/// Input of asset0 needed for an exact amount of asset1 out; the algebraic
/// inverse of [`calc_out_token1`] under floor division:
///
/// `amountIn = amountOut * ethAmount * K_BASE * THETA_BASE
///  / erc20Amount / (K_BASE-K) / (THETA_BASE-theta)`
pub fn calc_in_needed_token0(amount_out: U256, quote: &OraclePrice) -> Result<U256, AmmError> {
    let value = mul(mul(mul(amount_out, quote.eth_amount)?, K_BASE)?, THETA_BASE)?;
    div(
        div(div(value, quote.erc20_amount)?, quote.sell_spread()?)?,
        quote.fee_complement()?,
    )
}
