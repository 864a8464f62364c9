//! Net-Asset-Value-per-share under three pricing regimes
//!
//! All three functions share one structural formula: the weighted sum of both
//! reserves expressed in asset0, divided by total shares, scaled by
//! [`NAVPS_BASE`](crate::NAVPS_BASE). They differ only in how asset1's
//! contribution is priced:
//!
//! - neutral: at the raw oracle rate `erc20_amount : eth_amount`
//! - mint: at the sell-side rate, the spread widened by `(K_BASE - K)`
//! - burn: at the buy-side rate, widened by `(K_BASE + K)`
//!
//! With zero shares outstanding every regime bootstraps to `NAVPS_BASE`: the
//! first share is worth exactly one unit of asset0.

use crate::wide::{add, div, mul};
use crate::{AmmError, OraclePrice, K_BASE, NAVPS_BASE};
use ethereum_types::U256;

/// Neutral NAV-per-share:
/// `BASE * (reserve1*ethAmount + reserve0*erc20Amount) / totalShares / erc20Amount`.
pub fn nav_per_share(
    reserve0: U256,
    reserve1: U256,
    total_shares: U256,
    quote: &OraclePrice,
) -> Result<U256, AmmError> {
    if total_shares.is_zero() {
        return Ok(NAVPS_BASE);
    }
    let value = add(
        mul(reserve1, quote.eth_amount)?,
        mul(reserve0, quote.erc20_amount)?,
    )?;
    let scaled = mul(value, NAVPS_BASE)?;
    div(div(scaled, total_shares)?, quote.erc20_amount)
}

/// Mint-adjusted NAV-per-share: asset1 is valued at the sell-side price.
///
/// `BASE * (reserve1*ethAmount*K_BASE + reserve0*erc20Amount*(K_BASE-K))
///  / totalShares / erc20Amount / (K_BASE-K)`
pub fn nav_per_share_for_mint(
    reserve0: U256,
    reserve1: U256,
    total_shares: U256,
    quote: &OraclePrice,
) -> Result<U256, AmmError> {
    if total_shares.is_zero() {
        return Ok(NAVPS_BASE);
    }
    let spread = quote.sell_spread()?;
    let value = add(
        mul(mul(reserve1, quote.eth_amount)?, K_BASE)?,
        mul(mul(reserve0, quote.erc20_amount)?, spread)?,
    )?;
    let scaled = mul(value, NAVPS_BASE)?;
    div(
        div(div(scaled, total_shares)?, quote.erc20_amount)?,
        spread,
    )
}

/// Burn-adjusted NAV-per-share: mirror of the mint formula with the buy-side
/// factor `(K_BASE + K)`.
pub fn nav_per_share_for_burn(
    reserve0: U256,
    reserve1: U256,
    total_shares: U256,
    quote: &OraclePrice,
) -> Result<U256, AmmError> {
    if total_shares.is_zero() {
        return Ok(NAVPS_BASE);
    }
    let spread = quote.buy_spread()?;
    let value = add(
        mul(mul(reserve1, quote.eth_amount)?, K_BASE)?,
        mul(mul(reserve0, quote.erc20_amount)?, spread)?,
    )?;
    let scaled = mul(value, NAVPS_BASE)?;
    div(
        div(div(scaled, total_shares)?, quote.erc20_amount)?,
        spread,
    )
}
