//! # Orapool AMM Library - Oracle-Priced Pool Mathematics Engine
//!
//! ## Purpose
//!
//! Fixed-point mathematics for an oracle-priced two-asset liquidity pool.
//! Unlike constant-product AMMs, price discovery happens off-pool: every
//! valuation consumes an oracle quote (exchange rate, spread parameter `K`,
//! fee rate `theta`) and turns reserves plus that quote into share prices,
//! swap amounts, and fees. All arithmetic is integer-only `U256` with
//! multiplications performed before divisions so no precision is lost ahead
//! of the final floor.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool reserves and share supply from the pair ledger,
//!   per-call quotes from the oracle controller
//! - **Output Destinations**: Settlement orchestration in `orapool-pair`
//! - **Precision**: Native token precision (18 decimals), spread and fee
//!   rates in parts per 10^8
//! - **Validation**: Every multiplication is overflow-checked; an overflowing
//!   intermediate fails the whole calculation
//!
//! ## Architecture Role
//!
//! This crate is the pure, side-effect-free core: no state, no I/O, no
//! collaborator calls. The pair crate owns ordering and settlement; this
//! crate owns the closed-form formulas.

pub mod liquidity;
pub mod nav;
pub mod swap;
pub mod wide;

pub use liquidity::{calc_liquidity, calc_out_token0_for_burn, calc_out_token1_for_burn, BurnOut};
pub use nav::{nav_per_share, nav_per_share_for_burn, nav_per_share_for_mint};
pub use swap::{
    calc_in_needed_token0, calc_in_needed_token1, calc_out_token0, calc_out_token1, SwapOut,
};

use ethereum_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed-point base for NAV-per-share values (10^18).
pub const NAVPS_BASE: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// Scale of the oracle spread parameter `K` (parts per 10^8).
pub const K_BASE: U256 = U256([100_000_000, 0, 0, 0]);

/// Scale of the trading fee rate `theta` (parts per 10^8).
pub const THETA_BASE: U256 = U256([100_000_000, 0, 0, 0]);

/// Share units permanently locked on the first mint to keep the share price
/// away from the division-by-near-zero regime.
pub const MINIMUM_LIQUIDITY: U256 = U256([1_000_000_000, 0, 0, 0]);

/// Error types for pool math
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmmError {
    #[error("arithmetic overflow in wide intermediate")]
    Overflow,

    #[error("division by zero in pool formula")]
    DividedByZero,
}

/// Oracle quote consumed by every valuation. The exchange rate of asset1 in
/// terms of asset0 is `erc20_amount : eth_amount`; `k` widens it
/// asymmetrically for mint vs. burn and `theta` is the per-trade fee rate,
/// both in parts per [`K_BASE`] / [`THETA_BASE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OraclePrice {
    pub k: U256,
    pub eth_amount: U256,
    pub erc20_amount: U256,
    pub block_num: U256,
    pub theta: U256,
}

impl OraclePrice {
    /// `K_BASE - K`: the sell-side spread factor. Fails if `K >= K_BASE`.
    pub fn sell_spread(&self) -> Result<U256, AmmError> {
        wide::sub(K_BASE, self.k)
    }

    /// `K_BASE + K`: the buy-side spread factor.
    pub fn buy_spread(&self) -> Result<U256, AmmError> {
        wide::add(K_BASE, self.k)
    }

    /// `THETA_BASE - theta`: the post-fee fraction of trade value.
    pub fn fee_complement(&self) -> Result<U256, AmmError> {
        wide::sub(THETA_BASE, self.theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_have_expected_magnitudes() {
        assert_eq!(NAVPS_BASE, U256::exp10(18));
        assert_eq!(K_BASE, U256::exp10(8));
        assert_eq!(THETA_BASE, U256::exp10(8));
        assert_eq!(MINIMUM_LIQUIDITY, U256::exp10(9));
    }

    #[test]
    fn spread_factors() {
        let q = OraclePrice {
            k: U256::from(2_000_000u64),
            eth_amount: U256::exp10(18),
            erc20_amount: U256::exp10(20) * 3,
            block_num: U256::from(1u64),
            theta: U256::from(200_000u64),
        };
        assert_eq!(q.sell_spread().unwrap(), U256::from(98_000_000u64));
        assert_eq!(q.buy_spread().unwrap(), U256::from(102_000_000u64));
        assert_eq!(q.fee_complement().unwrap(), U256::from(99_800_000u64));
    }

    #[test]
    fn spread_beyond_base_is_rejected() {
        let q = OraclePrice {
            k: K_BASE + 1,
            eth_amount: U256::one(),
            erc20_amount: U256::one(),
            block_num: U256::zero(),
            theta: U256::zero(),
        };
        assert_eq!(q.sell_spread(), Err(AmmError::Overflow));
        // K equal to the base collapses the sell-side factor to zero, which
        // downstream formulas reject as a zero divisor.
        let q = OraclePrice { k: K_BASE, ..q };
        assert_eq!(q.sell_spread(), Ok(U256::zero()));
    }
}
