//! Reserve bookkeeping
//!
//! The single source of truth for how much of each asset the pool believes
//! it holds. Values are bounded to 112 bits; a reconciliation that would
//! exceed the bound fails the whole call and leaves the ledger untouched.

use crate::error::PairError;
use ethereum_types::U256;

/// Upper bound for each tracked reserve: `2^112 - 1`.
pub const RESERVE_LIMIT: U256 = U256([u64::MAX, 0x0000_FFFF_FFFF_FFFF, 0, 0]);

#[derive(Debug, Default, Clone)]
pub struct ReserveLedger {
    reserve0: U256,
    reserve1: U256,
}

impl ReserveLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> (U256, U256) {
        (self.reserve0, self.reserve1)
    }

    /// Overwrites both reserves with the externally observed balances after
    /// validating the 112-bit bound.
    pub fn update(&mut self, balance0: U256, balance1: U256) -> Result<(), PairError> {
        if balance0 > RESERVE_LIMIT || balance1 > RESERVE_LIMIT {
            return Err(PairError::Overflow);
        }
        self.reserve0 = balance0;
        self.reserve1 = balance1;
        Ok(())
    }
}
