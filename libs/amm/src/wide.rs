//! Checked wide-integer helpers
//!
//! Every formula in this crate multiplies first and divides last. These
//! helpers make the overflow check explicit at each step so an overflowing
//! intermediate fails the whole calculation instead of wrapping.

use crate::AmmError;
use ethereum_types::U256;

/// Checked multiplication.
pub fn mul(a: U256, b: U256) -> Result<U256, AmmError> {
    a.checked_mul(b).ok_or(AmmError::Overflow)
}

/// Checked addition.
pub fn add(a: U256, b: U256) -> Result<U256, AmmError> {
    a.checked_add(b).ok_or(AmmError::Overflow)
}

/// Checked subtraction. Underflow is treated the same as overflow: a fatal
/// arithmetic fault for the calling formula.
pub fn sub(a: U256, b: U256) -> Result<U256, AmmError> {
    a.checked_sub(b).ok_or(AmmError::Overflow)
}

/// Floor division with an explicit zero-divisor check.
pub fn div(a: U256, b: U256) -> Result<U256, AmmError> {
    if b.is_zero() {
        return Err(AmmError::DividedByZero);
    }
    Ok(a / b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_overflow_is_reported() {
        let big = U256::MAX / 2 + 1;
        assert_eq!(mul(big, U256::from(2u64)), Err(AmmError::Overflow));
        assert_eq!(mul(big, U256::one()), Ok(big));
    }

    #[test]
    fn sub_underflow_is_reported() {
        assert_eq!(sub(U256::one(), U256::from(2u64)), Err(AmmError::Overflow));
    }

    #[test]
    fn div_floors_and_rejects_zero() {
        assert_eq!(div(U256::from(7u64), U256::from(2u64)), Ok(U256::from(3u64)));
        assert_eq!(div(U256::one(), U256::zero()), Err(AmmError::DividedByZero));
    }
}
