//! Collaborator interfaces consumed by the pair
//!
//! The pair never talks to concrete ledgers, factories, or oracles; it holds
//! trait objects with the minimal capability set each collaborator exposes.
//! Production wires these to the host chain environment, tests substitute
//! the deterministic fakes in [`crate::test_utils`].

use ethereum_types::{Address, U256};
use orapool_amm::OraclePrice;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Failure surfaced by any collaborator call. A revert in the host
/// environment maps to this single variant; the pair decides how it
/// translates into its own taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("collaborator call reverted: {0}")]
    Reverted(String),
}

/// Fungible asset ledger for one tracked token.
pub trait TokenLedger: Send + Sync {
    fn balance_of(&self, owner: Address) -> U256;

    /// EVM-style transfer primitive. `Ok(false)` and `Err(_)` are both
    /// failures and must be treated identically by callers.
    fn transfer(&self, from: Address, to: Address, value: U256)
        -> Result<bool, CollaboratorError>;
}

/// The pool's ownership-share token ledger. Balance storage and transfer
/// semantics live outside the pair; only supply changes flow through here.
pub trait ShareLedger: Send + Sync {
    fn set_metadata(&self, name: &str, symbol: &str);
    fn total_supply(&self) -> U256;
    fn balance_of(&self, owner: Address) -> U256;
    fn mint(&self, to: Address, value: U256) -> Result<(), CollaboratorError>;
    fn burn(&self, from: Address, value: U256) -> Result<(), CollaboratorError>;
}

/// Native-currency accounting. Used for the oracle fee attached to mutating
/// calls and for refunding the unspent portion.
pub trait NativeLedger: Send + Sync {
    fn balance_of(&self, owner: Address) -> U256;
    fn transfer(&self, from: Address, to: Address, value: U256)
        -> Result<(), CollaboratorError>;
}

/// Operation kind forwarded to the oracle controller with each query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleOp {
    Mint,
    Burn,
    Swap,
}

/// External price oracle. The controller may retain part of the attached
/// native value as its query fee; the gateway measures what was actually
/// spent as a balance delta around the call. Quote freshness and bounds are
/// the controller's trust boundary, not the pair's.
pub trait OracleController: Send + Sync {
    fn query(
        &self,
        asset: Address,
        op: OracleOp,
        payload: &[u8],
        attached: U256,
    ) -> Result<OraclePrice, CollaboratorError>;
}

/// Registry that deployed this pair and owns global policy flags.
pub trait PoolFactory: Send + Sync {
    /// The factory's own account identity, used for the `initialize`
    /// authorization check.
    fn address(&self) -> Address;

    /// Current oracle controller. Looked up per call so the factory can
    /// migrate controllers without touching pairs.
    fn controller(&self) -> Arc<dyn OracleController>;

    /// Whether trade mining is enabled for the given counter asset.
    fn trade_mining_enabled(&self, asset: Address) -> bool;

    /// Protocol-wide reward pool receiving fees when trade mining is on.
    fn fee_receiver(&self) -> Address;

    /// Per-pair liquidity-provider fee vault used when trade mining is off.
    fn lp_fee_vault(&self, asset: Address) -> Address;
}
