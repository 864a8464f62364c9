//! # Orapool Pair - Oracle-Priced Pool Settlement Engine
//!
//! ## Purpose
//!
//! Accounting and settlement core of a two-asset liquidity pool priced by an
//! external oracle. The pair tracks reserves of both assets, mints and burns
//! a proportional ownership share, and settles swaps quoted from
//! oracle-supplied exchange-rate and fee data. Price discovery never happens
//! here: every mutating call fetches a fresh quote through the oracle
//! gateway and trusts it for that single call.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Token balances and share supply from collaborator
//!   ledgers, per-call quotes from the oracle controller obtained via the
//!   factory
//! - **Output Destinations**: Token/share/native transfers through the
//!   collaborator traits, settlement events through the [`EventSink`]
//! - **Mathematics**: All closed-form valuation lives in `orapool-amm`
//! - **Safety**: A single-flight settlement lock rejects reentrant calls;
//!   reserves are reconciled against observed balances at the end of every
//!   mutating call
//!
//! ## Architecture Role
//!
//! ```text
//! caller ──> Pair (mint/burn/swap/skim/sync)
//!              ├── OraclePriceGateway ──> PoolFactory ──> OracleController
//!              ├── orapool-amm (NAV + swap + liquidity formulas)
//!              ├── TokenLedger / ShareLedger / NativeLedger transfers
//!              ├── fee routing (trade mining vs. LP vault)
//!              └── ReserveLedger reconciliation ──> EventSink
//! ```

pub mod collaborators;
pub mod config;
pub mod error;
pub mod events;
pub mod fee;
pub mod gateway;
pub mod ledger;
pub mod pair;
pub mod test_utils;

pub use collaborators::{
    CollaboratorError, NativeLedger, OracleController, OracleOp, PoolFactory, ShareLedger,
    TokenLedger,
};
pub use config::PairConfig;
pub use error::PairError;
pub use events::{EventSink, PoolEvent, RecordingSink, TracingSink};
pub use gateway::OraclePriceGateway;
pub use ledger::{ReserveLedger, RESERVE_LIMIT};
pub use pair::{CallContext, Pair, PairDeps, SwapSettlement, TradeInfo};

pub use orapool_amm::{OraclePrice, K_BASE, MINIMUM_LIQUIDITY, NAVPS_BASE, THETA_BASE};
