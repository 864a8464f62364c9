//! Settlement failure taxonomy
//!
//! Every failure aborts the whole operation; there is no partial-effect or
//! retry path inside the pair. The host environment is expected to discard
//! any transfers already performed when a call returns an error.

use orapool_amm::AmmError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairError {
    /// A mutating entry point was invoked while another one was mid-flight.
    #[error("reentrant call rejected: settlement already in progress")]
    Locked,

    /// `initialize` was invoked by an account other than the factory.
    #[error("caller is not the factory")]
    Forbidden,

    /// A reserve value exceeded the 112-bit bound, or balance arithmetic
    /// around reserve tracking underflowed.
    #[error("reserve accounting overflow")]
    Overflow,

    /// A token, share, or native transfer primitive reported failure. Both a
    /// `false` return and a reverted call land here.
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Computed liquidity to mint was not strictly positive.
    #[error("minted liquidity not strictly positive")]
    ShortLiquidityMinted,

    /// Computed redemption amount was not strictly positive.
    #[error("burned amount not strictly positive")]
    ShortLiquidityBurned,

    /// Requested output asset is neither tracked asset of this pair.
    #[error("requested output asset is not tracked by this pair")]
    WrongOutToken,

    /// Inferred input amount (balance excess over reserve) was not strictly
    /// positive.
    #[error("inferred input amount not strictly positive")]
    WrongAmountIn,

    /// Required input amount derived by the inverse formula was not strictly
    /// positive.
    #[error("required input amount not strictly positive")]
    WrongAmountInNeeded,

    /// Tendered input below the amount required for the requested output.
    #[error("tendered input below required amount")]
    InsufficientAmountIn,

    /// Recipient equals a tracked asset address, which would corrupt
    /// balance-delta inference on a subsequent call.
    #[error("recipient must not be a tracked asset address")]
    InvalidTo,

    /// The oracle controller rejected or failed the price query.
    #[error("oracle query failed: {0}")]
    OracleCallFailed(String),

    /// A pool formula hit a fatal arithmetic condition.
    #[error("pool math failed: {0}")]
    Math(#[from] AmmError),
}
