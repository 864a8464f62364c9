//! Oracle price gateway
//!
//! Synchronously requests a quote from the controller registered with the
//! factory, forwarding the native value attached to the settlement call.
//! The controller may keep part of that value as its query fee; what it
//! actually kept is measured as a balance delta around the call rather than
//! trusted from the request, and the remainder is reported back for refund.
//! The gateway performs no validation of quote freshness or bounds; that
//! trust boundary belongs to the controller.

use crate::collaborators::{NativeLedger, OracleOp, PoolFactory};
use crate::error::PairError;
use ethereum_types::{Address, U256};
use orapool_amm::OraclePrice;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct OraclePriceGateway {
    pool: Address,
    factory: Arc<dyn PoolFactory>,
    native: Arc<dyn NativeLedger>,
}

impl OraclePriceGateway {
    pub fn new(pool: Address, factory: Arc<dyn PoolFactory>, native: Arc<dyn NativeLedger>) -> Self {
        Self {
            pool,
            factory,
            native,
        }
    }

    /// Queries the controller and returns the quote together with the
    /// unspent portion of the attached native value.
    pub fn query(
        &self,
        asset: Address,
        op: OracleOp,
        payload: &[u8],
        attached: U256,
    ) -> Result<(OraclePrice, U256), PairError> {
        let before = self.native.balance_of(self.pool);
        let quote = self
            .factory
            .controller()
            .query(asset, op, payload, attached)
            .map_err(|e| PairError::OracleCallFailed(e.to_string()))?;
        let after = self.native.balance_of(self.pool);

        let spent = before.saturating_sub(after);
        if spent > attached {
            // Controller drew beyond the attached value; refund nothing.
            warn!(%spent, %attached, "oracle controller spent beyond attached value");
        }
        let unspent = attached.saturating_sub(spent);
        debug!(?asset, ?op, %attached, %spent, "oracle quote obtained");
        Ok((quote, unspent))
    }
}
