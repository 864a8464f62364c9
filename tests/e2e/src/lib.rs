//! End-to-end scenario support for the oracle-priced pool
//!
//! Scenario tests drive a fully wired [`orapool_pair::Pair`] against the
//! deterministic fakes from `orapool_pair::test_utils` and assert the
//! observable contract: settlement results, emitted events, and the
//! reserves-track-balances invariant.

use ethereum_types::U256;
use orapool_amm::OraclePrice;
use std::sync::Once;

static INIT: Once = Once::new();

/// Installs the tracing subscriber once per test binary; `RUST_LOG` selects
/// verbosity.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn e18(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

pub fn quote(k: u64, eth_amount: U256, erc20_amount: U256, theta: u64) -> OraclePrice {
    OraclePrice {
        k: U256::from(k),
        eth_amount,
        erc20_amount,
        block_num: U256::one(),
        theta: U256::from(theta),
    }
}
