//! Pair initialization settings
//!
//! Deployment plumbing hands the factory a TOML document per pair; the
//! factory feeds the parsed settings into [`Pair::initialize`]
//! (`crate::pair::Pair::initialize`).

use ethereum_types::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    /// Base (native-pegged) asset. Immutable after initialization.
    pub token0: Address,
    /// Counter asset. Immutable after initialization.
    pub token1: Address,
    /// Share token name.
    pub name: String,
    /// Share token symbol.
    pub symbol: String,
}

impl PairConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
