//! Settlement event notifications
//!
//! Append-only notifications of state changes, consumed by external
//! indexers. The pair publishes through the [`EventSink`] trait so the host
//! environment chooses delivery; the default sink logs through `tracing`
//! and tests use the in-memory [`RecordingSink`].

use ethereum_types::{Address, U256};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    Mint {
        sender: Address,
        amount0: U256,
        amount1: U256,
    },
    Burn {
        sender: Address,
        out_token: Address,
        amount_out: U256,
        to: Address,
    },
    Swap {
        sender: Address,
        amount_in: U256,
        amount_out: U256,
        out_token: Address,
        to: Address,
    },
    Sync {
        reserve0: U256,
        reserve1: U256,
    },
}

/// A destination for settlement events that abstracts away delivery.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PoolEvent);
}

/// Default sink: structured logs.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PoolEvent) {
        match &event {
            PoolEvent::Mint {
                sender,
                amount0,
                amount1,
            } => info!(?sender, %amount0, %amount1, "Mint"),
            PoolEvent::Burn {
                sender,
                out_token,
                amount_out,
                to,
            } => info!(?sender, ?out_token, %amount_out, ?to, "Burn"),
            PoolEvent::Swap {
                sender,
                amount_in,
                amount_out,
                out_token,
                to,
            } => info!(?sender, %amount_in, %amount_out, ?out_token, ?to, "Swap"),
            PoolEvent::Sync { reserve0, reserve1 } => info!(%reserve0, %reserve1, "Sync"),
        }
    }
}

/// In-memory sink capturing every event in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PoolEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn snapshot(&self) -> Vec<PoolEvent> {
        self.events.lock().clone()
    }

    /// Drains and returns the captured events.
    pub fn take(&self) -> Vec<PoolEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: PoolEvent) {
        self.events.lock().push(event);
    }
}
