//! Deterministic fakes for every collaborator trait
//!
//! Tests drive the pair against these instead of a chain environment. Each
//! fake is a small in-memory ledger with switches for the failure modes the
//! pair must handle (reverted calls, `false`-returning transfers, oracle fee
//! charges). `PairHarness` wires a fully initialized pair with recording
//! events for scenario tests.

use crate::collaborators::{
    CollaboratorError, NativeLedger, OracleController, OracleOp, PoolFactory, ShareLedger,
    TokenLedger,
};
use crate::config::PairConfig;
use crate::events::RecordingSink;
use crate::pair::{CallContext, Pair, PairDeps};
use ethereum_types::{Address, U256};
use orapool_amm::OraclePrice;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory ERC20-style ledger.
#[derive(Debug, Default)]
pub struct FakeToken {
    balances: Mutex<HashMap<Address, U256>>,
    return_false: AtomicBool,
    revert: AtomicBool,
}

impl FakeToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&self, owner: Address, amount: U256) {
        let mut balances = self.balances.lock();
        let entry = balances.entry(owner).or_insert_with(U256::zero);
        *entry = *entry + amount;
    }

    pub fn set_balance(&self, owner: Address, amount: U256) {
        self.balances.lock().insert(owner, amount);
    }

    /// Next transfers report `false` without moving funds.
    pub fn set_return_false(&self, value: bool) {
        self.return_false.store(value, Ordering::SeqCst);
    }

    /// Next transfers revert outright.
    pub fn set_revert(&self, value: bool) {
        self.revert.store(value, Ordering::SeqCst);
    }
}

impl TokenLedger for FakeToken {
    fn balance_of(&self, owner: Address) -> U256 {
        self.balances
            .lock()
            .get(&owner)
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<bool, CollaboratorError> {
        if self.revert.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Reverted("token transfer".into()));
        }
        if self.return_false.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let mut balances = self.balances.lock();
        let held = balances.get(&from).copied().unwrap_or_default();
        if held < value {
            return Ok(false);
        }
        balances.insert(from, held - value);
        let dest = balances.entry(to).or_insert_with(U256::zero);
        *dest = *dest + value;
        Ok(true)
    }
}

/// In-memory share ledger with supply tracking.
#[derive(Debug, Default)]
pub struct FakeShares {
    balances: Mutex<HashMap<Address, U256>>,
    total: Mutex<U256>,
    metadata: Mutex<Option<(String, String)>>,
}

impl FakeShares {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(&self) -> Option<(String, String)> {
        self.metadata.lock().clone()
    }

    /// Direct share movement, standing in for the external transfer path a
    /// redeemer uses to park shares on the pool before `burn`.
    pub fn transfer(&self, from: Address, to: Address, value: U256) {
        let mut balances = self.balances.lock();
        let held = balances.get(&from).copied().unwrap_or_default();
        assert!(held >= value, "fake share transfer exceeds balance");
        balances.insert(from, held - value);
        let dest = balances.entry(to).or_insert_with(U256::zero);
        *dest = *dest + value;
    }
}

impl ShareLedger for FakeShares {
    fn set_metadata(&self, name: &str, symbol: &str) {
        *self.metadata.lock() = Some((name.to_string(), symbol.to_string()));
    }

    fn total_supply(&self) -> U256 {
        *self.total.lock()
    }

    fn balance_of(&self, owner: Address) -> U256 {
        self.balances
            .lock()
            .get(&owner)
            .copied()
            .unwrap_or_default()
    }

    fn mint(&self, to: Address, value: U256) -> Result<(), CollaboratorError> {
        let mut balances = self.balances.lock();
        let dest = balances.entry(to).or_insert_with(U256::zero);
        *dest = *dest + value;
        let mut total = self.total.lock();
        *total = *total + value;
        Ok(())
    }

    fn burn(&self, from: Address, value: U256) -> Result<(), CollaboratorError> {
        let mut balances = self.balances.lock();
        let held = balances.get(&from).copied().unwrap_or_default();
        if held < value {
            return Err(CollaboratorError::Reverted("burn exceeds balance".into()));
        }
        balances.insert(from, held - value);
        let mut total = self.total.lock();
        *total = *total - value;
        Ok(())
    }
}

/// In-memory native-currency ledger.
#[derive(Debug, Default)]
pub struct FakeNative {
    balances: Mutex<HashMap<Address, U256>>,
}

impl FakeNative {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&self, owner: Address, amount: U256) {
        let mut balances = self.balances.lock();
        let entry = balances.entry(owner).or_insert_with(U256::zero);
        *entry = *entry + amount;
    }

    pub fn debit(&self, owner: Address, amount: U256) {
        let mut balances = self.balances.lock();
        let entry = balances.entry(owner).or_insert_with(U256::zero);
        *entry = entry.saturating_sub(amount);
    }
}

impl NativeLedger for FakeNative {
    fn balance_of(&self, owner: Address) -> U256 {
        self.balances
            .lock()
            .get(&owner)
            .copied()
            .unwrap_or_default()
    }

    fn transfer(
        &self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), CollaboratorError> {
        let mut balances = self.balances.lock();
        let held = balances.get(&from).copied().unwrap_or_default();
        if held < value {
            return Err(CollaboratorError::Reverted(
                "insufficient native balance".into(),
            ));
        }
        balances.insert(from, held - value);
        let dest = balances.entry(to).or_insert_with(U256::zero);
        *dest = *dest + value;
        Ok(())
    }
}

/// Scripted oracle controller: returns a configured quote and charges its
/// fee by pulling native currency off the payer, so gateway fee measurement
/// is exercised for real.
pub struct FakeController {
    native: Arc<FakeNative>,
    payer: Address,
    quote: Mutex<OraclePrice>,
    charge: Mutex<U256>,
    fail_next: AtomicBool,
    last_query: Mutex<Option<(Address, OracleOp, Vec<u8>, U256)>>,
}

impl FakeController {
    pub fn new(native: Arc<FakeNative>, payer: Address) -> Self {
        Self {
            native,
            payer,
            quote: Mutex::new(default_quote()),
            charge: Mutex::new(U256::zero()),
            fail_next: AtomicBool::new(false),
            last_query: Mutex::new(None),
        }
    }

    pub fn set_quote(&self, quote: OraclePrice) {
        *self.quote.lock() = quote;
    }

    pub fn set_charge(&self, charge: U256) {
        *self.charge.lock() = charge;
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn last_query(&self) -> Option<(Address, OracleOp, Vec<u8>, U256)> {
        self.last_query.lock().clone()
    }
}

impl OracleController for FakeController {
    fn query(
        &self,
        asset: Address,
        op: OracleOp,
        payload: &[u8],
        attached: U256,
    ) -> Result<OraclePrice, CollaboratorError> {
        *self.last_query.lock() = Some((asset, op, payload.to_vec(), attached));
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(CollaboratorError::Reverted("oracle offline".into()));
        }
        let charge = *self.charge.lock();
        if !charge.is_zero() {
            self.native.debit(self.payer, charge);
        }
        Ok(*self.quote.lock())
    }
}

/// Factory fake with settable policy flags.
pub struct FakeFactory {
    address: Address,
    controller: Arc<FakeController>,
    trade_mining: Mutex<HashMap<Address, bool>>,
    fee_receiver: Mutex<Address>,
    lp_fee_vaults: Mutex<HashMap<Address, Address>>,
}

impl FakeFactory {
    pub fn new(address: Address, controller: Arc<FakeController>) -> Self {
        Self {
            address,
            controller,
            trade_mining: Mutex::new(HashMap::new()),
            fee_receiver: Mutex::new(Address::zero()),
            lp_fee_vaults: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_trade_mining(&self, asset: Address, enabled: bool) {
        self.trade_mining.lock().insert(asset, enabled);
    }

    pub fn set_fee_receiver(&self, receiver: Address) {
        *self.fee_receiver.lock() = receiver;
    }

    pub fn set_lp_fee_vault(&self, asset: Address, vault: Address) {
        self.lp_fee_vaults.lock().insert(asset, vault);
    }
}

impl PoolFactory for FakeFactory {
    fn address(&self) -> Address {
        self.address
    }

    fn controller(&self) -> Arc<dyn OracleController> {
        self.controller.clone()
    }

    fn trade_mining_enabled(&self, asset: Address) -> bool {
        self.trade_mining
            .lock()
            .get(&asset)
            .copied()
            .unwrap_or(false)
    }

    fn fee_receiver(&self) -> Address {
        *self.fee_receiver.lock()
    }

    fn lp_fee_vault(&self, asset: Address) -> Address {
        self.lp_fee_vaults
            .lock()
            .get(&asset)
            .copied()
            .unwrap_or_else(Address::zero)
    }
}

/// Default quote: 300 asset1 per asset0, no spread, no fee.
pub fn default_quote() -> OraclePrice {
    OraclePrice {
        k: U256::zero(),
        eth_amount: U256::exp10(18),
        erc20_amount: U256::exp10(18) * 300,
        block_num: U256::one(),
        theta: U256::zero(),
    }
}

/// Unbuilt harness: collaborator set plus addresses, before `initialize`.
pub struct PairHarnessBuilder {
    pub pool_address: Address,
    pub factory_address: Address,
    pub user: Address,
    pub token0_address: Address,
    pub token1_address: Address,
    pub token0: Arc<FakeToken>,
    pub token1: Arc<FakeToken>,
    pub token1_ledger: Arc<dyn TokenLedger>,
    pub shares: Arc<FakeShares>,
    pub native: Arc<FakeNative>,
    pub controller: Arc<FakeController>,
    pub factory: Arc<FakeFactory>,
    pub events: Arc<RecordingSink>,
}

impl PairHarnessBuilder {
    fn default_parts() -> Self {
        let pool_address = Address::repeat_byte(0x0a);
        let factory_address = Address::repeat_byte(0xfa);
        let token0 = Arc::new(FakeToken::new());
        let token1 = Arc::new(FakeToken::new());
        let native = Arc::new(FakeNative::new());
        let controller = Arc::new(FakeController::new(native.clone(), pool_address));
        let factory = Arc::new(FakeFactory::new(factory_address, controller.clone()));
        Self {
            pool_address,
            factory_address,
            user: Address::repeat_byte(0xce),
            token0_address: Address::repeat_byte(0x10),
            token1_address: Address::repeat_byte(0x20),
            token1_ledger: token1.clone(),
            token0,
            token1,
            shares: Arc::new(FakeShares::new()),
            native,
            controller,
            factory,
            events: Arc::new(RecordingSink::new()),
        }
    }

    pub fn deps(&self) -> PairDeps {
        PairDeps {
            token0: self.token0.clone(),
            token1: self.token1_ledger.clone(),
            shares: self.shares.clone(),
            factory: self.factory.clone(),
            native: self.native.clone(),
            events: self.events.clone(),
        }
    }

    pub fn config(&self) -> PairConfig {
        PairConfig {
            token0: self.token0_address,
            token1: self.token1_address,
            name: "Orapool Share".to_string(),
            symbol: "OPS".to_string(),
        }
    }

    pub fn build(self) -> PairHarness {
        let ctx = CallContext::new(self.factory_address);
        let pair = Pair::initialize(&ctx, self.pool_address, self.deps(), self.config())
            .expect("factory-driven initialize");
        PairHarness {
            pair: Arc::new(pair),
            pool_address: self.pool_address,
            factory_address: self.factory_address,
            user: self.user,
            token0_address: self.token0_address,
            token1_address: self.token1_address,
            token0: self.token0,
            token1: self.token1,
            shares: self.shares,
            native: self.native,
            controller: self.controller,
            factory: self.factory,
            events: self.events,
        }
    }
}

/// Fully initialized pair wired to fakes.
pub struct PairHarness {
    pub pair: Arc<Pair>,
    pub pool_address: Address,
    pub factory_address: Address,
    pub user: Address,
    pub token0_address: Address,
    pub token1_address: Address,
    pub token0: Arc<FakeToken>,
    pub token1: Arc<FakeToken>,
    pub shares: Arc<FakeShares>,
    pub native: Arc<FakeNative>,
    pub controller: Arc<FakeController>,
    pub factory: Arc<FakeFactory>,
    pub events: Arc<RecordingSink>,
}

impl PairHarness {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> PairHarnessBuilder {
        PairHarnessBuilder::default_parts()
    }

    /// Builds with a custom ledger standing in for token1 (e.g. a reentrant
    /// attacker wrapping the given fake).
    pub fn with_token1(ledger: Arc<dyn TokenLedger>, fake: Arc<FakeToken>) -> Self {
        let mut builder = Self::builder();
        builder.token1_ledger = ledger;
        builder.token1 = fake;
        builder.build()
    }

    pub fn ctx(&self) -> CallContext {
        CallContext::new(self.user)
    }

    /// Simulates a user depositing asset0 directly onto the pool balance.
    pub fn deposit0(&self, amount: U256) {
        self.token0.credit(self.pool_address, amount);
    }

    /// Simulates a user depositing asset1 directly onto the pool balance.
    pub fn deposit1(&self, amount: U256) {
        self.token1.credit(self.pool_address, amount);
    }
}

impl Default for PairHarness {
    fn default() -> Self {
        Self::new()
    }
}
