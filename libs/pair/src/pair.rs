//! Pool settlement orchestration
//!
//! Every mutating entry point follows the same discipline:
//!
//! 1. acquire the single-flight settlement lock (reentrant calls fail
//!    immediately with [`PairError::Locked`])
//! 2. read tracked reserves and externally observed balances
//! 3. query the oracle gateway, measuring the unspent fee as a balance delta
//! 4. run the closed-form math from `orapool-amm`
//! 5. perform asset/share transfers optimistically
//! 6. route the collected fee
//! 7. re-read balances and reconcile reserves (the last state-mutating step)
//! 8. refund the unspent oracle fee and emit the settlement event
//!
//! The ordering is load-bearing: later steps consume balances observed after
//! earlier transfers, and the final reconciliation is what keeps reserves
//! equal to held balances across calls. Atomicity on failure is provided by
//! the host environment, not here; the pair only guarantees it either runs
//! the whole sequence or returns an error.

use crate::collaborators::{NativeLedger, OracleOp, PoolFactory, ShareLedger, TokenLedger};
use crate::config::PairConfig;
use crate::error::PairError;
use crate::events::{EventSink, PoolEvent};
use crate::fee::route_fee;
use crate::gateway::OraclePriceGateway;
use crate::ledger::ReserveLedger;
use ethereum_types::{Address, U256};
use orapool_amm::{self as amm, OraclePrice, MINIMUM_LIQUIDITY};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info};

/// Caller identity and attached native value for one entry-point call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub sender: Address,
    pub attached: U256,
}

impl CallContext {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            attached: U256::zero(),
        }
    }

    pub fn with_value(sender: Address, attached: U256) -> Self {
        Self { sender, attached }
    }
}

/// Collaborator handles wired in at deployment.
#[derive(Clone)]
pub struct PairDeps {
    pub token0: Arc<dyn TokenLedger>,
    pub token1: Arc<dyn TokenLedger>,
    pub shares: Arc<dyn ShareLedger>,
    pub factory: Arc<dyn PoolFactory>,
    pub native: Arc<dyn NativeLedger>,
    pub events: Arc<dyn EventSink>,
}

/// Auxiliary trade state reported alongside swap results. Not consumed
/// inside the pair; an external routing layer uses the fee and the valuation
/// references to decide further action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeInfo {
    /// Fee charged, denominated in asset0.
    pub fee: U256,
    /// Valuation reference: asset0 leg of the exchange rate used.
    pub eth_amount: U256,
    /// Valuation reference: asset1 leg of the exchange rate used.
    pub erc20_amount: U256,
    /// Freshness marker of the quote used.
    pub block_num: U256,
}

/// Outcome of a swap settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapSettlement {
    /// Input actually consumed by the trade.
    pub amount_in: U256,
    /// Output transferred to the recipient.
    pub amount_out: U256,
    /// Unspent oracle fee refunded to the caller.
    pub oracle_refund: U256,
    pub trade_info: TradeInfo,
}

/// Shares locked on the first mint are assigned here and can never move.
fn burn_address() -> Address {
    Address::zero()
}

pub struct Pair {
    address: Address,
    token0: Address,
    token1: Address,
    deps: PairDeps,
    /// Single-flight settlement lock; a failed `try_lock` is the `Locked`
    /// error. Held for the entire duration of every mutating entry point.
    guard: Mutex<()>,
    reserves: RwLock<ReserveLedger>,
}

impl std::fmt::Debug for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pair")
            .field("address", &self.address)
            .field("token0", &self.token0)
            .field("token1", &self.token1)
            .finish_non_exhaustive()
    }
}

impl Pair {
    /// One-time setup, callable only by the factory.
    pub fn initialize(
        ctx: &CallContext,
        address: Address,
        deps: PairDeps,
        config: PairConfig,
    ) -> Result<Self, PairError> {
        if ctx.sender != deps.factory.address() {
            return Err(PairError::Forbidden);
        }
        deps.shares.set_metadata(&config.name, &config.symbol);
        info!(?address, token0 = ?config.token0, token1 = ?config.token1, "pair initialized");
        Ok(Self {
            address,
            token0: config.token0,
            token1: config.token1,
            deps,
            guard: Mutex::new(()),
            reserves: RwLock::new(ReserveLedger::new()),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }

    pub fn get_reserves(&self) -> (U256, U256) {
        self.reserves.read().get()
    }

    /// Neutral NAV-per-share for a caller-supplied quote.
    pub fn get_nav_per_share(&self, quote: &OraclePrice) -> Result<U256, PairError> {
        let (reserve0, reserve1) = self.get_reserves();
        Ok(amm::nav_per_share(
            reserve0,
            reserve1,
            self.deps.shares.total_supply(),
            quote,
        )?)
    }

    /// Mint-adjusted NAV-per-share for a caller-supplied quote.
    pub fn get_nav_per_share_for_mint(&self, quote: &OraclePrice) -> Result<U256, PairError> {
        let (reserve0, reserve1) = self.get_reserves();
        Ok(amm::nav_per_share_for_mint(
            reserve0,
            reserve1,
            self.deps.shares.total_supply(),
            quote,
        )?)
    }

    /// Burn-adjusted NAV-per-share for a caller-supplied quote.
    pub fn get_nav_per_share_for_burn(&self, quote: &OraclePrice) -> Result<U256, PairError> {
        let (reserve0, reserve1) = self.get_reserves();
        Ok(amm::nav_per_share_for_burn(
            reserve0,
            reserve1,
            self.deps.shares.total_supply(),
            quote,
        )?)
    }

    /// Previews the shares a deposit would mint at the current reserves.
    pub fn get_liquidity(
        &self,
        amount0: U256,
        amount1: U256,
        quote: &OraclePrice,
    ) -> Result<U256, PairError> {
        let (reserve0, reserve1) = self.get_reserves();
        let navps = amm::nav_per_share_for_mint(
            reserve0,
            reserve1,
            self.deps.shares.total_supply(),
            quote,
        )?;
        Ok(amm::calc_liquidity(amount0, amount1, navps, quote)?)
    }

    /// Mints shares for whatever both-asset deposit has landed on the pool's
    /// balances since the last reconciliation. Returns the minted liquidity
    /// and the unspent oracle fee refunded to the caller.
    pub fn mint(&self, ctx: &CallContext, to: Address) -> Result<(U256, U256), PairError> {
        let _settlement = self.guard.try_lock().ok_or(PairError::Locked)?;

        let (reserve0, reserve1) = self.reserves.read().get();
        let balance0 = self.deps.token0.balance_of(self.address);
        let balance1 = self.deps.token1.balance_of(self.address);
        let deposited0 = deposit_delta(balance0, reserve0)?;
        let deposited1 = deposit_delta(balance1, reserve1)?;
        let total_shares = self.deps.shares.total_supply();

        let (quote, unspent) = self.gateway().query(
            self.token1,
            OracleOp::Mint,
            ctx.sender.as_bytes(),
            ctx.attached,
        )?;

        let navps = amm::nav_per_share_for_mint(reserve0, reserve1, total_shares, &quote)?;
        let raw = amm::calc_liquidity(deposited0, deposited1, navps, &quote)?;
        let liquidity = if total_shares.is_zero() {
            // First mint: the minimum is minted to the burn address and can
            // never be redeemed.
            let after_lock = raw
                .checked_sub(MINIMUM_LIQUIDITY)
                .ok_or(PairError::ShortLiquidityMinted)?;
            self.mint_shares(burn_address(), MINIMUM_LIQUIDITY)?;
            after_lock
        } else {
            raw
        };
        if liquidity.is_zero() {
            return Err(PairError::ShortLiquidityMinted);
        }
        self.mint_shares(to, liquidity)?;

        self.reconcile()?;
        self.refund_oracle_fee(ctx.sender, unspent)?;
        self.deps.events.emit(PoolEvent::Mint {
            sender: ctx.sender,
            amount0: deposited0,
            amount1: deposited1,
        });
        debug!(%liquidity, %navps, "mint settled");
        Ok((liquidity, unspent))
    }

    /// Redeems the pool-held share balance into the chosen output asset.
    /// Returns the amount paid out and the unspent oracle fee.
    pub fn burn(
        &self,
        ctx: &CallContext,
        out_token: Address,
        to: Address,
    ) -> Result<(U256, U256), PairError> {
        let _settlement = self.guard.try_lock().ok_or(PairError::Locked)?;

        if out_token != self.token0 && out_token != self.token1 {
            return Err(PairError::WrongOutToken);
        }
        let (reserve0, reserve1) = self.reserves.read().get();
        let liquidity = self.deps.shares.balance_of(self.address);
        let total_shares = self.deps.shares.total_supply();

        let (quote, unspent) = self.gateway().query(
            self.token1,
            OracleOp::Burn,
            ctx.sender.as_bytes(),
            ctx.attached,
        )?;

        let navps = amm::nav_per_share_for_burn(reserve0, reserve1, total_shares, &quote)?;
        let settled = if out_token == self.token0 {
            amm::calc_out_token0_for_burn(liquidity, navps, &quote)?
        } else {
            amm::calc_out_token1_for_burn(liquidity, navps, &quote)?
        };
        if settled.amount_out.is_zero() {
            return Err(PairError::ShortLiquidityBurned);
        }

        self.deps
            .shares
            .burn(self.address, liquidity)
            .map_err(|e| PairError::TransferFailed(e.to_string()))?;
        self.transfer_asset(out_token, to, settled.amount_out)?;
        route_fee(
            &*self.deps.factory,
            &*self.deps.token0,
            self.address,
            self.token1,
            settled.fee,
        )?;

        self.reconcile()?;
        self.refund_oracle_fee(ctx.sender, unspent)?;
        self.deps.events.emit(PoolEvent::Burn {
            sender: ctx.sender,
            out_token,
            amount_out: settled.amount_out,
            to,
        });
        debug!(%liquidity, amount_out = %settled.amount_out, "burn settled");
        Ok((settled.amount_out, unspent))
    }

    /// Exact-input swap: the caller has already deposited the input asset;
    /// the input amount is inferred as the balance excess over the tracked
    /// reserve of the asset opposite to the requested output.
    pub fn swap_with_exact(
        &self,
        ctx: &CallContext,
        out_token: Address,
        to: Address,
    ) -> Result<SwapSettlement, PairError> {
        let _settlement = self.guard.try_lock().ok_or(PairError::Locked)?;

        let (reserve0, reserve1) = self.reserves.read().get();
        let amount_in = if out_token == self.token0 {
            swap_amount_in(self.deps.token1.balance_of(self.address), reserve1)?
        } else if out_token == self.token1 {
            swap_amount_in(self.deps.token0.balance_of(self.address), reserve0)?
        } else {
            return Err(PairError::WrongOutToken);
        };

        let (quote, unspent) = self.gateway().query(
            self.token1,
            OracleOp::Swap,
            ctx.sender.as_bytes(),
            ctx.attached,
        )?;

        let out = if out_token == self.token0 {
            amm::calc_out_token0(amount_in, &quote)?
        } else {
            amm::calc_out_token1(amount_in, &quote)?
        };
        if to == self.token0 || to == self.token1 {
            return Err(PairError::InvalidTo);
        }

        self.transfer_asset(out_token, to, out.amount_out)?;
        route_fee(
            &*self.deps.factory,
            &*self.deps.token0,
            self.address,
            self.token1,
            out.fee,
        )?;

        self.reconcile()?;
        self.refund_oracle_fee(ctx.sender, unspent)?;
        self.deps.events.emit(PoolEvent::Swap {
            sender: ctx.sender,
            amount_in,
            amount_out: out.amount_out,
            out_token,
            to,
        });
        debug!(%amount_in, amount_out = %out.amount_out, fee = %out.fee, "exact-in swap settled");
        Ok(SwapSettlement {
            amount_in,
            amount_out: out.amount_out,
            oracle_refund: unspent,
            trade_info: TradeInfo {
                fee: out.fee,
                eth_amount: quote.eth_amount,
                erc20_amount: quote.erc20_amount,
                block_num: quote.block_num,
            },
        })
    }

    /// Exact-output swap: the tendered input may exceed what the inverse
    /// formula requires; the excess is refunded to the recipient before the
    /// output transfer. The reported input is the amount actually consumed.
    pub fn swap_for_exact(
        &self,
        ctx: &CallContext,
        out_token: Address,
        amount_out_exact: U256,
        to: Address,
    ) -> Result<SwapSettlement, PairError> {
        let _settlement = self.guard.try_lock().ok_or(PairError::Locked)?;

        let (reserve0, reserve1) = self.reserves.read().get();
        let (amount_in, in_token) = if out_token == self.token0 {
            (
                swap_amount_in(self.deps.token1.balance_of(self.address), reserve1)?,
                self.token1,
            )
        } else if out_token == self.token1 {
            (
                swap_amount_in(self.deps.token0.balance_of(self.address), reserve0)?,
                self.token0,
            )
        } else {
            return Err(PairError::WrongOutToken);
        };

        let (quote, unspent) = self.gateway().query(
            self.token1,
            OracleOp::Swap,
            ctx.sender.as_bytes(),
            ctx.attached,
        )?;
        if to == self.token0 || to == self.token1 {
            return Err(PairError::InvalidTo);
        }

        // Fee follows the derived requirement, not the tendered amount.
        let (needed, fee) = if out_token == self.token0 {
            let needed = amm::calc_in_needed_token1(amount_out_exact, &quote)?;
            (needed, amm::calc_out_token0(needed, &quote)?.fee)
        } else {
            let needed = amm::calc_in_needed_token0(amount_out_exact, &quote)?;
            (needed, amm::calc_out_token1(needed, &quote)?.fee)
        };
        if amount_in < needed {
            return Err(PairError::InsufficientAmountIn);
        }
        if needed.is_zero() {
            return Err(PairError::WrongAmountInNeeded);
        }

        let excess = amount_in - needed;
        if !excess.is_zero() {
            self.transfer_asset(in_token, to, excess)?;
        }
        self.transfer_asset(out_token, to, amount_out_exact)?;
        route_fee(
            &*self.deps.factory,
            &*self.deps.token0,
            self.address,
            self.token1,
            fee,
        )?;

        self.reconcile()?;
        self.refund_oracle_fee(ctx.sender, unspent)?;
        self.deps.events.emit(PoolEvent::Swap {
            sender: ctx.sender,
            amount_in: needed,
            amount_out: amount_out_exact,
            out_token,
            to,
        });
        debug!(%needed, %excess, amount_out = %amount_out_exact, "exact-out swap settled");
        Ok(SwapSettlement {
            amount_in: needed,
            amount_out: amount_out_exact,
            oracle_refund: unspent,
            trade_info: TradeInfo {
                fee,
                eth_amount: quote.eth_amount,
                erc20_amount: quote.erc20_amount,
                block_num: quote.block_num,
            },
        })
    }

    /// Forwards any balance in excess of tracked reserves to `to`. Recovers
    /// tokens sent directly to the pool without going through mint/swap.
    pub fn skim(&self, to: Address) -> Result<(), PairError> {
        let _settlement = self.guard.try_lock().ok_or(PairError::Locked)?;

        let (reserve0, reserve1) = self.reserves.read().get();
        let excess0 = deposit_delta(self.deps.token0.balance_of(self.address), reserve0)?;
        if !excess0.is_zero() {
            self.transfer_asset(self.token0, to, excess0)?;
        }
        let excess1 = deposit_delta(self.deps.token1.balance_of(self.address), reserve1)?;
        if !excess1.is_zero() {
            self.transfer_asset(self.token1, to, excess1)?;
        }
        debug!(%excess0, %excess1, ?to, "skimmed");
        Ok(())
    }

    /// Forces reserves to match current balances without moving any assets.
    pub fn sync(&self) -> Result<(), PairError> {
        let _settlement = self.guard.try_lock().ok_or(PairError::Locked)?;
        self.reconcile()
    }

    fn gateway(&self) -> OraclePriceGateway {
        OraclePriceGateway::new(
            self.address,
            self.deps.factory.clone(),
            self.deps.native.clone(),
        )
    }

    fn token_ledger(&self, asset: Address) -> &Arc<dyn TokenLedger> {
        if asset == self.token0 {
            &self.deps.token0
        } else {
            &self.deps.token1
        }
    }

    fn transfer_asset(&self, asset: Address, to: Address, amount: U256) -> Result<(), PairError> {
        match self.token_ledger(asset).transfer(self.address, to, amount) {
            Ok(true) => Ok(()),
            Ok(false) => Err(PairError::TransferFailed(format!(
                "transfer of {amount} to {to:?} returned false"
            ))),
            Err(e) => Err(PairError::TransferFailed(e.to_string())),
        }
    }

    fn mint_shares(&self, to: Address, value: U256) -> Result<(), PairError> {
        self.deps
            .shares
            .mint(to, value)
            .map_err(|e| PairError::TransferFailed(e.to_string()))
    }

    /// Re-reads both balances and rewrites reserves. Always the last
    /// state-mutating step of a settlement.
    fn reconcile(&self) -> Result<(), PairError> {
        let balance0 = self.deps.token0.balance_of(self.address);
        let balance1 = self.deps.token1.balance_of(self.address);
        self.reserves.write().update(balance0, balance1)?;
        self.deps.events.emit(PoolEvent::Sync {
            reserve0: balance0,
            reserve1: balance1,
        });
        Ok(())
    }

    fn refund_oracle_fee(&self, to: Address, unspent: U256) -> Result<(), PairError> {
        if unspent.is_zero() {
            return Ok(());
        }
        self.deps
            .native
            .transfer(self.address, to, unspent)
            .map_err(|e| PairError::TransferFailed(e.to_string()))
    }
}

/// Balance excess over the tracked reserve for deposits and skims. A balance
/// below the reserve means internal accounting has drifted; that is fatal.
fn deposit_delta(balance: U256, reserve: U256) -> Result<U256, PairError> {
    balance.checked_sub(reserve).ok_or(PairError::Overflow)
}

/// Strictly-positive balance excess required as swap input.
fn swap_amount_in(balance: U256, reserve: U256) -> Result<U256, PairError> {
    match balance.checked_sub(reserve) {
        Some(excess) if !excess.is_zero() => Ok(excess),
        _ => Err(PairError::WrongAmountIn),
    }
}
