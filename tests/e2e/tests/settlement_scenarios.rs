//! Full settlement scenarios over deterministic fakes
//!
//! Each test wires a fresh pair through `test_utils::PairHarness` and drives
//! it the way a router would: deposit onto the pool balance, call the entry
//! point, then check results, events, and the reserves-track-balances
//! invariant.

use anyhow::Result;
use assert_matches::assert_matches;
use ethereum_types::{Address, U256};
use orapool_amm::{calc_liquidity, MINIMUM_LIQUIDITY, NAVPS_BASE, THETA_BASE};
use orapool_e2e_tests::{e18, init_tracing, quote};
use orapool_pair::test_utils::PairHarness;
use orapool_pair::{NativeLedger, PairError, PoolEvent, ShareLedger, TokenLedger};

/// Reserves must equal externally observed balances after every mutating
/// call.
fn assert_reconciled(harness: &PairHarness) {
    assert_eq!(
        harness.pair.get_reserves(),
        (
            harness.token0.balance_of(harness.pool_address),
            harness.token1.balance_of(harness.pool_address),
        )
    );
}

#[test]
fn bootstrap_mint_matches_specified_scenario() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();
    // Quote straight from the reference scenario: K=0, rate 1:300, no fee.
    let q = quote(0, U256::one(), U256::from(300u64), 0);
    harness.controller.set_quote(q);

    harness.deposit0(e18(1));
    harness.deposit1(e18(300));
    let (liquidity, _) = harness.pair.mint(&harness.ctx(), harness.user)?;

    let expected_raw = calc_liquidity(e18(1), e18(300), NAVPS_BASE, &q)?;
    assert_eq!(liquidity, expected_raw - MINIMUM_LIQUIDITY);
    assert_eq!(harness.shares.total_supply(), expected_raw);
    assert_eq!(
        harness.shares.balance_of(Address::zero()),
        MINIMUM_LIQUIDITY
    );
    assert_eq!(harness.pair.get_reserves(), (e18(1), e18(300)));
    assert_reconciled(&harness);
    Ok(())
}

#[test]
fn neutral_nav_is_base_before_any_mint() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();
    let q = quote(0, U256::one(), U256::from(300u64), 0);
    assert_eq!(harness.pair.get_nav_per_share(&q)?, NAVPS_BASE);
    assert_eq!(harness.pair.get_nav_per_share_for_mint(&q)?, NAVPS_BASE);
    assert_eq!(harness.pair.get_nav_per_share_for_burn(&q)?, NAVPS_BASE);
    Ok(())
}

#[test]
fn liquidity_preview_matches_actual_mint() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();
    harness.deposit0(e18(1));
    harness.deposit1(e18(300));
    harness.pair.mint(&harness.ctx(), harness.user)?;

    let q = orapool_pair::test_utils::default_quote();
    let preview = harness.pair.get_liquidity(e18(2), e18(600), &q)?;

    harness.deposit0(e18(2));
    harness.deposit1(e18(600));
    let (minted, _) = harness.pair.mint(&harness.ctx(), harness.user)?;
    assert_eq!(preview, minted);
    Ok(())
}

#[test]
fn burn_with_untracked_asset_leaves_reserves_unchanged() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();
    harness.deposit0(e18(1));
    harness.deposit1(e18(300));
    harness.pair.mint(&harness.ctx(), harness.user)?;
    let reserves = harness.pair.get_reserves();
    let events_before = harness.events.snapshot().len();

    let err = harness
        .pair
        .burn(&harness.ctx(), Address::repeat_byte(0xbb), harness.user);
    assert_matches!(err, Err(PairError::WrongOutToken));
    assert_eq!(harness.pair.get_reserves(), reserves);
    assert_eq!(harness.events.snapshot().len(), events_before);
    Ok(())
}

#[test]
fn burn_round_trip_returns_deposit_minus_locked_minimum() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();
    harness.deposit0(e18(4));
    let (liquidity, _) = harness.pair.mint(&harness.ctx(), harness.user)?;

    // Park every redeemable share on the pool and burn into asset0.
    harness
        .shares
        .transfer(harness.user, harness.pool_address, liquidity);
    let (amount_out, _) = harness
        .pair
        .burn(&harness.ctx(), harness.token0_address, harness.user)?;

    // Only the locked minimum's worth of asset0 stays behind.
    assert_eq!(amount_out, e18(4) - MINIMUM_LIQUIDITY);
    assert_eq!(harness.token0.balance_of(harness.user), amount_out);
    assert_reconciled(&harness);
    Ok(())
}

#[test]
fn exact_out_swap_refunds_excess_input() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();
    harness.deposit0(e18(1));
    harness.deposit1(e18(300));
    harness.pair.mint(&harness.ctx(), harness.user)?;

    // Tender 2 asset0 where the inverse formula needs exactly 1.
    harness.deposit0(e18(2));
    let settlement = harness.pair.swap_for_exact(
        &harness.ctx(),
        harness.token1_address,
        e18(300),
        harness.user,
    )?;

    assert_eq!(settlement.amount_in, e18(1));
    assert_eq!(settlement.amount_out, e18(300));
    // Exactly the excess came back in the input asset.
    assert_eq!(harness.token0.balance_of(harness.user), e18(1));
    assert_eq!(harness.token1.balance_of(harness.user), e18(300));
    // Reserves reconcile to the post-refund balances.
    assert_eq!(harness.pair.get_reserves(), (e18(2), U256::zero()));
    assert_reconciled(&harness);
    Ok(())
}

#[test]
fn exact_out_swap_with_insufficient_input_aborts() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();
    harness.deposit0(e18(1));
    harness.deposit1(e18(300));
    harness.pair.mint(&harness.ctx(), harness.user)?;
    let reserves = harness.pair.get_reserves();

    harness.deposit0(e18(1));
    let err = harness.pair.swap_for_exact(
        &harness.ctx(),
        harness.token1_address,
        e18(600),
        harness.user,
    );
    assert_matches!(err, Err(PairError::InsufficientAmountIn));
    assert_eq!(harness.pair.get_reserves(), reserves);
    Ok(())
}

#[test]
fn swap_fee_is_proportional_to_theta_and_routed_to_lp_vault() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();
    let vault = Address::repeat_byte(0x77);
    harness
        .factory
        .set_lp_fee_vault(harness.token1_address, vault);
    // 1% fee.
    harness
        .controller
        .set_quote(quote(0, e18(1), e18(300), 1_000_000));

    harness.deposit0(e18(10));
    harness.deposit1(e18(3000));
    harness.pair.mint(&harness.ctx(), harness.user)?;

    harness.deposit0(e18(1));
    let settlement =
        harness
            .pair
            .swap_with_exact(&harness.ctx(), harness.token1_address, harness.user)?;

    let expected_fee = e18(1) * U256::from(1_000_000u64) / THETA_BASE;
    assert_eq!(settlement.trade_info.fee, expected_fee);
    assert_eq!(harness.token0.balance_of(vault), expected_fee);
    // Output reduced by the same theta.
    assert_eq!(settlement.amount_out, e18(297));
    assert_reconciled(&harness);
    Ok(())
}

#[test]
fn zero_theta_charges_no_fee_on_any_path() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();
    let vault = Address::repeat_byte(0x77);
    harness
        .factory
        .set_lp_fee_vault(harness.token1_address, vault);

    harness.deposit0(e18(10));
    harness.deposit1(e18(3000));
    harness.pair.mint(&harness.ctx(), harness.user)?;

    harness.deposit0(e18(1));
    let swap =
        harness
            .pair
            .swap_with_exact(&harness.ctx(), harness.token1_address, harness.user)?;
    assert_eq!(swap.trade_info.fee, U256::zero());

    harness.deposit1(e18(300));
    let swap =
        harness
            .pair
            .swap_with_exact(&harness.ctx(), harness.token0_address, harness.user)?;
    assert_eq!(swap.trade_info.fee, U256::zero());

    assert_eq!(harness.token0.balance_of(vault), U256::zero());
    assert_reconciled(&harness);
    Ok(())
}

#[test]
fn trade_mining_redirects_fee_to_reward_pool() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();
    let vault = Address::repeat_byte(0x77);
    let rewards = Address::repeat_byte(0x88);
    harness
        .factory
        .set_lp_fee_vault(harness.token1_address, vault);
    harness.factory.set_fee_receiver(rewards);
    harness
        .factory
        .set_trade_mining(harness.token1_address, true);
    harness
        .controller
        .set_quote(quote(0, e18(1), e18(300), 1_000_000));

    harness.deposit0(e18(10));
    harness.deposit1(e18(3000));
    harness.pair.mint(&harness.ctx(), harness.user)?;

    harness.deposit0(e18(1));
    let settlement =
        harness
            .pair
            .swap_with_exact(&harness.ctx(), harness.token1_address, harness.user)?;

    assert_eq!(harness.token0.balance_of(rewards), settlement.trade_info.fee);
    assert_eq!(harness.token0.balance_of(vault), U256::zero());
    Ok(())
}

#[test]
fn reserves_track_balances_across_a_whole_session() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();

    harness.deposit0(e18(5));
    harness.deposit1(e18(1500));
    harness.pair.mint(&harness.ctx(), harness.user)?;
    assert_reconciled(&harness);

    harness.deposit0(e18(1));
    harness
        .pair
        .swap_with_exact(&harness.ctx(), harness.token1_address, harness.user)?;
    assert_reconciled(&harness);

    harness.deposit1(e18(300));
    harness
        .pair
        .swap_with_exact(&harness.ctx(), harness.token0_address, harness.user)?;
    assert_reconciled(&harness);

    let redeem = harness.shares.balance_of(harness.user) / 4;
    harness
        .shares
        .transfer(harness.user, harness.pool_address, redeem);
    harness
        .pair
        .burn(&harness.ctx(), harness.token1_address, harness.user)?;
    assert_reconciled(&harness);

    harness.deposit1(e18(7));
    harness.pair.sync()?;
    assert_reconciled(&harness);
    Ok(())
}

#[test]
fn settlement_events_are_emitted_in_order() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();

    harness.deposit0(e18(1));
    harness.deposit1(e18(300));
    harness.pair.mint(&harness.ctx(), harness.user)?;

    harness.deposit0(e18(1));
    harness
        .pair
        .swap_with_exact(&harness.ctx(), harness.token1_address, harness.user)?;

    let events = harness.events.take();
    assert_matches!(events[0].clone(), PoolEvent::Sync { .. });
    assert_matches!(
        events[1].clone(),
        PoolEvent::Mint { sender, amount0, amount1 }
            if sender == harness.user && amount0 == e18(1) && amount1 == e18(300)
    );
    assert_matches!(events[2].clone(), PoolEvent::Sync { .. });
    assert_matches!(
        events[3].clone(),
        PoolEvent::Swap { amount_in, out_token, .. }
            if amount_in == e18(1) && out_token == harness.token1_address
    );
    Ok(())
}

#[test]
fn oracle_fee_round_trip_refunds_unspent_value() -> Result<()> {
    init_tracing();
    let harness = PairHarness::new();
    harness.deposit0(e18(1));
    harness.deposit1(e18(300));

    // Host credits the attached value to the pool before the call; the
    // controller keeps 30 of the 100 attached.
    harness
        .native
        .credit(harness.pool_address, U256::from(100u64));
    harness.controller.set_charge(U256::from(30u64));

    let ctx = orapool_pair::CallContext::with_value(harness.user, U256::from(100u64));
    let (_, refund) = harness.pair.mint(&ctx, harness.user)?;
    assert_eq!(refund, U256::from(70u64));
    assert_eq!(harness.native.balance_of(harness.user), U256::from(70u64));

    let last = harness.controller.last_query().expect("controller queried");
    assert_eq!(last.0, harness.token1_address);
    assert_eq!(last.3, U256::from(100u64));
    Ok(())
}
