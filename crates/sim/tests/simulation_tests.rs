//! End-to-end simulation scenarios.

mod helpers;

use alloy_primitives::U256;
use helpers::{create_test_snapshot, usdc, usdc_amount, user, weth, START};
use morpho_p2p_sim::math::RAY;
use morpho_p2p_sim::{
    get_markets_data, get_user_max_capacity, simulate, CapacityLimitReason, Operation,
    OperationType, SimulationErrorKind, MAX_AMOUNT, SECONDS_PER_YEAR,
};

#[test]
fn test_supply_on_empty_market() {
    let snapshot = create_test_snapshot();
    let outcome = simulate(&snapshot, &[Operation::supply(usdc(), usdc_amount(100))]);

    assert!(outcome.error.is_none());
    assert_eq!(outcome.steps.len(), 1);

    let state = outcome.final_state.as_ref().unwrap();
    let market = state.market(&usdc()).unwrap();
    assert_eq!(market.total_morpho_supply, usdc_amount(100));
    assert_eq!(market.morpho_supply_in_p2p, U256::ZERO);

    let position = state.user.market(&usdc()).unwrap();
    assert_eq!(position.supply_on_pool, usdc_amount(100));
    assert_eq!(position.wallet_balance, usdc_amount(400));

    // the input snapshot is left untouched
    assert_eq!(snapshot, create_test_snapshot());
}

#[test]
fn test_borrow_past_capacity_is_flagged_not_aborted() {
    let snapshot = create_test_snapshot();
    let limit = get_user_max_capacity(&snapshot, &usdc(), OperationType::Borrow)
        .unwrap()
        .unwrap();
    assert_eq!(limit.reason, CapacityLimitReason::BorrowCapacity);

    let at_limit = simulate(&snapshot, &[Operation::borrow(usdc(), limit.value)]);
    assert!(at_limit.error.is_none());

    let over = simulate(
        &snapshot,
        &[Operation::borrow(usdc(), limit.value + U256::from(1u8))],
    );
    let error = over.error.unwrap();
    assert_eq!(error.index, 0);
    assert_eq!(error.kind, SimulationErrorKind::CollateralCapacityReached);
    assert!(!error.kind.is_blocking());
    assert!(over.final_state.is_some());
}

#[test]
fn test_empty_operation_list_is_idempotent() {
    let snapshot = create_test_snapshot();
    let outcome = simulate(&snapshot, &[]);

    assert!(outcome.error.is_none());
    assert!(outcome.steps.is_empty());

    let state = outcome.final_state.unwrap();
    assert_eq!(state.user.user, Some(user()));
    assert_eq!(state.snapshot, snapshot.accrue(START));
    assert_eq!(state.markets, get_markets_data(&snapshot).unwrap());
}

#[test]
fn test_capacity_is_deterministic() {
    let snapshot = create_test_snapshot();
    for operation in OperationType::ALL {
        for market in [weth(), usdc()] {
            assert_eq!(
                get_user_max_capacity(&snapshot, &market, operation),
                get_user_max_capacity(&snapshot, &market, operation),
            );
        }
    }
}

#[test]
fn test_max_supply_resolves_to_wallet_balance() {
    let snapshot = create_test_snapshot();
    let outcome = simulate(&snapshot, &[Operation::supply(usdc(), MAX_AMOUNT)]);

    assert!(outcome.error.is_none());
    let position = outcome.final_state.unwrap().user.market(&usdc()).cloned().unwrap();
    assert_eq!(position.supply_on_pool, usdc_amount(500));
    assert_eq!(position.wallet_balance, U256::ZERO);
}

#[test]
fn test_blocking_error_stops_fold() {
    let mut snapshot = create_test_snapshot();
    if let Some(config) = snapshot.configs.get_mut(&usdc()) {
        config.pause.is_borrow_paused = true;
    }
    let outcome = simulate(
        &snapshot,
        &[
            Operation::supply(usdc(), usdc_amount(100)),
            Operation::borrow(usdc(), usdc_amount(10)),
            Operation::supply(usdc(), usdc_amount(100)),
        ],
    );

    let error = outcome.error.unwrap();
    assert_eq!(error.index, 1);
    assert_eq!(error.kind, SimulationErrorKind::OperationPaused);
    assert_eq!(outcome.steps.len(), 1);
    assert!(outcome.final_state.is_none());
}

#[test]
fn test_aging_blends_p2p_between_pool_indexes() {
    let mut snapshot = create_test_snapshot();
    if let Some(state) = snapshot.markets.get_mut(&usdc()) {
        state.pool_reserve.liquidity_rate = RAY * U256::from(3u8) / U256::from(100u8);
        state.pool_reserve.variable_borrow_rate = RAY * U256::from(5u8) / U256::from(100u8);
    }
    if let Some(global) = snapshot.global.as_mut() {
        global.timestamp = START + SECONDS_PER_YEAR;
    }

    let markets = get_markets_data(&snapshot).unwrap();
    let market = markets.iter().find(|m| m.underlying == usdc()).unwrap();

    assert!(market.pool_supply_index > RAY);
    assert!(market.pool_supply_index < market.p2p_supply_index);
    assert_eq!(market.p2p_supply_index, market.p2p_borrow_index);
    assert!(market.p2p_borrow_index < market.pool_borrow_index);
    assert_eq!(market.last_update_timestamp, START + SECONDS_PER_YEAR);
}

#[test]
fn test_supply_then_borrow_against_it() {
    let snapshot = create_test_snapshot();
    let outcome = simulate(
        &snapshot,
        &[
            Operation::supply_collateral(usdc(), usdc_amount(500)),
            Operation::borrow(weth(), U256::from(10u8).pow(U256::from(17u8))),
        ],
    );

    assert!(outcome.error.is_none());
    assert_eq!(outcome.steps.len(), 2);
    let before = &outcome.steps[0].user;
    let after = &outcome.steps[1].user;
    assert!(after.health_factor < before.health_factor);
    assert!(after.borrow_capacity_used > before.borrow_capacity_used);
}
