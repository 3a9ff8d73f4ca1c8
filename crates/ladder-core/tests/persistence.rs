mod common;

use std::io::Write;

use common::*;
use ladder_core::{MarketConfig, OptionLedger, SwapPool};
use ladder_types::Q64;

#[test]
fn test_ledger_state_survives_json() {
    let mut market = MarketBuilder::new().build();
    market.seed_pool(ONE);
    market.mint(ALICE, 2 * ONE);
    market
        .ledger
        .set_approval_for_all(&at(ALICE, NOW), BOB, true)
        .unwrap();
    market.ledger.register_contract(addr(0xa1), None);

    let json = serde_json::to_string(&market.ledger).unwrap();
    let restored: OptionLedger = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.config(), market.ledger.config());
    assert_eq!(restored.balance_of_all(ALICE), vec![2 * ONE; 4]);
    assert_eq!(restored.balance_of_all(POOL), vec![ONE; 4]);
    assert_eq!(restored.total_supply_all(), market.ledger.total_supply_all());
    assert!(restored.is_approved_for_all(ALICE, BOB));
    assert!(restored.is_bound_pool(POOL));
    assert!(!restored.is_settled());

    assert!(restored.is_contract(addr(0xa1)));
}

#[test]
fn test_restored_contract_refuses_until_reregistered() {
    let contract = addr(0xa2);
    let mut market = MarketBuilder::new().build();
    market.mint(ALICE, ONE);
    market
        .ledger
        .register_contract(contract, Some(Box::new(RecordingReceiver::new(Answer::Accept).0)));

    let json = serde_json::to_string(&market.ledger).unwrap();
    market.ledger = serde_json::from_str(&json).unwrap();

    assert!(matches!(
        market
            .ledger
            .safe_transfer_from(&at(ALICE, NOW), ALICE, contract, 0, ONE / 2),
        Err(ladder_core::LadderError::ReceiverRejected(_))
    ));
    assert_eq!(market.ledger.balance_of_all(ALICE), vec![ONE; 4]);

    market
        .ledger
        .register_contract(contract, Some(Box::new(RecordingReceiver::new(Answer::Accept).0)));
    market
        .ledger
        .safe_transfer_from(&at(ALICE, NOW), ALICE, contract, 0, ONE / 2)
        .unwrap();
    assert_eq!(market.ledger.balance_of(contract, 0).unwrap(), ONE / 2);
}

#[test]
fn test_restored_market_keeps_trading() {
    let mut market = MarketBuilder::new().build();
    market.seed_pool(ONE);
    market.mint(ALICE, ONE);

    let ledger_json = serde_json::to_string(&market.ledger).unwrap();
    let pool_json = serde_json::to_string(&market.pool).unwrap();
    market.ledger = serde_json::from_str(&ledger_json).unwrap();
    market.pool = serde_json::from_str::<SwapPool>(&pool_json).unwrap();

    assert!(market.pool.is_initialized());
    assert_eq!(market.pool.liq_pool_share(OWNER), ONE);
    assert_eq!(market.pool.curve(), &ladder_core::WeightCurve::from(&market.pool.config().curve));

    let same = market.one_slot(3, ONE / 10);
    let more = market.one_slot(3, ONE / 5);
    market.swap(ALICE, &same, &more).unwrap();
    assert_eq!(market.pool.reserves()[3], ONE + ONE / 10);
}

#[test]
fn test_settled_ledger_round_trip() {
    let mut market = MarketBuilder::new().price(3 * Q64 / 10).build();
    market.mint(BOB, ONE);
    market
        .ledger
        .settle(&at(BOB, SETTLE_TIME), &market.oracle)
        .unwrap();

    let json = serde_json::to_string_pretty(&market.ledger).unwrap();
    let mut restored: OptionLedger = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.settle_price(), Some(3 * Q64 / 10));

    let paid = restored
        .exercise(&at(BOB, SETTLE_TIME), &market.oracle, &mut market.token)
        .unwrap();
    assert_eq!(paid, ONE);
}

#[test]
fn test_market_config_file_round_trip() {
    let config = MarketBuilder::new()
        .curve(ladder_core::CurveConfig::BlackScholes {
            width: WIDTH,
            volatility: VOLATILITY,
            option_kind: ladder_core::OptionKind::Put,
        })
        .config();

    let text = config.to_toml_string().unwrap();
    let document: toml::Value = toml::from_str(&text).unwrap();
    // Q64.64 values travel as strings, beyond TOML's integer range
    assert!(document["pool"]["fee_rate"].is_str());
    assert_eq!(document["pool"]["curve"]["kind"].as_str(), Some("black_scholes"));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    let loaded = MarketConfig::load(file.path()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_market_config_rejects_bad_files() {
    let mut config = MarketBuilder::new().config();
    config.pool.ledger = addr(0x1001);
    let text = config.to_toml_string().unwrap();
    assert!(matches!(
        MarketConfig::from_toml_str(&text),
        Err(ladder_core::LadderError::AccountMismatch { .. })
    ));

    assert!(matches!(
        MarketConfig::from_toml_str("[ledger]\naddress = 7"),
        Err(ladder_core::LadderError::Config(_))
    ));
    assert!(matches!(
        MarketConfig::load("/nonexistent/market.toml"),
        Err(ladder_core::LadderError::Config(_))
    ));
}
