use chrono::Utc;
use std::str::FromStr;
use swap_engine_lib::db::model::SwapPairDao;
use swap_engine_lib::registry::SwapPairRegistry;
use web3::types::{Address, U256};

const SRC_TOKEN: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
const DST_TOKEN: &str = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512";

fn pair(low_bound: &str, upper_bound: &str, available: bool) -> SwapPairDao {
    let now = Utc::now();
    SwapPairDao {
        id: 0,
        symbol: "TST".to_string(),
        name: "Test Token".to_string(),
        decimals: 18,
        src_token_addr: SRC_TOKEN.to_string(),
        dst_token_addr: DST_TOKEN.to_string(),
        low_bound: low_bound.to_string(),
        upper_bound: upper_bound.to_string(),
        available,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_add_and_get_pair() {
    let registry = SwapPairRegistry::new();
    registry.add_pair(&pair("10", "1000000", true)).unwrap();

    let dst = Address::from_str(DST_TOKEN).unwrap();
    let ins = registry.get_by_dst_token(dst).unwrap();
    assert_eq!(ins.symbol, "TST");
    assert_eq!(ins.low_bound, U256::from(10u64));
    assert_eq!(ins.upper_bound, U256::from(1_000_000u64));

    let src = Address::from_str(SRC_TOKEN).unwrap();
    let resolved = registry.resolve_source(src).unwrap();
    assert_eq!(resolved.dst_token_addr, dst);
}

#[test]
fn test_get_absent_pair_is_an_error() {
    let registry = SwapPairRegistry::new();
    let missing = Address::from_str(DST_TOKEN).unwrap();
    assert!(registry.get_by_dst_token(missing).is_err());
    assert!(registry
        .resolve_source(Address::from_str(SRC_TOKEN).unwrap())
        .is_none());
}

#[test]
fn test_invalid_bounds_rejected() {
    let registry = SwapPairRegistry::new();
    let err = registry
        .add_pair(&pair("not-a-number", "1000000", true))
        .unwrap_err();
    assert!(err.to_string().contains("invalid lowBound amount"));

    let err = registry
        .add_pair(&pair("10", "12.5", true))
        .unwrap_err();
    assert!(err.to_string().contains("invalid upperBound amount"));
}

#[test]
fn test_update_pair_bounds() {
    let registry = SwapPairRegistry::new();
    registry.add_pair(&pair("10", "1000000", true)).unwrap();

    registry.update_pair(&pair("20", "2000000", true)).unwrap();
    let ins = registry
        .get_by_dst_token(Address::from_str(DST_TOKEN).unwrap())
        .unwrap();
    assert_eq!(ins.low_bound, U256::from(20u64));
    assert_eq!(ins.upper_bound, U256::from(2_000_000u64));
}

#[test]
fn test_update_unavailable_removes_pair() {
    let registry = SwapPairRegistry::new();
    registry.add_pair(&pair("10", "1000000", true)).unwrap();

    registry.update_pair(&pair("10", "1000000", false)).unwrap();
    assert!(registry
        .get_by_dst_token(Address::from_str(DST_TOKEN).unwrap())
        .is_err());
    assert!(registry
        .resolve_source(Address::from_str(SRC_TOKEN).unwrap())
        .is_none());
}

#[test]
fn test_update_absent_pair_is_an_error() {
    let registry = SwapPairRegistry::new();
    let err = registry.update_pair(&pair("10", "1000000", true)).unwrap_err();
    assert!(err.to_string().contains("doesn't exist"));
}
