use rand::{rngs::StdRng, SeedableRng};

use crate::tests::FailingRng;

use super::*;

#[test]
fn derivation_is_deterministic() {
    zebra_test::init();

    let mut rng = StdRng::seed_from_u64(0);
    let spending_key = SpendingKey::new(&mut rng).unwrap();

    let first = spending_key.address();
    let second = derive_address(*spending_key.as_bytes()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, spending_key.incoming_viewing_key().address());
    assert_ne!(
        <[u8; 32]>::from(first.paying_key),
        <[u8; 32]>::from(first.transmission_key)
    );
}

#[test]
fn distinct_keys_derive_distinct_addresses() {
    zebra_test::init();

    let mut rng = StdRng::seed_from_u64(1);
    let a = SpendingKey::new(&mut rng).unwrap();
    let b = SpendingKey::new(&mut rng).unwrap();

    assert_ne!(a.address(), b.address());
}

#[test]
fn generated_keys_fit_in_252_bits() {
    zebra_test::init();

    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..32 {
        let spending_key = SpendingKey::new(&mut rng).unwrap();
        assert_eq!(spending_key.as_bytes()[0] & 0xf0, 0);
    }

    let spending_key = SpendingKey::random().unwrap();
    assert_eq!(spending_key.as_bytes()[0] & 0xf0, 0);
}

#[test]
fn oversized_spending_key_is_rejected() {
    zebra_test::init();

    let mut bytes = [0u8; 32];
    bytes[0] = 0x10;

    assert_eq!(
        SpendingKey::try_from(bytes).unwrap_err(),
        KeyError::InvalidSpendingKey
    );
    assert_eq!(
        derive_address(bytes).unwrap_err(),
        KeyError::InvalidSpendingKey
    );

    bytes[0] = 0x0f;
    assert!(derive_address(bytes).is_ok());
}

#[test]
fn secrets_are_redacted_in_debug_output() {
    zebra_test::init();

    let spending_key = SpendingKey::try_from([0x0b; 32]).unwrap();
    let debug = format!("{:?} {:?}", spending_key, spending_key.receiving_key());

    assert!(!debug.contains("0b0b"));
    assert!(!debug.contains("11, 11"));
    assert!(debug.contains("redacted"));
}

#[test]
fn rng_failure_is_reported() {
    zebra_test::init();

    assert_eq!(
        SpendingKey::new(&mut FailingRng).err(),
        Some(RandError::FillBytes)
    );
}
