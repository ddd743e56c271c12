use proptest::prelude::*;

use crate::{
    amount::{Amount, NonNegative},
    keys::SpendingKey,
};

use super::*;

proptest! {
    #[test]
    fn nullifier_is_deterministic(note in any::<Note>(), key_bytes in any::<[u8; 32]>()) {
        zebra_test::init();

        let mut key_bytes = key_bytes;
        key_bytes[0] &= 0x0f;
        let spending_key = SpendingKey::try_from(key_bytes).unwrap();

        let first = note.nullifier(&spending_key);
        let second = Nullifier::from((&spending_key, note.rho));

        prop_assert_eq!(first, second);

        // The nullifier only depends on the key and rho.
        let mut other = note;
        other.value = Amount::<NonNegative>::zero();
        prop_assert_eq!(other.nullifier(&spending_key), first);
    }

    #[test]
    fn plaintext_roundtrip(note in any::<Note>(), memo in any::<Memo>()) {
        zebra_test::init();

        let plaintext = NotePlaintext::new(&note, memo);
        let bytes = plaintext.to_bytes();
        let parsed = NotePlaintext::from_bytes(&bytes).unwrap();

        prop_assert_eq!(&parsed, &plaintext);
        prop_assert_eq!(parsed.note(note.paying_key), note);
    }
}

#[test]
fn distinct_rho_gives_distinct_nullifiers() {
    zebra_test::init();

    let spending_key = SpendingKey::try_from([0x01; 32]).unwrap();
    let a = Nullifier::from((&spending_key, NullifierSeed::from([1; 32])));
    let b = Nullifier::from((&spending_key, NullifierSeed::from([2; 32])));

    assert_ne!(a, b);
}

#[test]
fn commitment_binds_every_field() {
    zebra_test::init();

    let note = Note {
        paying_key: [1; 32].into(),
        value: Amount::new(50),
        rho: [2; 32].into(),
        rcm: [3; 32].into(),
    };
    let cm = note.commitment();

    let mut other = note;
    other.paying_key = [4; 32].into();
    assert_ne!(other.commitment(), cm);

    let mut other = note;
    other.value = Amount::new(51);
    assert_ne!(other.commitment(), cm);

    let mut other = note;
    other.rho = [4; 32].into();
    assert_ne!(other.commitment(), cm);

    let mut other = note;
    other.rcm = [4; 32].into();
    assert_ne!(other.commitment(), cm);

    assert_eq!(note.commitment(), cm);
}

#[test]
fn plaintext_rejects_bad_lead_byte() {
    zebra_test::init();

    let note = Note {
        paying_key: [1; 32].into(),
        value: Amount::new(7),
        rho: [2; 32].into(),
        rcm: [3; 32].into(),
    };
    let mut bytes = *NotePlaintext::new(&note, Memo::empty()).to_bytes();
    bytes[0] = 0x01;

    assert!(NotePlaintext::from_bytes(&bytes).is_err());
}

#[test]
fn memo_padding_and_limits() {
    zebra_test::init();

    let memo = Memo::try_from(&b"thanks for the coffee"[..]).unwrap();
    assert_eq!(&memo.as_ref()[..5], b"thank");
    assert!(memo.as_ref()[21..].iter().all(|b| *b == 0));
    assert!(!memo.is_empty());

    assert!(Memo::empty().is_empty());
    assert_eq!(Memo::default().as_ref()[0], 0xF6);

    assert!(Memo::try_from(&[0u8; 513][..]).is_err());
}
