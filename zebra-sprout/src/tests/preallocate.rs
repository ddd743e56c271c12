//! Tests for trusted preallocation during deserialization.

use proptest::prelude::*;

use crate::{
    joinsplit::{JoinSplit, GROTH16_JOINSPLIT_SIZE},
    primitives::Groth16Proof,
    serialization::{TrustedPreallocate, ZcashSerialize, MAX_PROTOCOL_MESSAGE_LEN},
};

proptest! {
    /// Confirm that each JoinSplit<Groth16Proof> takes exactly GROTH16_JOINSPLIT_SIZE bytes when serialized.
    /// This verifies that our calculated [`TrustedPreallocate::max_allocation`] is indeed an upper bound.
    #[test]
    fn joinsplit_groth16_size_is_correct(joinsplit in <JoinSplit<Groth16Proof>>::arbitrary_with(())) {
        zebra_test::init();

        let serialized = joinsplit.zcash_serialize_to_vec().expect("Serialization to vec must succeed");
        prop_assert_eq!(serialized.len() as u64, GROTH16_JOINSPLIT_SIZE);
        prop_assert_eq!(GROTH16_JOINSPLIT_SIZE, 1698);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Verify that...
    /// 1. The smallest disallowed vector of `JoinSplit<Groth16Proof>`s is too large to fit in a protocol message
    /// 2. The largest allowed vector is small enough to fit in a protocol message
    #[test]
    fn joinsplit_groth16_max_allocation_is_correct(joinsplit in <JoinSplit<Groth16Proof>>::arbitrary_with(())) {
        zebra_test::init();

        let max_allocation = <JoinSplit<Groth16Proof>>::max_allocation();
        let largest_allowed_vec = vec![joinsplit; max_allocation as usize];
        let largest_allowed_serialized_len = largest_allowed_vec
            .zcash_serialize_to_vec()
            .expect("Serialization to vec must succeed")
            .len();

        // Check that our largest_allowed_vec is small enough to fit in a protocol message.
        prop_assert!(largest_allowed_serialized_len <= MAX_PROTOCOL_MESSAGE_LEN);

        // Check that one more JoinSplit would not fit.
        prop_assert!(
            largest_allowed_serialized_len as u64 + GROTH16_JOINSPLIT_SIZE
                > MAX_PROTOCOL_MESSAGE_LEN as u64
        );
    }
}
