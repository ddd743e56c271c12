use std::collections::HashSet;

use color_eyre::eyre::Result;
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    arbitrary::spendable_values,
    binding::BindingKey,
    primitives::proofs::MockProofSystem,
    tests::{ledger::Ledger, FailingRng},
    verify::verify,
};

use super::*;

fn empty_anchor() -> Root {
    NoteCommitmentTree::<MERKLE_DEPTH>::new(false).root()
}

#[test]
fn empty_slots_are_filled_with_decoys() -> Result<()> {
    zebra_test::init();

    let mut rng = StdRng::seed_from_u64(0);
    let (_, pub_key) = BindingKey::new(&mut rng)?;

    // Value passes through the shielded pool without any real notes.
    let mut builder = JoinSplitBuilder::new();
    builder.vpub_old(Amount::new(5)).vpub_new(Amount::new(5));
    let joinsplit = builder.build(&mut rng, &pub_key, &MockProofSystem)?;

    assert_eq!(joinsplit.anchor, empty_anchor());
    assert_ne!(joinsplit.nullifiers[0], joinsplit.nullifiers[1]);
    assert_ne!(joinsplit.commitments[0], joinsplit.commitments[1]);

    let anchors: HashSet<Root> = [empty_anchor()].into_iter().collect();
    verify(&joinsplit, &pub_key, &anchors, &MockProofSystem)?;

    Ok(())
}

#[test]
fn configured_anchor_is_used_without_real_inputs() -> Result<()> {
    zebra_test::init();

    let mut rng = StdRng::seed_from_u64(1);
    let mut ledger = Ledger::default();
    ledger.append_unrelated(&mut rng, 4);
    let anchor = ledger.tree.root();

    let (_, pub_key) = BindingKey::new(&mut rng)?;
    let mut builder = JoinSplitBuilder::new();
    builder.anchor(anchor);
    let joinsplit = builder.build(&mut rng, &pub_key, &MockProofSystem)?;

    assert_eq!(joinsplit.anchor, anchor);
    verify(&joinsplit, &pub_key, &ledger.tree, &MockProofSystem)?;

    Ok(())
}

#[test]
fn slots_are_limited_to_two() -> Result<()> {
    zebra_test::init();

    let mut rng = StdRng::seed_from_u64(2);
    let owner = SpendingKey::new(&mut rng)?;
    let mut ledger = Ledger::default();

    let mut builder = JoinSplitBuilder::new();
    for _ in 0..2 {
        let (note, witness) = ledger.fund(&mut rng, &owner, 1);
        builder.add_input(owner.clone(), note, witness)?;
        builder.add_output(owner.address(), Amount::new(1), Memo::empty())?;
    }

    let (note, witness) = ledger.fund(&mut rng, &owner, 1);
    assert_eq!(
        builder.add_input(owner.clone(), note, witness).err(),
        Some(BuildError::TooManyInputs)
    );
    assert_eq!(
        builder
            .add_output(owner.address(), Amount::new(1), Memo::empty())
            .err(),
        Some(BuildError::TooManyOutputs)
    );

    Ok(())
}

#[test]
fn inputs_are_checked_when_added() -> Result<()> {
    zebra_test::init();

    let mut rng = StdRng::seed_from_u64(3);
    let owner = SpendingKey::new(&mut rng)?;
    let thief = SpendingKey::new(&mut rng)?;

    let mut ledger = Ledger::default();
    let (note, witness) = ledger.fund(&mut rng, &owner, 10);
    let (other_note, _) = ledger.fund(&mut rng, &owner, 10);

    let mut builder = JoinSplitBuilder::new();
    assert_eq!(
        builder.add_input(thief, note, witness.clone()).err(),
        Some(BuildError::WrongSpendingKey)
    );
    assert_eq!(
        builder.add_input(owner, other_note, witness).err(),
        Some(BuildError::InvalidWitness)
    );

    Ok(())
}

#[test]
fn inputs_share_one_anchor() -> Result<()> {
    zebra_test::init();

    let mut rng = StdRng::seed_from_u64(4);
    let owner = SpendingKey::new(&mut rng)?;
    let (_, pub_key) = BindingKey::new(&mut rng)?;

    let mut ledger = Ledger::default();
    let (first_note, first_witness) = ledger.fund(&mut rng, &owner, 3);
    let (second_note, second_witness) = ledger.fund(&mut rng, &owner, 4);

    // Witnesses captured at append time have different anchors.
    let mut builder = JoinSplitBuilder::new();
    builder
        .add_input(owner.clone(), first_note, first_witness.clone())?
        .add_input(owner.clone(), second_note, second_witness.clone())?;
    builder.vpub_new(Amount::new(7));
    assert_eq!(
        builder.build(&mut rng, &pub_key, &MockProofSystem).err(),
        Some(BuildError::AnchorMismatch {
            first: first_witness.anchor(),
            second: second_witness.anchor(),
        })
    );

    // Tracked witnesses are updated to the current root.
    let first_witness = ledger.tree.witness_at(first_witness.position())?;
    let second_witness = ledger.tree.witness_at(second_witness.position())?;

    let mut builder = JoinSplitBuilder::new();
    builder
        .add_input(owner.clone(), first_note, first_witness)?
        .add_input(owner, second_note, second_witness)?;
    builder.vpub_new(Amount::new(7));
    let joinsplit = builder.build(&mut rng, &pub_key, &MockProofSystem)?;

    assert_eq!(joinsplit.anchor, ledger.tree.root());
    verify(&joinsplit, &pub_key, &ledger.tree, &MockProofSystem)?;

    Ok(())
}

#[test]
fn unbalanced_values_are_rejected() -> Result<()> {
    zebra_test::init();

    let mut rng = StdRng::seed_from_u64(5);
    let owner = SpendingKey::new(&mut rng)?;
    let recipient = SpendingKey::new(&mut rng)?;
    let (_, pub_key) = BindingKey::new(&mut rng)?;

    let mut ledger = Ledger::default();
    let (note, witness) = ledger.fund(&mut rng, &owner, 50);

    let mut builder = JoinSplitBuilder::new();
    builder
        .add_input(owner, note, witness)?
        .add_output(recipient.address(), Amount::new(40), Memo::empty())?;

    assert_eq!(
        builder.clone().build(&mut rng, &pub_key, &MockProofSystem).err(),
        Some(BuildError::ValueImbalance {
            inputs: 50,
            outputs: 40
        })
    );

    // Outputs can't exceed inputs, even with a change address.
    builder
        .change_address(recipient.address())
        .vpub_new(Amount::new(20));
    assert_eq!(
        builder.build(&mut rng, &pub_key, &MockProofSystem).err(),
        Some(BuildError::ValueImbalance {
            inputs: 50,
            outputs: 60
        })
    );

    Ok(())
}

#[test]
fn surplus_is_paid_to_the_change_address() -> Result<()> {
    zebra_test::init();

    let mut rng = StdRng::seed_from_u64(6);
    let owner = SpendingKey::new(&mut rng)?;
    let recipient = SpendingKey::new(&mut rng)?;
    let (_, pub_key) = BindingKey::new(&mut rng)?;

    let mut ledger = Ledger::default();
    let (note, witness) = ledger.fund(&mut rng, &owner, 50);

    let mut builder = JoinSplitBuilder::new();
    builder
        .add_input(owner.clone(), note, witness)?
        .add_output(recipient.address(), Amount::new(30), Memo::empty())?;
    builder.change_address(owner.address());
    let joinsplit = builder.build(&mut rng, &pub_key, &MockProofSystem)?;

    let change: Vec<_> = (0..2)
        .filter_map(|index| joinsplit.decrypt_output(&owner.incoming_viewing_key(), &pub_key, index))
        .collect();
    assert_eq!(change.len(), 1);
    assert_eq!(change[0].value, Amount::new(20));

    verify(&joinsplit, &pub_key, &ledger.tree, &MockProofSystem)?;

    Ok(())
}

#[test]
fn proving_errors_are_reported() -> Result<()> {
    zebra_test::init();

    /// A proving system that rejects every witness.
    struct Rejecting;

    impl ProofSystem for Rejecting {
        type Proof = crate::primitives::Groth16Proof;

        fn prove(
            &self,
            _witness: &PrivateWitness,
            _inputs: &PrimaryInputs,
        ) -> Result<Self::Proof, ProvingError> {
            Err(ProvingError::MalformedWitness("rejected"))
        }

        fn verify(&self, _proof: &Self::Proof, _inputs: &PrimaryInputs) -> bool {
            false
        }
    }

    let mut rng = StdRng::seed_from_u64(7);
    let (_, pub_key) = BindingKey::new(&mut rng)?;

    assert_eq!(
        JoinSplitBuilder::new()
            .build(&mut rng, &pub_key, &Rejecting)
            .err(),
        Some(BuildError::Proving(ProvingError::MalformedWitness(
            "rejected"
        )))
    );

    Ok(())
}

#[test]
fn rng_failure_is_reported() -> Result<()> {
    zebra_test::init();

    let (_, pub_key) = BindingKey::new(&mut StdRng::seed_from_u64(8))?;

    let mut builder = JoinSplitBuilder::new();
    builder.vpub_old(Amount::new(5)).vpub_new(Amount::new(5));
    assert_eq!(
        builder.build(&mut FailingRng, &pub_key, &MockProofSystem).err(),
        Some(BuildError::Rand(RandError::FillBytes))
    );

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every JoinSplit the builder produces conserves value.
    #[test]
    fn built_joinsplits_conserve_value(
        values in spendable_values(3),
        vpub_new_share in 0u8..=100,
        output_share in 0u8..=100,
        seed in any::<u64>(),
    ) {
        zebra_test::init();

        let mut rng = StdRng::seed_from_u64(seed);
        let owner = SpendingKey::new(&mut rng).unwrap();
        let recipient = SpendingKey::new(&mut rng).unwrap();
        let (_, pub_key) = BindingKey::new(&mut rng).unwrap();

        let mut ledger = Ledger::default();
        let (first_note, first_witness) = ledger.fund(&mut rng, &owner, values[0].zatoshis());
        let (second_note, second_witness) = ledger.fund(&mut rng, &owner, values[1].zatoshis());
        let first_witness = ledger.tree.witness_at(first_witness.position()).unwrap();
        let second_witness = ledger.tree.witness_at(second_witness.position()).unwrap();

        let total = values.iter().map(|value| value.zatoshis()).sum::<i64>();
        let vpub_new = total * i64::from(vpub_new_share) / 100;
        let sent = (total - vpub_new) * i64::from(output_share) / 100;

        let mut builder = JoinSplitBuilder::new();
        builder
            .add_input(owner.clone(), first_note, first_witness)
            .unwrap()
            .add_input(owner.clone(), second_note, second_witness)
            .unwrap()
            .add_output(recipient.address(), Amount::new(sent), Memo::empty())
            .unwrap();
        builder
            .vpub_old(values[2])
            .vpub_new(Amount::new(vpub_new))
            .change_address(owner.address());

        let joinsplit = builder.build(&mut rng, &pub_key, &MockProofSystem).unwrap();
        prop_assert!(verify(&joinsplit, &pub_key, &ledger.tree, &MockProofSystem).is_ok());

        let received: i64 = (0..2)
            .filter_map(|index| {
                joinsplit.decrypt_output(&recipient.incoming_viewing_key(), &pub_key, index)
            })
            .map(|note| note.value.zatoshis())
            .sum();
        let change: i64 = (0..2)
            .filter_map(|index| {
                joinsplit.decrypt_output(&owner.incoming_viewing_key(), &pub_key, index)
            })
            .map(|note| note.value.zatoshis())
            .sum();

        prop_assert_eq!(
            values[0].zatoshis() + values[1].zatoshis() + joinsplit.vpub_old.zatoshis(),
            received + change + joinsplit.vpub_new.zatoshis()
        );
    }
}
