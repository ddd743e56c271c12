use std::collections::HashSet;

use color_eyre::eyre::Result;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    amount::Amount,
    binding::BindingKey,
    builder::JoinSplitBuilder,
    keys::SpendingKey,
    note::Memo,
    primitives::{proofs::MockProofSystem, Groth16Proof},
    tests::ledger::{Ledger, TX_DATA},
};

use super::*;

/// Builds a JoinSplit that spends a fresh note, and returns it with the
/// ledger it was spent from.
fn spend(seed: u64) -> Result<(Ledger, JoinSplitData<Groth16Proof>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let owner = SpendingKey::new(&mut rng)?;
    let recipient = SpendingKey::new(&mut rng)?;

    let mut ledger = Ledger::default();
    let (note, witness) = ledger.fund(&mut rng, &owner, 1000);

    let (binding_key, pub_key) = BindingKey::new(&mut rng)?;
    let mut builder = JoinSplitBuilder::new();
    builder
        .add_input(owner, note, witness)?
        .add_output(recipient.address(), Amount::new(1000), Memo::empty())?;
    let joinsplit = builder.build(&mut rng, &pub_key, &MockProofSystem)?;

    Ok((
        ledger,
        JoinSplitData::sign(joinsplit, Vec::new(), binding_key, TX_DATA),
    ))
}

#[test]
fn valid_joinsplits_verify() -> Result<()> {
    zebra_test::init();

    let (ledger, joinsplit_data) = spend(0)?;

    verify(
        &joinsplit_data.first,
        &joinsplit_data.pub_key,
        &ledger.tree,
        &MockProofSystem,
    )?;
    verify_all(&joinsplit_data, TX_DATA, &ledger.tree, &MockProofSystem)?;

    // Any anchor set works, as long as it has the anchor.
    let anchors: HashSet<Root> = [joinsplit_data.first.anchor].into_iter().collect();
    verify_all(&joinsplit_data, TX_DATA, &anchors, &MockProofSystem)?;

    Ok(())
}

#[test]
fn public_fields_are_bound_by_the_proof() -> Result<()> {
    zebra_test::init();

    let (ledger, joinsplit_data) = spend(1)?;
    let verify_tampered = |tamper: fn(&mut JoinSplit<Groth16Proof>)| {
        let mut joinsplit = joinsplit_data.first.clone();
        tamper(&mut joinsplit);
        verify(&joinsplit, &joinsplit_data.pub_key, &ledger.tree, &MockProofSystem)
    };

    assert!(matches!(
        verify_tampered(|joinsplit| joinsplit.vpub_new = Amount::new(1)),
        Err(VerifyError::InvalidProof)
    ));
    assert!(matches!(
        verify_tampered(|joinsplit| joinsplit.nullifiers.swap(0, 1)),
        Err(VerifyError::InvalidProof)
    ));
    assert!(matches!(
        verify_tampered(|joinsplit| joinsplit.commitments[1] = [0; 32].into()),
        Err(VerifyError::InvalidProof)
    ));
    assert!(matches!(
        verify_tampered(|joinsplit| joinsplit.random_seed = [1; 32].into()),
        Err(VerifyError::InvalidProof)
    ));
    assert!(matches!(
        verify_tampered(|joinsplit| joinsplit.zkproof.0[191] ^= 1),
        Err(VerifyError::InvalidProof)
    ));

    Ok(())
}

#[test]
fn verify_all_checks_the_binding_signature() -> Result<()> {
    zebra_test::init();

    let (ledger, joinsplit_data) = spend(2)?;

    assert!(matches!(
        verify_all(
            &joinsplit_data,
            b"another transaction",
            &ledger.tree,
            &MockProofSystem
        ),
        Err(VerifyError::Binding(_))
    ));

    Ok(())
}

#[test]
fn verification_does_not_change_the_tree() -> Result<()> {
    zebra_test::init();

    let (ledger, joinsplit_data) = spend(3)?;
    let root = ledger.tree.root();
    let count = ledger.tree.count();

    verify_all(&joinsplit_data, TX_DATA, &ledger.tree, &MockProofSystem)?;

    assert_eq!(ledger.tree.root(), root);
    assert_eq!(ledger.tree.count(), count);

    Ok(())
}
