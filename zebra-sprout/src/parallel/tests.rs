use color_eyre::eyre::Result;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    amount::Amount,
    binding::BindingKey,
    config::Config,
    keys::SpendingKey,
    note::Memo,
    primitives::proofs::MockProofSystem,
    tests::ledger::{Ledger, TX_DATA},
};

use super::*;

fn pool(threads: usize) -> rayon::ThreadPool {
    Config {
        parallel_threads: Some(threads),
        ..Config::default()
    }
    .thread_pool()
    .expect("test thread pools can be built")
}

#[test]
fn scan_finds_every_note_in_order() -> Result<()> {
    zebra_test::init();

    let mut rng = StdRng::seed_from_u64(0);
    let alice = SpendingKey::new(&mut rng)?;
    let bob = SpendingKey::new(&mut rng)?;
    let (binding_key, pub_key) = BindingKey::new(&mut rng)?;

    // Alice receives one output in each of the first two JoinSplits.
    let payments = [
        vec![(alice.address(), 1)],
        vec![(bob.address(), 2), (alice.address(), 3)],
        vec![],
    ];

    let mut joinsplits = Vec::new();
    for outputs in payments {
        let mut builder = JoinSplitBuilder::new();
        let mut total = 0;
        for (address, value) in outputs {
            builder.add_output(address, Amount::new(value), Memo::empty())?;
            total += value;
        }
        builder.vpub_old(Amount::new(total));

        joinsplits.push(builder.build(&mut rng, &pub_key, &MockProofSystem)?);
    }

    let first = joinsplits.remove(0);
    let joinsplit_data = JoinSplitData::sign(first, joinsplits, binding_key, TX_DATA);

    let found = trial_decrypt_all(&pool(3), &alice.incoming_viewing_key(), &joinsplit_data);
    let found: Vec<_> = found
        .into_iter()
        .map(|(joinsplit_index, output_index, note)| {
            (joinsplit_index, output_index, note.value.zatoshis())
        })
        .collect();
    assert_eq!(found, vec![(0, 0, 1), (1, 1, 3)]);

    let found = trial_decrypt_all(&pool(1), &bob.incoming_viewing_key(), &joinsplit_data);
    assert_eq!(found.len(), 1);
    assert_eq!((found[0].0, found[0].1), (1, 0));

    let stranger = SpendingKey::new(&mut rng)?;
    assert!(trial_decrypt_all(&pool(2), &stranger.incoming_viewing_key(), &joinsplit_data).is_empty());

    Ok(())
}

#[test]
fn independent_joinsplits_are_built_in_parallel() -> Result<()> {
    zebra_test::init();

    let mut rng = StdRng::seed_from_u64(1);
    let owner = SpendingKey::new(&mut rng)?;
    let (binding_key, pub_key) = BindingKey::new(&mut rng)?;

    let mut ledger = Ledger::default();
    let notes: Vec<_> = (1..=4)
        .map(|value| ledger.fund(&mut rng, &owner, value).0)
        .collect();

    // Every JoinSplit spends against the current root.
    let mut builders = Vec::new();
    for (position, note) in notes.into_iter().enumerate() {
        let witness = ledger.tree.witness_at(position as u64)?;
        let mut builder = JoinSplitBuilder::new();
        builder.add_input(owner.clone(), note, witness)?;
        builder.vpub_new(note.value);
        builders.push(builder);
    }

    let mut joinsplits = build_all(&pool(4), builders, &pub_key, &MockProofSystem)?;
    assert_eq!(joinsplits.len(), 4);
    for (joinsplit, value) in joinsplits.iter().zip(1..=4) {
        assert_eq!(joinsplit.vpub_new, Amount::new(value));
    }

    let first = joinsplits.remove(0);
    let joinsplit_data = JoinSplitData::sign(first, joinsplits, binding_key, TX_DATA);
    ledger.accept(&joinsplit_data)?;

    Ok(())
}

#[test]
fn build_all_reports_the_first_error() -> Result<()> {
    zebra_test::init();

    let (_, pub_key) = BindingKey::new(&mut StdRng::seed_from_u64(2))?;

    let mut unbalanced = JoinSplitBuilder::new();
    unbalanced.vpub_new(Amount::new(1));
    let builders = vec![JoinSplitBuilder::new(), unbalanced];

    assert!(matches!(
        build_all(&pool(2), builders, &pub_key, &MockProofSystem),
        Err(BuildError::ValueImbalance { .. })
    ));

    Ok(())
}
