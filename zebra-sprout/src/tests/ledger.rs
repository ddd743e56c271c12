//! A minimal ledger for tests: one note commitment tree and one nullifier set.

use std::collections::HashSet;

use color_eyre::eyre::{eyre, Result};
use rand::{CryptoRng, RngCore};

use crate::{
    amount::Amount,
    commitment::NoteCommitment,
    joinsplit::JoinSplitData,
    keys::SpendingKey,
    note::{Note, Nullifier, NullifierSeed},
    primitives::{proofs::MockProofSystem, Groth16Proof},
    tree::{NoteCommitmentTree, Witness},
    verify::verify_all,
};

/// The transaction data outside the JoinSplits, in tests.
pub(crate) const TX_DATA: &[u8] = b"transparent inputs and outputs";

#[derive(Default)]
pub(crate) struct Ledger {
    pub(crate) tree: NoteCommitmentTree,
    pub(crate) nullifiers: HashSet<Nullifier>,
}

impl Ledger {
    /// Appends a fresh note of `value` owned by `owner`, as if it was created
    /// by an earlier transaction.
    pub(crate) fn fund<R>(&mut self, rng: &mut R, owner: &SpendingKey, value: i64) -> (Note, Witness)
    where
        R: RngCore + CryptoRng,
    {
        let rho = NullifierSeed::new(rng).expect("test rng never fails");
        let note = Note::new(rng, owner.paying_key(), Amount::new(value), rho)
            .expect("test rng never fails");

        let (_, witness) = self
            .tree
            .append(note.commitment())
            .expect("test trees are never full");

        (note, witness)
    }

    /// Appends `count` commitments to notes nobody in the test owns.
    pub(crate) fn append_unrelated<R>(&mut self, rng: &mut R, count: usize)
    where
        R: RngCore + CryptoRng,
    {
        for _ in 0..count {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);

            self.tree
                .push(NoteCommitment::from(bytes))
                .expect("test trees are never full");
        }
    }

    /// Verifies `joinsplit_data`, then records its nullifiers and appends its
    /// output commitments.
    pub(crate) fn accept(&mut self, joinsplit_data: &JoinSplitData<Groth16Proof>) -> Result<()> {
        verify_all(joinsplit_data, TX_DATA, &self.tree, &MockProofSystem)?;

        for nullifier in joinsplit_data.nullifiers() {
            if !self.nullifiers.insert(*nullifier) {
                return Err(eyre!("double spend of {nullifier:?}"));
            }
        }

        for cm in joinsplit_data.note_commitments() {
            self.tree.push(*cm)?;
        }

        Ok(())
    }
}
