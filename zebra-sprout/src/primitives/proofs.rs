//! ZK proofs used in Sprout JoinSplits.
//!
//! The proving system itself is external. It is consumed through the
//! [`ProofSystem`] trait, which sees the JoinSplit statement as a
//! [`PrivateWitness`] known only to the prover, and [`PrimaryInputs`]
//! that are public.

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{
    amount::{Amount, NonNegative},
    commitment::NoteCommitment,
    keys::SpendingKey,
    note::{Mac, Note, Nullifier, Phi},
    serialization::{ZcashDeserialize, ZcashSerialize},
    tree::{Root, Witness},
};

mod groth16;
#[cfg(any(test, feature = "proptest-impl"))]
mod mock;

pub use self::groth16::Groth16Proof;
#[cfg(any(test, feature = "proptest-impl"))]
pub use self::mock::MockProofSystem;

/// A marker trait used to abstract over proof encodings.
pub trait ZkSnarkProof:
    Clone
    + Debug
    + PartialEq
    + Eq
    + Serialize
    + DeserializeOwned
    + ZcashSerialize
    + ZcashDeserialize
    + Send
    + Sync
    + private::Sealed
{
}
impl ZkSnarkProof for Groth16Proof {}

mod private {
    use super::*;

    pub trait Sealed {}
    impl Sealed for Groth16Proof {}
}

/// A proving system for the Sprout JoinSplit statement.
///
/// Implementations must never return a proof for a witness that does not
/// satisfy the statement. `verify` must be a total function without side
/// effects: any proof it can't check is invalid.
pub trait ProofSystem: Send + Sync {
    /// The proof encoding produced by this proving system.
    type Proof: ZkSnarkProof;

    /// Proves that `witness` satisfies the JoinSplit statement for `inputs`.
    ///
    /// Fails only if the witness is malformed, which is a bug in the caller.
    fn prove(
        &self,
        witness: &PrivateWitness,
        inputs: &PrimaryInputs,
    ) -> Result<Self::Proof, ProvingError>;

    /// Returns `true` if `proof` is valid for `inputs`.
    fn verify(&self, proof: &Self::Proof, inputs: &PrimaryInputs) -> bool;
}

/// The public inputs of the JoinSplit statement.
///
/// <https://zips.z.cash/protocol/protocol.pdf#joinsplitstatement>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimaryInputs {
    /// The anchor the inputs are spent against, `rt`.
    pub anchor: Root,
    /// The hash that binds the JoinSplit to its transaction.
    pub h_sig: [u8; 32],
    /// The nullifiers of the input notes.
    pub nullifiers: [Nullifier; 2],
    /// The MACs that bind each spending key to `h_sig`.
    pub vmacs: [Mac; 2],
    /// The commitments to the output notes.
    pub commitments: [NoteCommitment; 2],
    /// The value entering the shielded pool from the transparent pool.
    pub vpub_old: Amount<NonNegative>,
    /// The value leaving the shielded pool to the transparent pool.
    pub vpub_new: Amount<NonNegative>,
}

impl PrimaryInputs {
    /// Encodes the primary inputs in the order the proving key expects:
    /// `rt, h_sig, nf_1, h_1, nf_2, h_2, cm_1, cm_2, vpub_old, vpub_new`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((32 * 8) + (8 * 2));

        bytes.extend(<[u8; 32]>::from(self.anchor));
        bytes.extend(self.h_sig);
        for (nullifier, mac) in self.nullifiers.iter().zip(self.vmacs.iter()) {
            bytes.extend(<[u8; 32]>::from(nullifier));
            bytes.extend(<[u8; 32]>::from(mac));
        }
        for commitment in &self.commitments {
            bytes.extend(<[u8; 32]>::from(commitment));
        }
        bytes.extend(self.vpub_old.to_bytes());
        bytes.extend(self.vpub_new.to_bytes());

        bytes
    }
}

/// The secret part of the witness for one input note.
#[derive(Clone, Debug)]
pub struct InputWitness {
    /// The key that owns the note.
    pub spending_key: SpendingKey,
    /// The note being spent.
    pub note: Note,
    /// The authentication path of the note commitment.
    pub witness: Witness,
}

/// The private witness of the JoinSplit statement.
///
/// Holds spending keys, so it must not outlive the proving call.
#[derive(Clone, Debug)]
pub struct PrivateWitness {
    /// The input notes, with their keys and authentication paths.
    pub inputs: [InputWitness; 2],
    /// The output notes.
    pub outputs: [Note; 2],
    /// The seed that the output nullifier seeds are derived from.
    pub phi: Phi,
}

/// An error returned by a [`ProofSystem`] when it can't produce a proof.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ProvingError {
    /// The private witness does not satisfy the JoinSplit statement.
    #[error("malformed JoinSplit witness: {0}")]
    MalformedWitness(&'static str),
}
