//! A proving system for tests.
//!
//! [`MockProofSystem`] checks the JoinSplit statement directly on the private
//! witness, then emits a hash of the primary inputs as the "proof". It has
//! no zero-knowledge or soundness properties against a malicious prover, but
//! it accepts and rejects the same JoinSplits as a real proving system.

use crate::{joinsplit::Index, note::Mac};

use super::{Groth16Proof, PrimaryInputs, PrivateWitness, ProofSystem, ProvingError};

/// BLAKE2b personalization for mock proofs.
const MOCK_PROOF_PERSONALIZATION: &[u8; 16] = b"ZebraMockSprout_";

/// A proving system that checks the JoinSplit statement without a SNARK.
#[derive(Copy, Clone, Debug, Default)]
pub struct MockProofSystem;

impl MockProofSystem {
    /// Returns the only valid proof for `inputs`.
    fn proof_for(inputs: &PrimaryInputs) -> Groth16Proof {
        let encoded = inputs.to_bytes();
        let mut proof = [0u8; 192];

        for (i, chunk) in proof.chunks_mut(64).enumerate() {
            let hash = blake2b_simd::Params::new()
                .hash_length(64)
                .personal(MOCK_PROOF_PERSONALIZATION)
                .to_state()
                .update(&[i as u8])
                .update(&encoded)
                .finalize();

            chunk.copy_from_slice(hash.as_bytes());
        }

        Groth16Proof(proof)
    }

    /// Checks the JoinSplit statement.
    ///
    /// <https://zips.z.cash/protocol/protocol.pdf#joinsplitstatement>
    fn check(witness: &PrivateWitness, inputs: &PrimaryInputs) -> Result<(), ProvingError> {
        use ProvingError::MalformedWitness;

        for (index, input) in Index::BOTH.into_iter().zip(&witness.inputs) {
            let note = &input.note;
            let slot = usize::from(index);

            if note.paying_key != input.spending_key.paying_key() {
                return Err(MalformedWitness("input note is not owned by its spending key"));
            }

            // Merkle path validity is only enforced for notes with value.
            if !note.value.is_zero() && input.witness.root(note.commitment()) != inputs.anchor {
                return Err(MalformedWitness("input note is not committed under the anchor"));
            }

            if note.nullifier(&input.spending_key) != inputs.nullifiers[slot] {
                return Err(MalformedWitness("input nullifier does not match its note"));
            }

            if Mac::new(&input.spending_key, index, &inputs.h_sig) != inputs.vmacs[slot] {
                return Err(MalformedWitness("input MAC does not match h_sig"));
            }
        }

        for (index, note) in Index::BOTH.into_iter().zip(&witness.outputs) {
            if note.rho != witness.phi.rho(index, &inputs.h_sig) {
                return Err(MalformedWitness("output rho is not derived from phi"));
            }

            if note.commitment() != inputs.commitments[usize::from(index)] {
                return Err(MalformedWitness("output commitment does not match its note"));
            }
        }

        let old: i128 = witness
            .inputs
            .iter()
            .map(|input| i128::from(input.note.value.zatoshis()))
            .sum::<i128>()
            + i128::from(inputs.vpub_old.zatoshis());
        let new: i128 = witness
            .outputs
            .iter()
            .map(|note| i128::from(note.value.zatoshis()))
            .sum::<i128>()
            + i128::from(inputs.vpub_new.zatoshis());

        if old != new {
            return Err(MalformedWitness("JoinSplit values are not balanced"));
        }

        Ok(())
    }
}

impl ProofSystem for MockProofSystem {
    type Proof = Groth16Proof;

    fn prove(
        &self,
        witness: &PrivateWitness,
        inputs: &PrimaryInputs,
    ) -> Result<Self::Proof, ProvingError> {
        Self::check(witness, inputs)?;

        tracing::trace!(anchor = ?inputs.anchor, "created mock JoinSplit proof");

        Ok(Self::proof_for(inputs))
    }

    fn verify(&self, proof: &Self::Proof, inputs: &PrimaryInputs) -> bool {
        *proof == Self::proof_for(inputs)
    }
}
