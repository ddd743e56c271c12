//! Sprout notes

#[cfg(any(test, feature = "proptest-impl"))]
mod arbitrary;
mod ciphertexts;
mod mac;
mod memo;
mod nullifiers;
mod plaintext;

#[cfg(test)]
mod tests;

use rand_core::{CryptoRng, RngCore};

use crate::{
    amount::{Amount, NonNegative},
    commitment::{CommitmentRandomness, NoteCommitment},
    error::RandError,
    keys::{PayingKey, SpendingKey},
};

pub use ciphertexts::EncryptedNote;
pub use mac::Mac;
pub use memo::Memo;
pub use nullifiers::{Nullifier, NullifierSeed, Phi};
pub use plaintext::{NotePlaintext, NOTE_PLAINTEXT_SIZE};

/// A Note represents that a value is spendable by the recipient who
/// holds the spending key corresponding to a given shielded payment
/// address.
///
/// <https://zips.z.cash/protocol/protocol.pdf#notes>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub struct Note {
    /// The paying key of the recipient's shielded payment address
    pub paying_key: PayingKey,
    /// An integer representing the value of the note in zatoshi (1 ZEC
    /// = 10^8 zatoshi)
    pub value: Amount<NonNegative>,
    /// Input to PRF^nf to derive the nullifier of the note
    pub rho: NullifierSeed,
    /// A random commitment trapdoor
    pub rcm: CommitmentRandomness,
}

impl Note {
    /// Create a note owned by `paying_key`, with fresh commitment randomness.
    pub fn new<T>(
        csprng: &mut T,
        paying_key: PayingKey,
        value: Amount<NonNegative>,
        rho: NullifierSeed,
    ) -> Result<Self, RandError>
    where
        T: RngCore + CryptoRng,
    {
        Ok(Self {
            paying_key,
            value,
            rho,
            rcm: CommitmentRandomness::new(csprng)?,
        })
    }

    /// Returns the commitment to this note.
    pub fn commitment(&self) -> NoteCommitment {
        NoteCommitment::from(self)
    }

    /// Returns the nullifier that reveals this note was spent.
    ///
    /// Only the owner of the note can compute it, because it is keyed by
    /// their `spending_key`.
    pub fn nullifier(&self, spending_key: &SpendingKey) -> Nullifier {
        Nullifier::from((spending_key, self.rho))
    }
}
