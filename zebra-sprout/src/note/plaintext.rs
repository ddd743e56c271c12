use zeroize::Zeroizing;

use crate::{
    amount::{Amount, NonNegative},
    commitment::CommitmentRandomness,
    keys::PayingKey,
    serialization::SerializationError,
};

use super::{Memo, Note, NullifierSeed};

/// The size of a serialized Sprout note plaintext.
pub const NOTE_PLAINTEXT_SIZE: usize = 1 + 8 + 32 + 32 + 512;

/// The leading byte of Sprout note plaintexts.
const LEAD_BYTE: u8 = 0x00;

/// The decrypted form of encrypted Sprout notes on the blockchain.
///
/// The owner's paying key is not part of the plaintext. The recipient
/// knows it from the incoming viewing key they decrypted the note with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotePlaintext {
    /// The value of the note.
    pub value: Amount<NonNegative>,
    /// The nullifier seed of the note.
    pub rho: NullifierSeed,
    /// The commitment trapdoor of the note.
    pub rcm: CommitmentRandomness,
    /// The memo attached by the sender.
    pub memo: Memo,
}

impl NotePlaintext {
    /// Create the plaintext that delivers `note` with `memo`.
    pub fn new(note: &Note, memo: Memo) -> Self {
        Self {
            value: note.value,
            rho: note.rho,
            rcm: note.rcm,
            memo,
        }
    }

    /// Rebuild the note, as owned by `paying_key`.
    pub fn note(&self, paying_key: PayingKey) -> Note {
        Note {
            paying_key,
            value: self.value,
            rho: self.rho,
            rcm: self.rcm,
        }
    }

    /// `0x00 || v || rho || rcm || memo`
    ///
    /// The returned buffer is zeroized when it is dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; NOTE_PLAINTEXT_SIZE]> {
        let mut bytes = Zeroizing::new([0u8; NOTE_PLAINTEXT_SIZE]);

        bytes[0] = LEAD_BYTE;
        bytes[1..9].copy_from_slice(&self.value.to_bytes());
        bytes[9..41].copy_from_slice(self.rho.as_ref());
        bytes[41..73].copy_from_slice(self.rcm.as_ref());
        bytes[73..].copy_from_slice(self.memo.as_ref());

        bytes
    }

    /// Parse a decrypted plaintext.
    pub fn from_bytes(bytes: &[u8; NOTE_PLAINTEXT_SIZE]) -> Result<Self, SerializationError> {
        if bytes[0] != LEAD_BYTE {
            return Err(SerializationError::Parse("invalid note plaintext lead byte"));
        }

        let mut value = [0u8; 8];
        value.copy_from_slice(&bytes[1..9]);
        let mut rho = [0u8; 32];
        rho.copy_from_slice(&bytes[9..41]);
        let mut rcm = [0u8; 32];
        rcm.copy_from_slice(&bytes[41..73]);
        let mut memo = [0u8; 512];
        memo.copy_from_slice(&bytes[73..]);

        Ok(Self {
            value: Amount::from_bytes(value)?,
            rho: rho.into(),
            rcm: rcm.into(),
            memo: memo.into(),
        })
    }
}
