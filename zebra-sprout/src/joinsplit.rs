//! JoinSplit descriptions, and the bundle of descriptions that one
//! transaction signs with a single binding key.

use std::{fmt, io};

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
    amount::{self, Amount, NegativeAllowed, NonNegative},
    binding::{self, BindingError, BindingKey},
    commitment,
    error::{IndexError, RandError},
    keys::IncomingViewingKey,
    note::{self, Note},
    note_encryption,
    primitives::{ed25519, proofs::PrimaryInputs, x25519, Groth16Proof, ZkSnarkProof},
    serialization::{
        ReadZcashExt, SerializationError, TrustedPreallocate, WriteZcashExt, ZcashDeserialize,
        ZcashDeserializeInto, ZcashSerialize, MAX_PROTOCOL_MESSAGE_LEN,
    },
    tree,
};


/// Compute the [h_{Sig} hash function][1] which is used in JoinSplit descriptions.
///
/// `random_seed`: the random seed from the JoinSplit description.
/// `nf1`: the first nullifier from the JoinSplit description.
/// `nf2`: the second nullifier from the JoinSplit description.
/// `joinsplit_pub_key`: the JoinSplit public validation key from the transaction.
///
/// [1]: https://zips.z.cash/protocol/protocol.pdf#hsigcrh
pub fn h_sig(
    random_seed: &RandomSeed,
    nf1: &note::Nullifier,
    nf2: &note::Nullifier,
    joinsplit_pub_key: &ed25519::VerificationKeyBytes,
) -> [u8; 32] {
    let hash = blake2b_simd::Params::new()
        .hash_length(32)
        .personal(b"ZcashComputehSig")
        .to_state()
        .update(&random_seed.0)
        .update(&nf1.0)
        .update(&nf2.0)
        .update(joinsplit_pub_key.as_ref())
        .finalize();

    let mut h_sig = [0u8; 32];
    h_sig.copy_from_slice(hash.as_bytes());
    h_sig
}

/// One of the two inputs, or one of the two outputs, of a JoinSplit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub enum Index {
    /// Input or output 0.
    First,
    /// Input or output 1.
    Second,
}

impl Index {
    /// Both indexes, in serialization order.
    pub const BOTH: [Index; 2] = [Index::First, Index::Second];
}

impl From<Index> for usize {
    fn from(index: Index) -> Self {
        match index {
            Index::First => 0,
            Index::Second => 1,
        }
    }
}

impl From<Index> for u8 {
    fn from(index: Index) -> Self {
        match index {
            Index::First => 0,
            Index::Second => 1,
        }
    }
}

impl TryFrom<usize> for Index {
    type Error = IndexError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Index::First),
            1 => Ok(Index::Second),
            _ => Err(IndexError(index)),
        }
    }
}

/// A 256-bit seed that must be chosen independently at
/// random for each [JoinSplit description].
///
/// [JoinSplit description]: https://zips.z.cash/protocol/protocol.pdf#joinsplitencodingandconsensus
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub struct RandomSeed([u8; 32]);

impl RandomSeed {
    /// Sample a fresh random seed.
    pub fn new<T>(csprng: &mut T) -> Result<Self, RandError>
    where
        T: RngCore + CryptoRng,
    {
        let mut bytes = [0u8; 32];
        csprng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| RandError::FillBytes)?;

        Ok(Self(bytes))
    }
}

impl fmt::Debug for RandomSeed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("RandomSeed")
            .field(&hex::encode(self.0))
            .finish()
    }
}

impl From<[u8; 32]> for RandomSeed {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<RandomSeed> for [u8; 32] {
    fn from(rt: RandomSeed) -> [u8; 32] {
        rt.0
    }
}

/// A _JoinSplit Description_, as described in [protocol specification §7.2][ps].
///
/// A JoinSplit spends two notes and creates two notes. Slots the sender
/// doesn't need are filled with zero-valued decoys by the
/// [`JoinSplitBuilder`](crate::JoinSplitBuilder), so every description has
/// the same shape.
///
/// [ps]: https://zips.z.cash/protocol/protocol.pdf#joinsplitencoding
#[derive(PartialEq, Eq, Clone, Debug, Serialize, Deserialize)]
pub struct JoinSplit<P: ZkSnarkProof> {
    /// A value that the JoinSplit transfer removes from the transparent value
    /// pool.
    pub vpub_old: Amount<NonNegative>,
    /// A value that the JoinSplit transfer inserts into the transparent value
    /// pool.
    pub vpub_new: Amount<NonNegative>,
    /// A root of the Sprout note commitment tree at some point in the past.
    pub anchor: tree::Root,
    /// A nullifier for the input notes.
    pub nullifiers: [note::Nullifier; 2],
    /// A note commitment for this output note.
    pub commitments: [commitment::NoteCommitment; 2],
    /// An X25519 public key, shared by both output ciphertexts.
    pub ephemeral_key: x25519::PublicKey,
    /// A 256-bit seed that must be chosen independently at random for each
    /// JoinSplit description.
    pub random_seed: RandomSeed,
    /// A message authentication tag.
    pub vmacs: [note::Mac; 2],
    /// A ZK JoinSplit proof.
    #[serde(bound(serialize = "P: ZkSnarkProof", deserialize = "P: ZkSnarkProof"))]
    pub zkproof: P,
    /// A ciphertext component for this output note.
    pub enc_ciphertexts: [note::EncryptedNote; 2],
}

impl<P: ZkSnarkProof> JoinSplit<P> {
    /// Return the sprout value balance,
    /// the change in the transparent value pool due to this [`JoinSplit`].
    pub fn value_balance(&self) -> Amount<NegativeAllowed> {
        let vpub_new = self
            .vpub_new
            .constrain()
            .expect("constrain::NegativeAllowed is always valid");
        let vpub_old = self
            .vpub_old
            .constrain()
            .expect("constrain::NegativeAllowed is always valid");

        (vpub_new - vpub_old).expect("subtraction of two valid amounts is a valid NegativeAllowed")
    }

    /// Returns the `h_sig` of this JoinSplit, for the transaction signed by
    /// `joinsplit_pub_key`.
    pub fn h_sig(&self, joinsplit_pub_key: &ed25519::VerificationKeyBytes) -> [u8; 32] {
        h_sig(
            &self.random_seed,
            &self.nullifiers[0],
            &self.nullifiers[1],
            joinsplit_pub_key,
        )
    }

    /// Returns the public inputs of the JoinSplit statement.
    ///
    /// `joinsplit_pub_key`: the JoinSplit public validation key for this JoinSplit, from
    /// the transaction. (All JoinSplits in a transaction share the same validation key.)
    pub fn primary_inputs(&self, joinsplit_pub_key: &ed25519::VerificationKeyBytes) -> PrimaryInputs {
        PrimaryInputs {
            anchor: self.anchor,
            h_sig: self.h_sig(joinsplit_pub_key),
            nullifiers: self.nullifiers,
            vmacs: self.vmacs,
            commitments: self.commitments,
            vpub_old: self.vpub_old,
            vpub_new: self.vpub_new,
        }
    }

    /// Trial-decrypts output `index` with `ivk`.
    ///
    /// Returns `None` if that output was not sent to `ivk`, or if `index` is
    /// not 0 or 1.
    pub fn decrypt_output(
        &self,
        ivk: &IncomingViewingKey,
        joinsplit_pub_key: &ed25519::VerificationKeyBytes,
        index: usize,
    ) -> Option<Note> {
        let index = Index::try_from(index).ok()?;
        let h_sig = self.h_sig(joinsplit_pub_key);

        note_encryption::decrypt(
            ivk,
            &self.enc_ciphertexts[usize::from(index)],
            &self.ephemeral_key,
            &h_sig,
            index,
        )
    }
}

impl<P: ZkSnarkProof> ZcashSerialize for JoinSplit<P> {
    fn zcash_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        self.vpub_old.zcash_serialize(&mut writer)?;
        self.vpub_new.zcash_serialize(&mut writer)?;
        writer.write_32_bytes(&self.anchor.into())?;
        writer.write_32_bytes(&self.nullifiers[0].into())?;
        writer.write_32_bytes(&self.nullifiers[1].into())?;
        writer.write_32_bytes(&self.commitments[0].into())?;
        writer.write_32_bytes(&self.commitments[1].into())?;
        writer.write_all(&self.ephemeral_key.as_bytes()[..])?;
        writer.write_32_bytes(&self.random_seed.into())?;
        self.vmacs[0].zcash_serialize(&mut writer)?;
        self.vmacs[1].zcash_serialize(&mut writer)?;
        self.zkproof.zcash_serialize(&mut writer)?;
        self.enc_ciphertexts[0].zcash_serialize(&mut writer)?;
        self.enc_ciphertexts[1].zcash_serialize(&mut writer)?;
        Ok(())
    }
}

impl<P: ZkSnarkProof> ZcashDeserialize for JoinSplit<P> {
    fn zcash_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(JoinSplit::<P> {
            vpub_old: (&mut reader).zcash_deserialize_into()?,
            vpub_new: (&mut reader).zcash_deserialize_into()?,
            anchor: tree::Root::from(reader.read_32_bytes()?),
            nullifiers: [
                reader.read_32_bytes()?.into(),
                reader.read_32_bytes()?.into(),
            ],
            commitments: [
                commitment::NoteCommitment::from(reader.read_32_bytes()?),
                commitment::NoteCommitment::from(reader.read_32_bytes()?),
            ],
            ephemeral_key: x25519::PublicKey::from(reader.read_32_bytes()?),
            random_seed: RandomSeed::from(reader.read_32_bytes()?),
            vmacs: [
                note::Mac::zcash_deserialize(&mut reader)?,
                note::Mac::zcash_deserialize(&mut reader)?,
            ],
            zkproof: P::zcash_deserialize(&mut reader)?,
            enc_ciphertexts: [
                note::EncryptedNote::zcash_deserialize(&mut reader)?,
                note::EncryptedNote::zcash_deserialize(&mut reader)?,
            ],
        })
    }
}

/// The size of a joinsplit, excluding the ZkProof
///
/// Excluding the ZkProof, a Joinsplit consists of an 8 byte vpub_old, an 8 byte vpub_new, a 32 byte anchor,
/// two 32 byte nullifiers, two 32 byte commitments, a 32 byte ephemeral key, a 32 byte random seed
/// two 32 byte vmacs, and two 601 byte encrypted ciphertexts.
const JOINSPLIT_SIZE_WITHOUT_ZKPROOF: u64 =
    8 + 8 + 32 + (32 * 2) + (32 * 2) + 32 + 32 + (32 * 2) + (601 * 2);

/// The size of a joinsplit with a Groth16 proof.
///
/// A Groth16 proof takes 192 bytes, per the Zcash [protocol specification §7.2][ps]
///
/// [ps]: https://zips.z.cash/protocol/protocol.pdf#joinsplitencoding
pub const GROTH16_JOINSPLIT_SIZE: u64 = JOINSPLIT_SIZE_WITHOUT_ZKPROOF + 192;

impl TrustedPreallocate for JoinSplit<Groth16Proof> {
    // The longest Vec<JoinSplit> we receive from an honest peer must fit inside a protocol message.
    // Since encoding the length of the vec takes at least one byte
    // (MAX_PROTOCOL_MESSAGE_LEN - 1) / GROTH16_JOINSPLIT_SIZE is a loose upper bound on the max allocation
    fn max_allocation() -> u64 {
        (MAX_PROTOCOL_MESSAGE_LEN as u64 - 1) / GROTH16_JOINSPLIT_SIZE
    }
}

/// BLAKE2b personalization for the digest signed by the binding key.
const SIGHASH_PERSONALIZATION: &[u8; 16] = b"ZebraSproutSigHs";

/// Computes the digest that the binding key signs.
///
/// It commits to the transaction data outside the JoinSplits, to every
/// JoinSplit, and to the binding verification key itself. It never
/// includes the signature.
fn sighash<'a, P, I>(
    tx_data: &[u8],
    count: usize,
    joinsplits: I,
    pub_key: &ed25519::VerificationKeyBytes,
) -> [u8; 32]
where
    P: ZkSnarkProof + 'a,
    I: Iterator<Item = &'a JoinSplit<P>>,
{
    let mut state = blake2b_simd::Params::new()
        .hash_length(32)
        .personal(SIGHASH_PERSONALIZATION)
        .to_state();

    state.update(tx_data);
    state
        .write_compactsize(count as u64)
        .expect("hashing into a BLAKE2b state is infallible");
    for joinsplit in joinsplits {
        joinsplit
            .zcash_serialize(&mut state)
            .expect("hashing into a BLAKE2b state is infallible");
    }
    state.update(pub_key.as_ref());

    let mut digest = [0u8; 32];
    digest.copy_from_slice(state.finalize().as_bytes());
    digest
}

/// A bundle of JoinSplit descriptions and signature data.
///
/// All JoinSplits in a transaction share one binding key. Their `h_sig`
/// values commit to its verification key, and the key signs a digest of
/// the whole bundle, so no JoinSplit can be replayed in another
/// transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSplitData<P: ZkSnarkProof> {
    /// The first JoinSplit description, using proofs of type `P`.
    ///
    /// Storing this separately from `rest` ensures that it is impossible
    /// to construct an invalid `JoinSplitData` with no `JoinSplit`s.
    ///
    /// However, it's not necessary to access or process `first` and `rest`
    /// separately, as the [`JoinSplitData::joinsplits`] method provides an
    /// iterator over all of the `JoinSplit`s.
    #[serde(bound(
        serialize = "JoinSplit<P>: Serialize",
        deserialize = "JoinSplit<P>: Deserialize<'de>"
    ))]
    pub first: JoinSplit<P>,
    /// The rest of the JoinSplit descriptions, using proofs of type `P`.
    ///
    /// The [`JoinSplitData::joinsplits`] method provides an iterator over
    /// all `JoinSplit`s.
    #[serde(bound(
        serialize = "JoinSplit<P>: Serialize",
        deserialize = "JoinSplit<P>: Deserialize<'de>"
    ))]
    pub rest: Vec<JoinSplit<P>>,
    /// The public key for the JoinSplit signature.
    pub pub_key: ed25519::VerificationKeyBytes,
    /// The JoinSplit signature.
    pub sig: ed25519::Signature,
}

impl<P: ZkSnarkProof> JoinSplitData<P> {
    /// Signs `first` and `rest`, built against the verification key of
    /// `binding_key`, as part of the transaction with `tx_data`.
    ///
    /// The binding key is consumed, so it can't sign anything else.
    pub fn sign(
        first: JoinSplit<P>,
        rest: Vec<JoinSplit<P>>,
        binding_key: BindingKey,
        tx_data: &[u8],
    ) -> Self {
        let pub_key = binding_key.verification_key();
        let digest = sighash(
            tx_data,
            rest.len() + 1,
            std::iter::once(&first).chain(rest.iter()),
            &pub_key,
        );
        let sig = binding_key.sign(&digest);

        tracing::debug!(joinsplits = rest.len() + 1, "signed JoinSplits");

        Self {
            first,
            rest,
            pub_key,
            sig,
        }
    }

    /// Iterate over the [`JoinSplit`]s in `self`.
    pub fn joinsplits(&self) -> impl Iterator<Item = &JoinSplit<P>> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    /// Returns the number of JoinSplits in `self`.
    pub fn joinsplit_count(&self) -> usize {
        self.rest.len() + 1
    }

    /// Returns the digest that [`Self::sig`] signs, for the transaction
    /// with `tx_data`.
    pub fn sighash(&self, tx_data: &[u8]) -> [u8; 32] {
        sighash(
            tx_data,
            self.joinsplit_count(),
            self.joinsplits(),
            &self.pub_key,
        )
    }

    /// Checks the binding signature against the transaction with `tx_data`.
    pub fn verify_binding(&self, tx_data: &[u8]) -> Result<(), BindingError> {
        binding::verify_binding(&self.sighash(tx_data), &self.pub_key, &self.sig)
    }

    /// Returns the nullifiers revealed by every JoinSplit.
    pub fn nullifiers(&self) -> impl Iterator<Item = &note::Nullifier> {
        self.joinsplits()
            .flat_map(|joinsplit| joinsplit.nullifiers.iter())
    }

    /// Returns the output note commitments of every JoinSplit, in the
    /// order they are appended to the note commitment tree.
    pub fn note_commitments(&self) -> impl Iterator<Item = &commitment::NoteCommitment> {
        self.joinsplits()
            .flat_map(|joinsplit| joinsplit.commitments.iter())
    }

    /// Return the sprout value balance of every JoinSplit in `self`.
    pub fn value_balance(&self) -> Result<Amount<NegativeAllowed>, amount::Error> {
        self.joinsplits()
            .map(|joinsplit| joinsplit.value_balance())
            .sum()
    }
}

impl<P: ZkSnarkProof> ZcashSerialize for JoinSplitData<P> {
    fn zcash_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_compactsize(self.joinsplit_count() as u64)?;
        for joinsplit in self.joinsplits() {
            joinsplit.zcash_serialize(&mut writer)?;
        }
        writer.write_32_bytes(&self.pub_key.into())?;
        writer.write_64_bytes(&self.sig.into())?;
        Ok(())
    }
}

impl<P> ZcashDeserialize for JoinSplitData<P>
where
    P: ZkSnarkProof,
    JoinSplit<P>: TrustedPreallocate,
{
    fn zcash_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        let mut joinsplits: Vec<JoinSplit<P>> = (&mut reader).zcash_deserialize_into()?;
        if joinsplits.is_empty() {
            return Err(SerializationError::Parse(
                "JoinSplitData must contain at least one JoinSplit",
            ));
        }
        let first = joinsplits.remove(0);

        Ok(Self {
            first,
            rest: joinsplits,
            pub_key: ed25519::VerificationKeyBytes::from(reader.read_32_bytes()?),
            sig: ed25519::Signature::from(reader.read_64_bytes()?),
        })
    }
}
