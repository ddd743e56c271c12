//! In-band secret distribution for Sprout notes.
//!
//! Each JoinSplit encrypts its two output notes to their recipients' transmission
//! keys, so recipients can find their notes by trial-decrypting every
//! ciphertext on the ledger. Both ciphertexts share one ephemeral key, and the
//! symmetric keys are bound to `h_sig`, so a ciphertext can't be moved to
//! another JoinSplit.
//!
//! <https://zips.z.cash/protocol/protocol.pdf#sproutinband>

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    error::RandError,
    joinsplit::Index,
    keys::{IncomingViewingKey, TransmissionKey},
    note::{EncryptedNote, Note, NotePlaintext, NOTE_PLAINTEXT_SIZE},
    primitives::x25519,
};


/// The size of the Poly1305 authentication tag.
const TAG_SIZE: usize = 16;

/// Each symmetric key encrypts exactly one note, so the nonce is fixed.
const NONCE: [u8; 12] = [0; 12];

/// KDF^Sprout(i, h_sig, sharedSecret_i, epk, pk_enc_i)
///
/// <https://zips.z.cash/protocol/protocol.pdf#sproutkdf>
fn kdf(
    index: Index,
    h_sig: &[u8; 32],
    shared_secret: &x25519::SharedSecret,
    epk: &x25519::PublicKey,
    pk_enc: &TransmissionKey,
) -> Zeroizing<[u8; 32]> {
    let mut personal = [0u8; 16];
    personal[..8].copy_from_slice(b"ZcashKDF");
    personal[8] = u8::from(index);

    let hash = blake2b_simd::Params::new()
        .hash_length(32)
        .personal(&personal)
        .to_state()
        .update(h_sig)
        .update(shared_secret.as_bytes())
        .update(epk.as_bytes())
        .update(pk_enc.0.as_bytes())
        .finalize();

    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(hash.as_bytes());

    key
}

/// Encrypts the outputs of one JoinSplit under a shared ephemeral key.
pub struct NoteEncryptor {
    esk: x25519::StaticSecret,
    epk: x25519::PublicKey,
    h_sig: [u8; 32],
}

impl NoteEncryptor {
    /// Generates a fresh ephemeral key pair for the JoinSplit with `h_sig`.
    pub fn new<T>(csprng: &mut T, h_sig: [u8; 32]) -> Result<Self, RandError>
    where
        T: RngCore + CryptoRng,
    {
        let mut bytes = [0u8; 32];
        csprng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| RandError::FillBytes)?;

        let esk = x25519::StaticSecret::from(bytes);
        bytes.zeroize();
        let epk = x25519::PublicKey::from(&esk);

        Ok(Self { esk, epk, h_sig })
    }

    /// The ephemeral public key, published in the JoinSplit.
    pub fn epk(&self) -> x25519::PublicKey {
        self.epk
    }

    /// Encrypts `plaintext` as output `index`, to the owner of `pk_enc`.
    pub fn encrypt(
        &self,
        index: Index,
        plaintext: &NotePlaintext,
        pk_enc: &TransmissionKey,
    ) -> EncryptedNote {
        let shared_secret = self.esk.diffie_hellman(&pk_enc.0);
        let key = kdf(index, &self.h_sig, &shared_secret, &self.epk, pk_enc);

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key[..]));
        let encrypted = cipher
            .encrypt(Nonce::from_slice(&NONCE), &plaintext.to_bytes()[..])
            .expect("note plaintexts are much shorter than the ChaCha20 keystream");

        let mut ciphertext = [0u8; NOTE_PLAINTEXT_SIZE + TAG_SIZE];
        ciphertext.copy_from_slice(&encrypted);

        EncryptedNote(ciphertext)
    }
}

/// Encrypts a single note to `pk_enc` under a fresh ephemeral key.
///
/// JoinSplits use [`NoteEncryptor`] to share one ephemeral key between
/// their two outputs.
pub fn encrypt<T>(
    csprng: &mut T,
    h_sig: [u8; 32],
    index: Index,
    plaintext: &NotePlaintext,
    pk_enc: &TransmissionKey,
) -> Result<(x25519::PublicKey, EncryptedNote), RandError>
where
    T: RngCore + CryptoRng,
{
    let encryptor = NoteEncryptor::new(csprng, h_sig)?;
    let ciphertext = encryptor.encrypt(index, plaintext, pk_enc);

    Ok((encryptor.epk(), ciphertext))
}

/// Trial-decrypts output `index` of the JoinSplit with `h_sig`.
///
/// Returns `None` if the note was not sent to `ivk`. That is the expected
/// result for most ciphertexts, so it is not an error.
pub fn decrypt_plaintext(
    ivk: &IncomingViewingKey,
    ciphertext: &EncryptedNote,
    epk: &x25519::PublicKey,
    h_sig: &[u8; 32],
    index: Index,
) -> Option<NotePlaintext> {
    let pk_enc = TransmissionKey::from(&ivk.receiving_key);
    let shared_secret = ivk.receiving_key.secret().diffie_hellman(epk);
    let key = kdf(index, h_sig, &shared_secret, epk, &pk_enc);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key[..]));
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&NONCE), &ciphertext.0[..])
            .ok()?,
    );

    let plaintext = <&[u8; NOTE_PLAINTEXT_SIZE]>::try_from(&plaintext[..]).ok()?;

    match NotePlaintext::from_bytes(plaintext) {
        Ok(plaintext) => Some(plaintext),
        Err(error) => {
            tracing::debug!(?error, "authenticated note plaintext is malformed");
            None
        }
    }
}

/// Trial-decrypts output `index` of the JoinSplit with `h_sig`, and returns
/// the note owned by `ivk`.
pub fn decrypt(
    ivk: &IncomingViewingKey,
    ciphertext: &EncryptedNote,
    epk: &x25519::PublicKey,
    h_sig: &[u8; 32],
    index: Index,
) -> Option<Note> {
    decrypt_plaintext(ivk, ciphertext, epk, h_sig, index)
        .map(|plaintext| plaintext.note(ivk.paying_key))
}
