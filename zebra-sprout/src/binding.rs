//! The one-time signature that binds JoinSplits to one transaction.
//!
//! A fresh Ed25519 key is generated for each transaction, before its
//! JoinSplits are built. Each JoinSplit commits to the verification key
//! through `h_sig`, and the signing key signs a digest of the transaction,
//! so nobody can move the JoinSplits into another transaction.
//!
//! <https://zips.z.cash/protocol/protocol.pdf#sproutnonmalleability>

use std::fmt;

use rand_core::{CryptoRng, RngCore};
use thiserror::Error;
use zeroize::Zeroize;

use crate::{error::RandError, primitives::ed25519};


/// An error returned when a binding signature does not verify.
#[derive(Error, Debug)]
pub enum BindingError {
    /// The verification key is not a valid Ed25519 point, or the signature
    /// does not match the digest.
    #[error("invalid JoinSplit binding signature: {0}")]
    InvalidSignature(#[from] ed25519::Error),
}

/// The signing half of a transaction's binding key pair.
///
/// Signing consumes the key.
pub struct BindingKey {
    signing_key: ed25519::SigningKey,
}

impl BindingKey {
    /// Generates a binding key pair, and returns the signing key with the
    /// verification key the transaction publishes.
    pub fn new<T>(csprng: &mut T) -> Result<(Self, ed25519::VerificationKeyBytes), RandError>
    where
        T: RngCore + CryptoRng,
    {
        let mut seed = [0u8; 32];
        csprng
            .try_fill_bytes(&mut seed)
            .map_err(|_| RandError::FillBytes)?;

        let signing_key = ed25519::SigningKey::from(seed);
        seed.zeroize();

        let key = Self { signing_key };
        let verification_key = key.verification_key();

        Ok((key, verification_key))
    }

    /// The verification key that matches this signing key.
    pub fn verification_key(&self) -> ed25519::VerificationKeyBytes {
        ed25519::VerificationKeyBytes::from(&self.signing_key)
    }

    /// Signs `digest`, and discards the signing key.
    pub fn sign(self, digest: &[u8; 32]) -> ed25519::Signature {
        self.signing_key.sign(digest)
    }
}

impl fmt::Debug for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BindingKey")
            .field("verification_key", &self.verification_key())
            .finish_non_exhaustive()
    }
}

/// Generates a one-time key pair, and signs the digest that `digest_for`
/// computes from its verification key.
///
/// The digest is computed after the key pair exists, so it can commit to
/// the verification key.
pub fn bind<T, F>(
    csprng: &mut T,
    digest_for: F,
) -> Result<(ed25519::VerificationKeyBytes, ed25519::Signature), RandError>
where
    T: RngCore + CryptoRng,
    F: FnOnce(&ed25519::VerificationKeyBytes) -> [u8; 32],
{
    let (key, verification_key) = BindingKey::new(csprng)?;
    let digest = digest_for(&verification_key);

    Ok((verification_key, key.sign(&digest)))
}

/// Checks that `sig` is a signature of `digest` by `verification_key`.
pub fn verify_binding(
    digest: &[u8; 32],
    verification_key: &ed25519::VerificationKeyBytes,
    sig: &ed25519::Signature,
) -> Result<(), BindingError> {
    let verification_key = ed25519::VerificationKey::try_from(*verification_key)?;
    verification_key.verify(sig, digest)?;

    Ok(())
}
