//! Sprout key types.
//!
//! "The receiving key sk_enc, the incoming viewing key ivk = (apk,
//! sk_enc), and the shielded payment address addr_pk = (a_pk, pk_enc) are
//! derived from a_sk, as described in ['Sprout Key Components'][ps]
//!
//! Spending keys and receiving keys are secret. They are zeroized when they
//! are dropped, and their `Debug` output never contains key material.
//!
//! [ps]: https://zips.z.cash/protocol/protocol.pdf#sproutkeycomponents

use std::fmt;

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    error::{KeyError, RandError},
    prf::prf_addr,
    primitives::x25519,
};

#[cfg(test)]
mod tests;

/// Our root secret key of the Sprout key derivation tree.
///
/// All other Sprout key types derive from the [`SpendingKey`] value.
/// A spending key is a 252-bit value, so the four most significant
/// bits of its first byte are always zero.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SpendingKey([u8; 32]);

impl SpendingKey {
    /// Generate a new _SpendingKey_ from the supplied cryptographically secure
    /// random number generator.
    ///
    /// Fails if the random number generator can't produce enough bytes.
    /// There is no fallback source of randomness.
    pub fn new<T>(csprng: &mut T) -> Result<Self, RandError>
    where
        T: RngCore + CryptoRng,
    {
        let mut bytes = [0u8; 32];
        csprng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| RandError::FillBytes)?;

        // Truncate to 252 bits.
        bytes[0] &= 0b0000_1111;

        let key = Self(bytes);
        bytes.zeroize();

        Ok(key)
    }

    /// Generate a new _SpendingKey_ using the thread-local system randomness.
    pub fn random() -> Result<Self, RandError> {
        Self::new(&mut rand::thread_rng())
    }

    /// Derive the paying key `a_pk` for this spending key.
    pub fn paying_key(&self) -> PayingKey {
        PayingKey(prf_addr(&self.0, 0))
    }

    /// Derive the receiving key `sk_enc` for this spending key.
    pub fn receiving_key(&self) -> ReceivingKey {
        ReceivingKey::from(self)
    }

    /// Derive the incoming viewing key used to decrypt notes sent to this key.
    pub fn incoming_viewing_key(&self) -> IncomingViewingKey {
        IncomingViewingKey {
            paying_key: self.paying_key(),
            receiving_key: self.receiving_key(),
        }
    }

    /// Derive the shielded payment address for this spending key.
    pub fn address(&self) -> PaymentAddress {
        PaymentAddress::from(self)
    }

    /// Returns the secret key bytes.
    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl TryFrom<[u8; 32]> for SpendingKey {
    type Error = KeyError;

    /// Parse a spending key, rejecting values outside the 252-bit key space.
    ///
    /// Invalid keys are never truncated or otherwise corrected.
    fn try_from(mut bytes: [u8; 32]) -> Result<Self, Self::Error> {
        let result = if bytes[0] & 0b1111_0000 == 0 {
            Ok(Self(bytes))
        } else {
            Err(KeyError::InvalidSpendingKey)
        };
        bytes.zeroize();

        result
    }
}

impl fmt::Debug for SpendingKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("SpendingKey").field(&"<redacted>").finish()
    }
}

/// Derive the shielded payment address of a serialized spending key.
///
/// Returns an error if `spending_key` is not a valid 252-bit spending key.
pub fn derive_address(spending_key: [u8; 32]) -> Result<PaymentAddress, KeyError> {
    let spending_key = SpendingKey::try_from(spending_key)?;

    Ok(spending_key.address())
}

/// A Sprout _paying key_.
///
/// Derived from a Sprout _spending key.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub struct PayingKey(pub [u8; 32]);

impl AsRef<[u8]> for PayingKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for PayingKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<PayingKey> for [u8; 32] {
    fn from(a_pk: PayingKey) -> Self {
        a_pk.0
    }
}

impl fmt::Debug for PayingKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("PayingKey")
            .field(&hex::encode(self.0))
            .finish()
    }
}

/// A Sprout _receiving key_, `sk_enc`.
///
/// The X25519 secret used to agree on note encryption keys.
#[derive(Clone)]
pub struct ReceivingKey(x25519::StaticSecret);

impl ReceivingKey {
    /// Returns the X25519 secret of this receiving key.
    pub(crate) fn secret(&self) -> &x25519::StaticSecret {
        &self.0
    }
}

impl From<&SpendingKey> for ReceivingKey {
    /// sk_enc = clamp(PRF^addr_{a_sk}(1))
    fn from(spending_key: &SpendingKey) -> Self {
        let mut bytes = prf_addr(spending_key.as_bytes(), 1);

        bytes[0] &= 248;
        bytes[31] &= 127;
        bytes[31] |= 64;

        let secret = x25519::StaticSecret::from(bytes);
        bytes.zeroize();

        Self(secret)
    }
}

impl fmt::Debug for ReceivingKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ReceivingKey").field(&"<redacted>").finish()
    }
}

/// A Sprout _transmission key_, `pk_enc`.
///
/// The public half of the [`ReceivingKey`].
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct TransmissionKey(pub x25519::PublicKey);

impl From<&ReceivingKey> for TransmissionKey {
    fn from(receiving_key: &ReceivingKey) -> Self {
        Self(x25519::PublicKey::from(&receiving_key.0))
    }
}

impl From<[u8; 32]> for TransmissionKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(x25519::PublicKey::from(bytes))
    }
}

impl From<TransmissionKey> for [u8; 32] {
    fn from(pk_enc: TransmissionKey) -> Self {
        pk_enc.0.to_bytes()
    }
}

impl fmt::Debug for TransmissionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("TransmissionKey")
            .field(&hex::encode(self.0.as_bytes()))
            .finish()
    }
}

/// A Sprout _incoming viewing key_, `(a_pk, sk_enc)`.
///
/// Allows the holder to detect and decrypt notes sent to the matching
/// [`PaymentAddress`], but not to spend them.
#[derive(Clone, Debug)]
pub struct IncomingViewingKey {
    /// The paying key, which owns every note decrypted with this key.
    pub paying_key: PayingKey,
    /// The receiving key, used for key agreement.
    pub receiving_key: ReceivingKey,
}

impl IncomingViewingKey {
    /// Returns the payment address that this key can receive notes for.
    pub fn address(&self) -> PaymentAddress {
        PaymentAddress {
            paying_key: self.paying_key,
            transmission_key: TransmissionKey::from(&self.receiving_key),
        }
    }
}

/// A Sprout _shielded payment address_, `(a_pk, pk_enc)`.
///
/// Payment addresses are public, and can be shared with anyone who wants to
/// send notes to their owner.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PaymentAddress {
    /// The paying key, which becomes the owner of notes sent to this address.
    pub paying_key: PayingKey,
    /// The transmission key, used to encrypt notes sent to this address.
    pub transmission_key: TransmissionKey,
}

impl From<&SpendingKey> for PaymentAddress {
    fn from(spending_key: &SpendingKey) -> Self {
        Self {
            paying_key: spending_key.paying_key(),
            transmission_key: TransmissionKey::from(&spending_key.receiving_key()),
        }
    }
}
