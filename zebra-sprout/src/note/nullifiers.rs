use std::{fmt, io};

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    error::RandError,
    joinsplit::Index,
    keys::SpendingKey,
    prf::{prf_nf, prf_rho},
    serialization::{ReadZcashExt, SerializationError, ZcashDeserialize, ZcashSerialize},
};

/// Nullifier seed, named rho in the [spec][ps].
///
/// [ps]: https://zips.z.cash/protocol/protocol.pdf#sproutkeycomponents
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub struct NullifierSeed(pub(crate) [u8; 32]);

impl NullifierSeed {
    /// Sample a uniformly random nullifier seed.
    ///
    /// Output notes derive their seeds from `phi` instead, see
    /// [`JoinSplit`](crate::JoinSplit).
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

impl AsRef<[u8]> for NullifierSeed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for NullifierSeed {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<NullifierSeed> for [u8; 32] {
    fn from(rho: NullifierSeed) -> Self {
        rho.0
    }
}

/// The secret seed of the output nullifier seeds of one JoinSplit, `phi`.
///
/// Output notes don't sample `rho` directly. It is derived from `phi` and
/// `h_sig`, so the nullifiers of output notes are unique even if the
/// sender's randomness is not.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Phi([u8; 32]);

impl Phi {
    /// Sample a fresh 252-bit `phi`.
    pub fn new<T>(csprng: &mut T) -> Result<Self, RandError>
    where
        T: RngCore + CryptoRng,
    {
        let mut bytes = [0u8; 32];
        csprng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| RandError::FillBytes)?;
        bytes[0] &= 0b0000_1111;

        let phi = Self(bytes);
        bytes.zeroize();

        Ok(phi)
    }

    /// rho_i = PRF^rho_phi(i, h_sig), the nullifier seed of output `index`.
    pub fn rho(&self, index: Index, h_sig: &[u8; 32]) -> NullifierSeed {
        NullifierSeed(prf_rho(&self.0, index, h_sig))
    }
}

impl fmt::Debug for Phi {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Phi").field(&"<redacted>").finish()
    }
}

/// A Nullifier for Sprout transactions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub struct Nullifier(pub [u8; 32]);

impl From<[u8; 32]> for Nullifier {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl<'a> From<(&'a SpendingKey, NullifierSeed)> for Nullifier {
    /// nf = PRF^nf_{a_sk}(rho)
    fn from((a_sk, rho): (&'a SpendingKey, NullifierSeed)) -> Self {
        Self(prf_nf(a_sk.as_bytes(), &rho.0))
    }
}

impl From<Nullifier> for [u8; 32] {
    fn from(n: Nullifier) -> Self {
        n.0
    }
}

impl From<&Nullifier> for [u8; 32] {
    fn from(n: &Nullifier) -> Self {
        n.0
    }
}

impl ZcashSerialize for Nullifier {
    fn zcash_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.0[..])
    }
}

impl ZcashDeserialize for Nullifier {
    fn zcash_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(Self(reader.read_32_bytes()?))
    }
}
