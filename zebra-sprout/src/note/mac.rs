use std::io::{self, Read};

use serde::{Deserialize, Serialize};

use crate::{
    joinsplit::Index,
    keys::SpendingKey,
    prf::prf_pk,
    serialization::{ReadZcashExt, SerializationError, ZcashDeserialize, ZcashSerialize},
};

/// A message authentication tag, `h_i`.
///
/// Binds h_sig to each a_sk of the JoinSplit description, computed as
/// described in § 4.10 ‘Non-malleability (Sprout)’.
#[derive(Copy, PartialEq, Eq, Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub struct Mac([u8; 32]);

impl Mac {
    /// h_i = PRF^pk_{a_sk_i}(i, h_sig), for input `index`.
    pub fn new(spending_key: &SpendingKey, index: Index, h_sig: &[u8; 32]) -> Self {
        Self(prf_pk(spending_key.as_bytes(), index, h_sig))
    }
}

impl From<[u8; 32]> for Mac {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<&Mac> for [u8; 32] {
    fn from(mac: &Mac) -> Self {
        mac.0
    }
}

impl ZcashDeserialize for Mac {
    fn zcash_deserialize<R: Read>(mut reader: R) -> Result<Self, SerializationError> {
        let bytes = reader.read_32_bytes()?;

        Ok(Self(bytes))
    }
}

impl ZcashSerialize for Mac {
    fn zcash_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_all(&self.0[..])
    }
}
