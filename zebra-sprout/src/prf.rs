//! Pseudo-random functions instantiated with the SHA-256 compression function.
//!
//! Sprout uses four PRFs keyed by 252-bit secrets. Each of them fills the
//! four most significant bits of the key with a distinct prefix, so the
//! functions are independent even though they share one compression function.
//!
//! <https://zips.z.cash/protocol/protocol.pdf#concreteprfs>

use byteorder::{BigEndian, ByteOrder};
use sha2::digest::generic_array::{typenum::U64, GenericArray};
use zeroize::Zeroize;

use crate::joinsplit::Index;

/// H256: SHA-256 initial state.
// https://github.com/RustCrypto/hashes/blob/master/sha2/src/consts.rs#L170
const SHA256_IV: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// `1100`: PRF^addr
const ADDR_PREFIX: u8 = 0b1100_0000;
/// `1110`: PRF^nf
const NF_PREFIX: u8 = 0b1110_0000;
/// `0i00`: PRF^pk
const PK_PREFIX: u8 = 0b0000_0000;
/// `0i10`: PRF^rho
const RHO_PREFIX: u8 = 0b0010_0000;

/// SHA256Compress(left || right), without padding or length.
///
/// Yes, SHA-256 does big endian here.
pub(crate) fn sha256_compress(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut block = GenericArray::<u8, U64>::default();
    block.as_mut_slice()[..32].copy_from_slice(&left[..]);
    block.as_mut_slice()[32..].copy_from_slice(&right[..]);

    let mut state = SHA256_IV;
    sha2::compress256(&mut state, &[block]);

    // The block may hold key material.
    block.as_mut_slice().zeroize();

    let mut derived_bytes = [0u8; 32];
    BigEndian::write_u32_into(&state, &mut derived_bytes);

    derived_bytes
}

/// Compress `key` (with its top four bits replaced by `prefix`) and `input`.
fn prf(prefix: u8, key: &[u8; 32], input: &[u8; 32]) -> [u8; 32] {
    let mut keyed = *key;
    keyed[0] = (keyed[0] & 0b0000_1111) | prefix;

    let output = sha256_compress(&keyed, input);
    keyed.zeroize();

    output
}

/// Returns the prefix bit that selects input or output `index`.
fn index_bit(index: Index) -> u8 {
    match index {
        Index::First => 0,
        Index::Second => 0b0100_0000,
    }
}

/// PRF^addr_{a_sk}(t), used to derive `a_pk` (t = 0) and `sk_enc` (t = 1).
pub(crate) fn prf_addr(a_sk: &[u8; 32], t: u8) -> [u8; 32] {
    let mut input = [0u8; 32];
    input[0] = t;

    prf(ADDR_PREFIX, a_sk, &input)
}

/// PRF^nf_{a_sk}(rho), the nullifier of a note with nullifier seed `rho`.
pub(crate) fn prf_nf(a_sk: &[u8; 32], rho: &[u8; 32]) -> [u8; 32] {
    prf(NF_PREFIX, a_sk, rho)
}

/// PRF^pk_{a_sk}(i, h_sig), the MAC that binds input `index` to `h_sig`.
pub(crate) fn prf_pk(a_sk: &[u8; 32], index: Index, h_sig: &[u8; 32]) -> [u8; 32] {
    prf(PK_PREFIX | index_bit(index), a_sk, h_sig)
}

/// PRF^rho_{phi}(i, h_sig), the nullifier seed of output `index`.
pub(crate) fn prf_rho(phi: &[u8; 32], index: Index, h_sig: &[u8; 32]) -> [u8; 32] {
    prf(RHO_PREFIX | index_bit(index), phi, h_sig)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA256Compress of an all-zero block is the first non-leaf empty node
    /// of the Sprout note commitment tree.
    #[test]
    fn compress_zero_block() {
        zebra_test::init();

        assert_eq!(
            hex::encode(sha256_compress(&[0; 32], &[0; 32])),
            "da5698be17b9b46962335799779fbeca8ce5d491c0d26243bafef9ea1837a9d8"
        );
    }

    #[test]
    fn prfs_are_domain_separated() {
        zebra_test::init();

        let key = [0x0a; 32];
        let input = [0x55; 32];

        let outputs = [
            prf_nf(&key, &input),
            prf_pk(&key, Index::First, &input),
            prf_pk(&key, Index::Second, &input),
            prf_rho(&key, Index::First, &input),
            prf_rho(&key, Index::Second, &input),
        ];

        for (i, a) in outputs.iter().enumerate() {
            for b in outputs.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }

        assert_ne!(prf_addr(&key, 0), prf_addr(&key, 1));
    }

    #[test]
    fn prf_ignores_key_prefix_bits() {
        zebra_test::init();

        let mut key = [0x0a; 32];
        let input = [0x55; 32];
        let expected = prf_nf(&key, &input);

        key[0] |= 0xf0;

        assert_eq!(prf_nf(&key, &input), expected);
    }
}
