//! External primitives used in Sprout structures.
//!
//! This contains re-exports of libraries used in the public API, as well as
//! the interface to the zero-knowledge proving system, whose functionality is
//! implemented elsewhere.

pub mod proofs;

pub use ed25519_zebra as ed25519;
pub use x25519_dalek as x25519;

pub use proofs::{Groth16Proof, ProofSystem, ZkSnarkProof};
