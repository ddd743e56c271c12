//! Sprout-style shielded transfers for Zebra. 🦓
//!
//! This crate implements the shielded half of a JoinSplit transfer:
//!
//! - [`keys`]: spending keys and the payment addresses derived from them,
//! - [`note`] and [`commitment`]: notes, their commitments and nullifiers,
//! - [`tree`]: the append-only note commitment tree, its anchors and witnesses,
//! - [`note_encryption`]: in-band delivery of output notes to their recipients,
//! - [`builder`] and [`verify`]: assembly and verification of two-input,
//!   two-output [`JoinSplit`] descriptions,
//! - [`binding`]: the one-time signature that ties JoinSplits to one transaction.
//!
//! The zero-knowledge proving system is not part of this crate. It is consumed
//! through the [`ProofSystem`] trait.

#![doc(html_favicon_url = "https://www.zfnd.org/images/zebra-favicon-128.png")]
#![doc(html_logo_url = "https://www.zfnd.org/images/zebra-icon.png")]
#![doc(html_root_url = "https://doc.zebra.zfnd.org/zebra_sprout")]
// Standard lints
#![warn(missing_docs)]
#![allow(clippy::try_err)]
#![deny(clippy::await_holding_lock)]
#![forbid(unsafe_code)]
// Each lazy_static variable uses additional recursion
#![recursion_limit = "256"]

#[cfg(any(test, feature = "proptest-impl"))]
mod arbitrary;
mod prf;

pub mod amount;
pub mod binding;
pub mod builder;
pub mod commitment;
pub mod config;
pub mod error;
pub mod fmt;
pub mod joinsplit;
pub mod keys;
pub mod note;
pub mod note_encryption;
pub mod parallel;
pub mod primitives;
pub mod serialization;
pub mod tree;
pub mod verify;


pub use builder::JoinSplitBuilder;
pub use config::Config;
pub use joinsplit::{JoinSplit, JoinSplitData};
pub use keys::{PaymentAddress, SpendingKey};
pub use note::{EncryptedNote, Note, Nullifier};
pub use primitives::proofs::ProofSystem;
