//! Errors that can occur inside any `zebra-sprout` submodule.

use thiserror::Error;

/// Errors related to random bytes generation.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum RandError {
    /// Error of the `try_fill_bytes` function.
    #[error("failed to generate a secure stream of random bytes")]
    FillBytes,
}

/// An error type pertaining to key generation and parsing.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyError {
    /// Errors of type `RandError`.
    #[error("Randomness generation failure")]
    InsufficientRandomness(#[from] RandError),

    /// The four most significant bits of a spending key must be zero.
    #[error("spending key is outside the 252-bit key space")]
    InvalidSpendingKey,
}

/// A JoinSplit input or output index that is not 0 or 1.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("JoinSplits have two inputs and two outputs, but index {0} was requested")]
pub struct IndexError(pub usize);
