//! Verification of JoinSplit descriptions.
//!
//! Verification is a pure check: it never changes the anchor set, and it
//! does not look at nullifiers. Rejecting double-spends is the job of the
//! ledger, which keeps the nullifier set.

use thiserror::Error;

use crate::{
    binding::BindingError,
    joinsplit::{JoinSplit, JoinSplitData},
    primitives::{ed25519, ProofSystem},
    tree::{AnchorSet, Root},
};

#[cfg(test)]
mod tests;

/// An error returned when a JoinSplit is rejected.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The anchor is not a root the note commitment tree has had.
    #[error("unknown anchor: {0:?}")]
    UnknownAnchor(Root),

    /// The proof is not valid for the public fields of the JoinSplit.
    #[error("invalid JoinSplit proof")]
    InvalidProof,

    /// The binding signature does not match the transaction.
    #[error(transparent)]
    Binding(#[from] BindingError),
}

/// Verifies one JoinSplit of the transaction with binding verification key
/// `joinsplit_pub_key`.
///
/// The anchor is checked first, so JoinSplits with unknown anchors are
/// rejected whatever their proof.
pub fn verify<S, A>(
    joinsplit: &JoinSplit<S::Proof>,
    joinsplit_pub_key: &ed25519::VerificationKeyBytes,
    anchors: &A,
    proof_system: &S,
) -> Result<(), VerifyError>
where
    S: ProofSystem + ?Sized,
    A: AnchorSet + ?Sized,
{
    if !anchors.contains_anchor(&joinsplit.anchor) {
        tracing::debug!(anchor = ?joinsplit.anchor, "rejected JoinSplit with unknown anchor");
        return Err(VerifyError::UnknownAnchor(joinsplit.anchor));
    }

    let primary_inputs = joinsplit.primary_inputs(joinsplit_pub_key);
    if !proof_system.verify(&joinsplit.zkproof, &primary_inputs) {
        tracing::debug!(
            anchor = ?joinsplit.anchor,
            nullifiers = ?joinsplit.nullifiers,
            "rejected JoinSplit with invalid proof"
        );
        return Err(VerifyError::InvalidProof);
    }

    Ok(())
}

/// Verifies every JoinSplit in `joinsplit_data`, then its binding
/// signature over the transaction with `tx_data`.
pub fn verify_all<S, A>(
    joinsplit_data: &JoinSplitData<S::Proof>,
    tx_data: &[u8],
    anchors: &A,
    proof_system: &S,
) -> Result<(), VerifyError>
where
    S: ProofSystem + ?Sized,
    A: AnchorSet + ?Sized,
{
    for joinsplit in joinsplit_data.joinsplits() {
        verify(joinsplit, &joinsplit_data.pub_key, anchors, proof_system)?;
    }

    if let Err(error) = joinsplit_data.verify_binding(tx_data) {
        tracing::debug!(?error, "rejected JoinSplits with invalid binding signature");
        return Err(error.into());
    }

    Ok(())
}
