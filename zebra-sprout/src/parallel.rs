//! Parallel note scanning and JoinSplit proving, using `rayon` threads.
//!
//! Use [`Config::thread_pool`](crate::Config::thread_pool) to build the pool.

use rayon::prelude::*;

use crate::{
    builder::{BuildError, JoinSplitBuilder},
    joinsplit::{JoinSplit, JoinSplitData},
    keys::IncomingViewingKey,
    note::Note,
    primitives::{ed25519, ProofSystem, ZkSnarkProof},
};

#[cfg(test)]
mod tests;

/// Trial-decrypts every output of every JoinSplit in `joinsplit_data` with
/// `ivk`, one task per ciphertext.
///
/// Returns `(joinsplit index, output index, note)` for each output sent to
/// `ivk`, in the order the outputs appear in `joinsplit_data`.
pub fn trial_decrypt_all<P>(
    pool: &rayon::ThreadPool,
    ivk: &IncomingViewingKey,
    joinsplit_data: &JoinSplitData<P>,
) -> Vec<(usize, usize, Note)>
where
    P: ZkSnarkProof,
{
    let pub_key = joinsplit_data.pub_key;
    let outputs: Vec<(usize, usize, &JoinSplit<P>)> = joinsplit_data
        .joinsplits()
        .enumerate()
        .flat_map(|(joinsplit_index, joinsplit)| {
            (0..2).map(move |output_index| (joinsplit_index, output_index, joinsplit))
        })
        .collect();

    let span = tracing::Span::current();
    let notes: Vec<_> = pool.install(|| {
        outputs
            .into_par_iter()
            .filter_map(|(joinsplit_index, output_index, joinsplit)| {
                span.in_scope(|| {
                    joinsplit
                        .decrypt_output(ivk, &pub_key, output_index)
                        .map(|note| (joinsplit_index, output_index, note))
                })
            })
            .collect()
    });

    tracing::debug!(
        joinsplits = joinsplit_data.joinsplit_count(),
        found = notes.len(),
        "trial-decrypted JoinSplit outputs"
    );

    notes
}

/// Builds independent JoinSplits for the transaction with binding
/// verification key `joinsplit_pub_key`, one task per JoinSplit.
///
/// Each task draws its randomness from its thread's `ThreadRng`. Returns
/// the JoinSplits in the order of `builders`, or the first error.
pub fn build_all<S>(
    pool: &rayon::ThreadPool,
    builders: Vec<JoinSplitBuilder>,
    joinsplit_pub_key: &ed25519::VerificationKeyBytes,
    proof_system: &S,
) -> Result<Vec<JoinSplit<S::Proof>>, BuildError>
where
    S: ProofSystem + ?Sized,
{
    let span = tracing::Span::current();

    pool.install(|| {
        builders
            .into_par_iter()
            .map(|builder| {
                span.in_scope(|| {
                    builder.build(&mut rand::thread_rng(), joinsplit_pub_key, proof_system)
                })
            })
            .collect()
    })
}
