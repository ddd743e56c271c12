//! Configuration for note scanning, proving and witness maintenance.

use serde::{Deserialize, Serialize};

/// Configuration for the Sprout JoinSplit subsystem.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The number of threads used for trial decryption and for proving
    /// independent JoinSplits.
    ///
    /// If `None`, uses the rayon default: one thread per logical CPU.
    pub parallel_threads: Option<usize>,

    /// Should note commitment trees keep the witnesses of appended notes up
    /// to date?
    ///
    /// Witnesses are needed to spend notes. Trees that only track anchors,
    /// for example in verifiers, can disable this to save memory and time.
    pub track_witnesses: bool,
}

// we like our default configs to be explicit
#[allow(unknown_lints)]
#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Self {
            parallel_threads: None,
            track_witnesses: true,
        }
    }
}

impl Config {
    /// Builds a thread pool with the configured number of threads.
    pub fn thread_pool(&self) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("sprout-{i}"));

        if let Some(threads) = self.parallel_threads {
            builder = builder.num_threads(threads);
        }

        builder.build()
    }
}
