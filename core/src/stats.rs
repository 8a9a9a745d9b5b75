use std::{borrow::Borrow, fmt::Display};

use rand::Rng;
use tracing::warn;

use crate::{
    error::{CnpError, CnpResult},
    index::ChainedIndex,
};

/// The accumulated results of a batch of searches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchStats<K> {
    pub searches: usize,
    pub found: usize,
    pub total_probes: usize,
    pub max_probes: usize,
    /// The searched keys that were not found.
    pub missing: Vec<K>,
}

impl<K> Default for SearchStats<K> {
    fn default() -> Self {
        Self {
            searches: 0,
            found: 0,
            total_probes: 0,
            max_probes: 0,
            missing: Vec::new(),
        }
    }
}

impl<K> SearchStats<K> {
    /// Registers the outcome of a single search.
    pub fn register(&mut self, key: K, probes: usize, found: bool) {
        self.searches += 1;
        self.total_probes += probes;
        self.max_probes = self.max_probes.max(probes);

        if found {
            self.found += 1;
        } else {
            self.missing.push(key);
        }
    }

    /// Returns the average number of probes per search, or 0 if no search was made.
    pub fn average_probes(&self) -> f64 {
        if self.searches == 0 {
            0.
        } else {
            self.total_probes as f64 / self.searches as f64
        }
    }
}

/// Searches `sample_size` distinct keys drawn uniformly from `keys` and accumulates the probe counts.
///
/// Every key is expected to be in the index: a key that is not found is logged as an anomaly and
/// reported in [`SearchStats::missing`], but does not stop the pass.
pub fn sample_searches<K, V, Q, R>(
    index: &ChainedIndex<K, V>,
    keys: &[Q],
    sample_size: usize,
    rng: &mut R,
) -> CnpResult<SearchStats<Q>>
where
    K: AsRef<[u8]> + Borrow<Q>,
    Q: AsRef<[u8]> + PartialEq + Clone + Display,
    R: Rng + ?Sized,
{
    if sample_size > keys.len() {
        return Err(CnpError::SampleTooLarge {
            requested: sample_size,
            available: keys.len(),
        });
    }

    let mut stats = SearchStats::default();

    for i in rand::seq::index::sample(rng, keys.len(), sample_size) {
        let key = &keys[i];
        let probe = index.search(key);

        if !probe.is_found() {
            warn!("{key} was not found in the index, although it was inserted");
        }

        stats.register(key.clone(), probe.probes, probe.is_found());
    }

    Ok(stats)
}
