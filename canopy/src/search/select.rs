//! Frontier selection: pick candidate indices from scored candidates.

use std::cmp::Ordering;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{Score, SearchError};

/// Reduces scored candidates to the next frontier, returned as indices into the scored set.
pub trait Selector: Send {
    fn name(&self) -> &'static str;

    fn select(&mut self, scores: &[Score]) -> Result<Vec<usize>, SearchError>;
}

fn ensure_finite(scores: &[Score]) -> Result<(), SearchError> {
    match scores.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(SearchError::InvalidScore {
            index,
            score: scores[index],
        }),
        None => Ok(()),
    }
}

/// Top-`count` by score, descending; ties keep their original order.
#[derive(Clone, Copy, Debug)]
pub struct GreedySelector {
    pub count: usize,
}

impl GreedySelector {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl Selector for GreedySelector {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn select(&mut self, scores: &[Score]) -> Result<Vec<usize>, SearchError> {
        ensure_finite(scores)?;
        let mut ids: Vec<usize> = (0..scores.len()).collect();
        // sort_by is stable; partial_cmp keeps -0.0 and 0.0 tied
        ids.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
        });
        ids.truncate(self.count);
        Ok(ids)
    }
}

/// `count` independent draws with replacement, probability proportional to score.
///
/// Weights must be finite and non-negative with a positive sum; anything else is
/// [`SearchError::DegenerateWeights`].
#[derive(Debug)]
pub struct SampleSelector {
    pub count: usize,
    rng: StdRng,
}

impl SampleSelector {
    /// `seed` makes draws reproducible; `None` seeds from the OS.
    pub fn new(count: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self { count, rng }
    }
}

impl Selector for SampleSelector {
    fn name(&self) -> &'static str {
        "sample"
    }

    fn select(&mut self, scores: &[Score]) -> Result<Vec<usize>, SearchError> {
        ensure_finite(scores)?;
        let degenerate = |reason: &str| SearchError::DegenerateWeights {
            weights: scores.to_vec(),
            reason: reason.to_string(),
        };
        if scores.iter().any(|s| *s < 0.0) {
            return Err(degenerate("negative weight"));
        }
        if scores.iter().sum::<Score>() <= 0.0 {
            return Err(degenerate("weights sum to zero"));
        }
        let dist = WeightedIndex::new(scores).map_err(|e| degenerate(&e.to_string()))?;
        Ok((0..self.count)
            .map(|_| dist.sample(&mut self.rng))
            .collect())
    }
}
