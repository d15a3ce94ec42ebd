//! Seed candidate search.

use pixframe_core::status::StatusMask;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A pixel eligible to anchor a cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeedCandidate {
    /// Charge at scan time.
    pub charge: f64,
    /// Linear pixel index.
    pub index: usize,
}

/// Scans a sensor for seed candidates.
///
/// A pixel is a candidate when it is GOOD and its charge exceeds
/// `seed_cut * noise`. Candidates come out in strictly descending charge;
/// equal charges are all kept and ordered by ascending index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedFinder {
    seed_cut: f64,
}

impl SeedFinder {
    /// Creates a finder with the given seed cut.
    #[must_use]
    pub fn new(seed_cut: f64) -> Self {
        Self { seed_cut }
    }

    /// The seed cut in units of pixel noise.
    #[must_use]
    pub fn seed_cut(&self) -> f64 {
        self.seed_cut
    }

    /// Returns the ordered seed candidates. Read-only.
    ///
    /// `charge`, `noise` and `mask` must have the same length.
    #[must_use]
    pub fn find(&self, charge: &[f64], noise: &[f64], mask: &StatusMask) -> Vec<SeedCandidate> {
        debug_assert_eq!(charge.len(), noise.len());
        debug_assert_eq!(charge.len(), mask.len());

        let mut seeds: Vec<SeedCandidate> = charge
            .iter()
            .zip(noise)
            .enumerate()
            .filter(|&(index, (&q, &n))| mask.is_good(index) && q > self.seed_cut * n)
            .map(|(index, (&q, _))| SeedCandidate { charge: q, index })
            .collect();

        seeds.sort_by(|a, b| {
            b.charge
                .total_cmp(&a.charge)
                .then_with(|| a.index.cmp(&b.index))
        });
        seeds
    }
}
