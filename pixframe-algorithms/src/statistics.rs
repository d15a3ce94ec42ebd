//! Run-level clustering statistics.

use std::ops::AddAssign;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What happened to the seed candidates of one or more sensor passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeedStatistics {
    /// Candidates returned by the seed search.
    pub candidates: usize,
    /// Candidates for which a window was built.
    pub evaluated: usize,
    /// Windows that passed the cluster cut.
    pub accepted: usize,
    /// Windows that failed the cluster cut.
    pub rejected: usize,
    /// Candidates already consumed by an earlier cluster, or past an enforced limit.
    pub skipped: usize,
}

impl AddAssign for SeedStatistics {
    fn add_assign(&mut self, rhs: Self) {
        self.candidates += rhs.candidates;
        self.evaluated += rhs.evaluated;
        self.accepted += rhs.accepted;
        self.rejected += rhs.rejected;
        self.skipped += rhs.skipped;
    }
}

/// Counters accumulated by the engine over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusteringStatistics {
    /// Events submitted, including end-of-run markers.
    pub events_processed: u64,
    /// Data (or unknown-kind) events that were clustered.
    pub data_events: u64,
    /// End-of-run markers seen.
    pub end_of_run_markers: u64,
    /// Clustered events without any accepted cluster.
    pub events_without_output: u64,
    /// Events on which at least one sensor went past the cluster limit.
    pub events_over_limit: u64,
    /// Lifetime cluster total per sensor, in geometry order.
    pub clusters_per_sensor: Vec<u64>,
    /// Seed bookkeeping summed over all passes.
    pub seeds: SeedStatistics,
}

impl ClusteringStatistics {
    /// Total clusters over all sensors.
    #[must_use]
    pub fn total_clusters(&self) -> u64 {
        self.clusters_per_sensor.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_statistics_add() {
        let mut total = SeedStatistics::default();
        total += SeedStatistics {
            candidates: 4,
            evaluated: 3,
            accepted: 2,
            rejected: 1,
            skipped: 1,
        };
        total += SeedStatistics {
            candidates: 1,
            evaluated: 1,
            accepted: 1,
            ..Default::default()
        };
        assert_eq!(total.candidates, 5);
        assert_eq!(total.accepted, 3);
        assert_eq!(total.skipped, 1);
    }

    #[test]
    fn test_total_clusters() {
        let stats = ClusteringStatistics {
            clusters_per_sensor: vec![3, 0, 7],
            ..Default::default()
        };
        assert_eq!(stats.total_clusters(), 10);
    }
}
