//! Extension point for per-sensor clustering strategies.

use crate::sensor::SensorState;
use crate::statistics::SeedStatistics;
use pixframe_core::cluster::ClusterRecord;
use pixframe_core::event::SensorSamples;

/// Result of clustering one sensor in one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorPass {
    /// Accepted clusters in acceptance order.
    pub clusters: Vec<ClusterRecord>,
    /// Seed bookkeeping for this pass.
    pub seeds: SeedStatistics,
    /// True if the sensor went past the configured cluster limit.
    pub limit_exceeded: bool,
}

/// A clustering strategy applied to one sensor at a time.
///
/// The engine resets the sensor (HIT -> GOOD, ids from 0) before calling
/// [`cluster_sensor`](Self::cluster_sensor) and has already checked that
/// the sample arrays match the sensor frame. Passes on different sensors
/// may run concurrently.
pub trait SensorClustering: Send + Sync {
    /// Strategy name.
    fn name(&self) -> &'static str;

    /// Clusters one sensor of the current event.
    fn cluster_sensor(&self, samples: &SensorSamples, sensor: &mut SensorState) -> SensorPass;
}
