//! Fixed-frame seed clustering.
//!
//! Key characteristics:
//! - One constant `x_size x y_size` window per seed, seed at the centre
//! - Seeds processed in strictly descending charge, greedy
//! - A pixel belongs to at most one accepted cluster per event

use crate::seed::SeedFinder;
use crate::sensor::SensorState;
use crate::strategy::{SensorClustering, SensorPass};
use crate::validator::ClusterValidator;
use crate::window::ClusterBuilder;
use log::debug;
use pixframe_core::config::{ClusterLimitPolicy, ClusteringConfig};
use pixframe_core::error::Result;
use pixframe_core::event::SensorSamples;

/// Fixed-frame clustering algorithm.
#[derive(Debug, Clone)]
pub struct FixedFrameClustering {
    config: ClusteringConfig,
    seeds: SeedFinder,
    builder: ClusterBuilder,
    validator: ClusterValidator,
}

impl FixedFrameClustering {
    /// Creates the algorithm from a validated configuration.
    ///
    /// # Errors
    /// Returns the configuration error reported by
    /// [`ClusteringConfig::validate`].
    pub fn new(config: ClusteringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            seeds: SeedFinder::new(config.seed_cut),
            builder: ClusterBuilder::new(config.x_cluster_size, config.y_cluster_size)?,
            validator: ClusterValidator::new(config.cluster_cut),
            config,
        })
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }
}

impl SensorClustering for FixedFrameClustering {
    fn name(&self) -> &'static str {
        "FixedFrame"
    }

    fn cluster_sensor(&self, samples: &SensorSamples, sensor: &mut SensorState) -> SensorPass {
        let candidates = self
            .seeds
            .find(&samples.charge, &samples.noise, sensor.mask());
        debug!("sensor {}: {} seed candidates", sensor.id(), candidates.len());

        let limit = self.config.max_clusters_per_sensor;
        let enforced = self.config.limit_policy == ClusterLimitPolicy::Enforced;
        let mut pass = SensorPass::default();
        pass.seeds.candidates = candidates.len();

        for seed in candidates {
            // consumed as a non-seed member of an earlier cluster
            if !sensor.mask().is_good(seed.index) {
                pass.seeds.skipped += 1;
                continue;
            }
            if enforced && pass.clusters.len() >= limit {
                pass.limit_exceeded = true;
                pass.seeds.skipped += 1;
                continue;
            }

            pass.seeds.evaluated += 1;
            let coord = sensor.indexer().coord(seed.index);
            let candidate = self.builder.build(
                coord,
                sensor.indexer(),
                &samples.charge,
                &samples.noise,
                sensor.mask(),
            );

            match self.validator.validate(candidate, sensor) {
                Some(record) => {
                    debug!(
                        "sensor {}: cluster {} seed ({}, {}) signal {:.2} quality {}",
                        record.sensor_id,
                        record.cluster_id,
                        record.seed.x,
                        record.seed.y,
                        record.signal,
                        record.quality
                    );
                    pass.seeds.accepted += 1;
                    pass.clusters.push(record);
                    if pass.clusters.len() > limit {
                        pass.limit_exceeded = true;
                    }
                }
                None => pass.seeds.rejected += 1,
            }
        }

        pass
    }
}
