//! Clustering configuration.

use crate::error::{Axis, Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest raster a cluster window may have.
pub const MAX_WINDOW_LEN: usize = (usize::MAX >> 1) / std::mem::size_of::<f64>();

/// Checks that a window is odd and positive on both axes and that its
/// raster can be allocated and addressed with `i32` offsets.
///
/// # Errors
/// Returns [`Error::InvalidClusterSize`] or [`Error::ClusterWindowTooLarge`].
pub fn validate_window_size(x_size: usize, y_size: usize) -> Result<()> {
    for (axis, size) in [(Axis::X, x_size), (Axis::Y, y_size)] {
        if size == 0 || size.is_multiple_of(2) {
            return Err(Error::InvalidClusterSize { axis, size });
        }
    }
    let half_fits = i32::try_from(x_size / 2).is_ok() && i32::try_from(y_size / 2).is_ok();
    let raster_fits = x_size
        .checked_mul(y_size)
        .is_some_and(|len| len <= MAX_WINDOW_LEN);
    if !half_fits || !raster_fits {
        return Err(Error::ClusterWindowTooLarge { x_size, y_size });
    }
    Ok(())
}

/// What happens once a sensor exceeds the per-event cluster limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ClusterLimitPolicy {
    /// Log a warning and keep emitting clusters.
    #[default]
    Advisory,
    /// Log a warning and accept no further clusters on that sensor for the event.
    Enforced,
}

/// Configuration of the fixed-window clustering pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClusteringConfig {
    /// Window width in pixels (positive, odd).
    pub x_cluster_size: usize,
    /// Window height in pixels (positive, odd).
    pub y_cluster_size: usize,
    /// Seed threshold in units of pixel noise.
    pub seed_cut: f64,
    /// Cluster threshold in units of cluster noise.
    pub cluster_cut: f64,
    /// Clusters per sensor per event above which a warning is logged.
    pub max_clusters_per_sensor: usize,
    /// Behaviour past `max_clusters_per_sensor`.
    pub limit_policy: ClusterLimitPolicy,
    /// Run the per-sensor passes of an event on the rayon pool.
    pub parallel_sensors: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            x_cluster_size: 5,
            y_cluster_size: 5,
            seed_cut: 4.5,
            cluster_cut: 3.0,
            max_clusters_per_sensor: 256,
            limit_policy: ClusterLimitPolicy::Advisory,
            parallel_sensors: true,
        }
    }
}

impl ClusteringConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window size.
    #[must_use]
    pub fn with_cluster_size(mut self, x: usize, y: usize) -> Self {
        self.x_cluster_size = x;
        self.y_cluster_size = y;
        self
    }

    /// Sets the seed cut.
    #[must_use]
    pub fn with_seed_cut(mut self, cut: f64) -> Self {
        self.seed_cut = cut;
        self
    }

    /// Sets the cluster cut.
    #[must_use]
    pub fn with_cluster_cut(mut self, cut: f64) -> Self {
        self.cluster_cut = cut;
        self
    }

    /// Sets the per-sensor cluster limit and its policy.
    #[must_use]
    pub fn with_cluster_limit(mut self, limit: usize, policy: ClusterLimitPolicy) -> Self {
        self.max_clusters_per_sensor = limit;
        self.limit_policy = policy;
        self
    }

    /// Enables or disables parallel sensor passes.
    #[must_use]
    pub fn with_parallel_sensors(mut self, parallel: bool) -> Self {
        self.parallel_sensors = parallel;
        self
    }

    /// Checks window sizes and cuts.
    ///
    /// # Errors
    /// Returns [`Error::InvalidClusterSize`] for a zero or even window
    /// dimension, [`Error::ClusterWindowTooLarge`] for a window whose raster
    /// cannot be allocated, and [`Error::InvalidCut`] for a cut that is not
    /// positive.
    pub fn validate(&self) -> Result<()> {
        validate_window_size(self.x_cluster_size, self.y_cluster_size)?;
        for (name, value) in [("seed cut", self.seed_cut), ("cluster cut", self.cluster_cut)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidCut { name, value });
            }
        }
        Ok(())
    }

    /// Number of entries in every cluster raster.
    #[must_use]
    pub fn window_len(&self) -> usize {
        self.x_cluster_size * self.y_cluster_size
    }
}
