//! Error types for pixframe-core.

use thiserror::Error;

/// Result type alias for pixframe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Axis of the cluster window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Column direction.
    X,
    /// Row direction.
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Per-pixel array that failed a shape check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    /// Calibrated charge values.
    Charge,
    /// Noise values.
    Noise,
    /// Pixel status.
    Status,
}

impl std::fmt::Display for ArrayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArrayKind::Charge => f.write_str("charge"),
            ArrayKind::Noise => f.write_str("noise"),
            ArrayKind::Status => f.write_str("status"),
        }
    }
}

/// Fatal error conditions of a clustering run.
///
/// Every variant stops the run. An event without accepted clusters is not
/// an error and is reported through the event outcome instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Cluster window dimension is zero or even.
    #[error("{axis} cluster size has to be positive and odd, got {size}")]
    InvalidClusterSize { axis: Axis, size: usize },

    /// Cluster window cannot be addressed: its half-width exceeds `i32` or
    /// its pixel count overflows.
    #[error("cluster window {x_size}x{y_size} is too large")]
    ClusterWindowTooLarge { x_size: usize, y_size: usize },

    /// Seed or cluster cut is not a positive finite number.
    #[error("{name} has to be a positive finite number, got {value}")]
    InvalidCut { name: &'static str, value: f64 },

    /// Sensor frame has an empty range on one axis.
    #[error("invalid sensor frame on {axis}: min {min} > max {max}")]
    InvalidFrame { axis: Axis, min: i32, max: i32 },

    /// Sensor frame has more pixels than an array can index.
    #[error("sensor frame {width}x{height} is too large")]
    FrameTooLarge { width: u64, height: u64 },

    /// Number of sensors in the event disagrees with the configured geometry.
    #[error("input data and geometry are incompatible: expected {expected} sensors, found {found}")]
    SensorCountMismatch { expected: usize, found: usize },

    /// Per-pixel array length disagrees with the sensor frame.
    #[error("sensor {sensor}: {array} array has {found} pixels, frame has {expected}")]
    PixelCountMismatch {
        sensor: usize,
        array: ArrayKind,
        expected: usize,
        found: usize,
    },

    /// The run was stopped by an earlier fatal error.
    #[error("run aborted: {0}")]
    RunAborted(String),
}

impl Error {
    /// Returns true for configuration errors detected before any event.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidClusterSize { .. }
                | Error::ClusterWindowTooLarge { .. }
                | Error::InvalidCut { .. }
                | Error::InvalidFrame { .. }
                | Error::FrameTooLarge { .. }
        )
    }

    /// Returns true for array shape disagreements found while processing.
    #[must_use]
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            Error::SensorCountMismatch { .. } | Error::PixelCountMismatch { .. }
        )
    }
}
