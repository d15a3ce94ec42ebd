//! Per-event input arrays.
//!
//! Charge and noise are stored as parallel vectors addressed by the
//! sensor's [`PixelIndexer`](crate::geometry::PixelIndexer).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of an incoming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventKind {
    /// Regular data event.
    #[default]
    Data,
    /// End-of-run marker carrying no data.
    EndOfRun,
    /// Unrecognised kind; clustered like a data event.
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

/// Calibrated charge and noise for one sensor.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorSamples {
    /// Calibrated charge per pixel.
    pub charge: Vec<f64>,
    /// Noise per pixel.
    pub noise: Vec<f64>,
}

impl SensorSamples {
    /// Creates samples from charge and noise arrays.
    #[must_use]
    pub fn new(charge: Vec<f64>, noise: Vec<f64>) -> Self {
        Self { charge, noise }
    }

    /// Creates samples with uniform noise.
    #[must_use]
    pub fn with_uniform_noise(charge: Vec<f64>, noise: f64) -> Self {
        let noise = vec![noise; charge.len()];
        Self { charge, noise }
    }

    /// Number of charge entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.charge.len()
    }

    /// Returns true if there are no charge entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.charge.is_empty()
    }
}

/// One event: a number, a kind, and samples for every sensor.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventData {
    /// Event number as supplied by the source.
    pub number: u64,
    /// Event kind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: EventKind,
    /// Samples, one entry per sensor in geometry order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sensors: Vec<SensorSamples>,
}

impl EventData {
    /// Creates a data event.
    #[must_use]
    pub fn data(number: u64, sensors: Vec<SensorSamples>) -> Self {
        Self {
            number,
            kind: EventKind::Data,
            sensors,
        }
    }

    /// Creates an end-of-run marker.
    #[must_use]
    pub fn end_of_run(number: u64) -> Self {
        Self {
            number,
            kind: EventKind::EndOfRun,
            sensors: Vec::new(),
        }
    }
}
