//! Run header: clustering configuration and sensor geometry.
//!
//! JSON layout:
//!
//! ```json
//! {
//!   "clustering": { "x_cluster_size": 3, "y_cluster_size": 3, "seed_cut": 4.5 },
//!   "sensors": [
//!     { "id": 0, "min_x": 0, "max_x": 255, "min_y": 0, "max_y": 255, "bad_pixels": [[12, 40]] }
//!   ]
//! }
//! ```
//!
//! Omitted clustering fields take their defaults.

use crate::{Error, Result};
use pixframe_algorithms::SensorState;
use pixframe_core::config::ClusteringConfig;
use pixframe_core::geometry::{PixelCoord, SensorFrame};
use pixframe_core::status::StatusMask;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Geometry and baseline of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorHeader {
    /// Sensor identifier.
    pub id: usize,
    /// First valid column.
    pub min_x: i32,
    /// Last valid column.
    pub max_x: i32,
    /// First valid row.
    pub min_y: i32,
    /// Last valid row.
    pub max_y: i32,
    /// Pixels that are BAD for the whole run, as `[x, y]`.
    #[serde(default)]
    pub bad_pixels: Vec<[i32; 2]>,
}

impl SensorHeader {
    /// The sensor frame.
    ///
    /// # Errors
    /// Returns a core error if the bounds are empty on an axis.
    pub fn frame(&self) -> Result<SensorFrame> {
        Ok(SensorFrame::new(self.min_x, self.max_x, self.min_y, self.max_y)?)
    }

    /// Baseline status mask with the listed BAD pixels.
    ///
    /// # Errors
    /// Returns [`Error::InvalidHeader`] if a BAD pixel lies outside the frame.
    pub fn baseline(&self) -> Result<StatusMask> {
        let frame = self.frame()?;
        let indexer = frame.indexer();
        let mut mask = StatusMask::all_good(frame.pixel_count());
        for &[x, y] in &self.bad_pixels {
            let coord = PixelCoord::new(x, y);
            if !frame.contains(coord) {
                return Err(Error::InvalidHeader(format!(
                    "bad pixel ({x}, {y}) outside sensor {}",
                    self.id
                )));
            }
            mask.mark_bad(indexer.index(coord));
        }
        Ok(mask)
    }

    /// Builds the clustering state of this sensor.
    ///
    /// # Errors
    /// Returns an error for an empty frame or an out-of-frame BAD pixel.
    pub fn sensor_state(&self) -> Result<SensorState> {
        Ok(SensorState::with_baseline(
            self.id,
            self.frame()?,
            self.baseline()?,
        )?)
    }
}

/// Run-level metadata read once before the first event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHeader {
    /// Clustering parameters.
    #[serde(default)]
    pub clustering: ClusteringConfig,
    /// Sensors in the order their samples appear in each event.
    pub sensors: Vec<SensorHeader>,
}

impl RunHeader {
    /// Loads a header from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it
    /// fails [`validate`](Self::validate).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let header: Self = serde_json::from_reader(BufReader::new(file))?;
        header.validate()?;
        Ok(header)
    }

    /// Parses a header from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or fails [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let header: Self = serde_json::from_str(json)?;
        header.validate()?;
        Ok(header)
    }

    /// Checks the clustering configuration, the frames, and that sensor ids are unique.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        if self.sensors.is_empty() {
            return Err(Error::InvalidHeader("no sensors defined".to_string()));
        }
        let mut ids: Vec<usize> = self.sensors.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(Error::InvalidHeader(format!(
                "sensor id {} defined twice",
                pair[0]
            )));
        }
        for sensor in &self.sensors {
            sensor.frame()?;
        }
        Ok(())
    }

    /// Builds the clustering state of every sensor in header order.
    ///
    /// # Errors
    /// Returns the first sensor error.
    pub fn sensor_states(&self) -> Result<Vec<SensorState>> {
        self.sensors.iter().map(SensorHeader::sensor_state).collect()
    }
}
