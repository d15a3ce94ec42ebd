//! Per-sensor clustering state.

use pixframe_core::error::{ArrayKind, Error, Result};
use pixframe_core::event::SensorSamples;
use pixframe_core::geometry::{PixelIndexer, SensorFrame};
use pixframe_core::status::StatusMask;

/// State one sensor keeps across the events of a run.
///
/// Holds the immutable frame, the status mask reset at each event,
/// the per-event cluster id counter, and the lifetime cluster total.
#[derive(Debug, Clone)]
pub struct SensorState {
    id: usize,
    frame: SensorFrame,
    indexer: PixelIndexer,
    mask: StatusMask,
    next_cluster_id: u32,
    lifetime_clusters: u64,
}

impl SensorState {
    /// Creates a sensor with every pixel GOOD.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFrame`] if the frame is empty on an axis.
    pub fn new(id: usize, frame: SensorFrame) -> Result<Self> {
        frame.validate()?;
        let mask = StatusMask::all_good(frame.pixel_count());
        Ok(Self::from_parts(id, frame, mask))
    }

    /// Creates a sensor from an externally supplied GOOD/BAD baseline.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFrame`] for an empty frame and
    /// [`Error::PixelCountMismatch`] if the baseline size differs from the frame.
    pub fn with_baseline(id: usize, frame: SensorFrame, baseline: StatusMask) -> Result<Self> {
        frame.validate()?;
        if baseline.len() != frame.pixel_count() {
            return Err(Error::PixelCountMismatch {
                sensor: id,
                array: ArrayKind::Status,
                expected: frame.pixel_count(),
                found: baseline.len(),
            });
        }
        Ok(Self::from_parts(id, frame, baseline))
    }

    fn from_parts(id: usize, frame: SensorFrame, mut mask: StatusMask) -> Self {
        mask.reset_hits();
        Self {
            id,
            frame,
            indexer: frame.indexer(),
            mask,
            next_cluster_id: 0,
            lifetime_clusters: 0,
        }
    }

    /// Sensor identifier.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Valid pixel rectangle.
    #[must_use]
    pub fn frame(&self) -> &SensorFrame {
        &self.frame
    }

    /// Coordinate/index mapping of the frame.
    #[must_use]
    pub fn indexer(&self) -> &PixelIndexer {
        &self.indexer
    }

    /// Current pixel status.
    #[must_use]
    pub fn mask(&self) -> &StatusMask {
        &self.mask
    }

    /// Mutable pixel status.
    pub fn mask_mut(&mut self) -> &mut StatusMask {
        &mut self.mask
    }

    /// Clusters accepted on this sensor since the run started.
    #[must_use]
    pub fn lifetime_clusters(&self) -> u64 {
        self.lifetime_clusters
    }

    /// Clusters accepted on this sensor in the current event.
    #[must_use]
    pub fn event_clusters(&self) -> u32 {
        self.next_cluster_id
    }

    /// Prepares for a new event: HIT pixels become GOOD and ids restart at 0.
    pub fn begin_event(&mut self) {
        self.mask.reset_hits();
        self.next_cluster_id = 0;
    }

    /// Clears the lifetime total at the start of a run.
    pub fn begin_run(&mut self) {
        self.begin_event();
        self.lifetime_clusters = 0;
    }

    /// Hands out the next cluster id and counts the cluster.
    pub fn allocate_cluster_id(&mut self) -> u32 {
        let id = self.next_cluster_id;
        self.next_cluster_id += 1;
        self.lifetime_clusters += 1;
        id
    }

    /// Checks the event arrays against the frame.
    ///
    /// # Errors
    /// Returns [`Error::PixelCountMismatch`] naming the first array whose
    /// length disagrees with the frame.
    pub fn check_samples(&self, samples: &SensorSamples) -> Result<()> {
        let expected = self.frame.pixel_count();
        for (array, found) in [
            (ArrayKind::Charge, samples.charge.len()),
            (ArrayKind::Noise, samples.noise.len()),
        ] {
            if found != expected {
                return Err(Error::PixelCountMismatch {
                    sensor: self.id,
                    array,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}
