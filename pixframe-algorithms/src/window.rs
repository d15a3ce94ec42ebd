//! Fixed-window cluster candidate building.
use pixframe_core::cluster::ClusterQuality;
use pixframe_core::config::validate_window_size;
use pixframe_core::error::{Error, Result};
use pixframe_core::geometry::{PixelCoord, PixelIndexer};
use pixframe_core::status::{PixelStatus, StatusMask};

/// A cluster candidate before validation.
///
/// Nothing has been written to the status mask yet; `claims` lists the
/// GOOD pixels that acceptance will mark as HIT.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterCandidate {
    /// Window centre.
    pub seed: PixelCoord,
    /// Window width.
    pub x_size: usize,
    /// Window height.
    pub y_size: usize,
    /// Raster-ordered charges, zero for excluded positions.
    pub charges: Vec<f64>,
    /// BORDER / INCOMPLETE flags.
    pub quality: ClusterQuality,
    /// Sum of contributing charges.
    pub signal: f64,
    /// Sum of contributing noise squared.
    pub noise_variance: f64,
    /// Linear indices of contributing pixels.
    pub claims: Vec<usize>,
}

/// Aggregates the fixed rectangular window around a seed.
///
/// Positions are visited row-major (y outer), which fixes the raster order:
/// - outside the frame: 0, sets BORDER
/// - BAD pixel: 0, sets INCOMPLETE
/// - HIT pixel (claimed earlier this event): 0, no flag
/// - GOOD pixel: contributes charge and noise squared and is added to the claims
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterBuilder {
    x_size: usize,
    y_size: usize,
    half_x: i32,
    half_y: i32,
}

impl ClusterBuilder {
    /// Creates a builder for an `x_size x y_size` window.
    ///
    /// # Errors
    /// Returns a configuration error unless both sizes are odd and the
    /// window is addressable.
    pub fn new(x_size: usize, y_size: usize) -> Result<Self> {
        validate_window_size(x_size, y_size)?;
        let too_large = |_| Error::ClusterWindowTooLarge { x_size, y_size };
        Ok(Self {
            x_size,
            y_size,
            half_x: i32::try_from(x_size / 2).map_err(too_large)?,
            half_y: i32::try_from(y_size / 2).map_err(too_large)?,
        })
    }

    /// Window width.
    #[must_use]
    pub fn x_size(&self) -> usize {
        self.x_size
    }

    /// Window height.
    #[must_use]
    pub fn y_size(&self) -> usize {
        self.y_size
    }

    /// Builds the candidate centred on `seed`. Does not mutate the mask.
    #[must_use]
    pub fn build(
        &self,
        seed: PixelCoord,
        indexer: &PixelIndexer,
        charge: &[f64],
        noise: &[f64],
        mask: &StatusMask,
    ) -> ClusterCandidate {
        let (hx, hy) = (self.half_x, self.half_y);
        let frame = indexer.frame();

        let mut candidate = ClusterCandidate {
            seed,
            x_size: self.x_size,
            y_size: self.y_size,
            charges: Vec::with_capacity(self.x_size * self.y_size),
            quality: ClusterQuality::GOOD,
            signal: 0.0,
            noise_variance: 0.0,
            claims: Vec::with_capacity(self.x_size * self.y_size),
        };

        for dy in -hy..=hy {
            for dx in -hx..=hx {
                let Some(coord) = seed.offset(dx, dy).filter(|&c| frame.contains(c)) else {
                    candidate.quality |= ClusterQuality::BORDER;
                    candidate.charges.push(0.0);
                    continue;
                };

                let index = indexer.index(coord);
                match mask.get(index) {
                    PixelStatus::Bad => {
                        candidate.quality |= ClusterQuality::INCOMPLETE;
                        candidate.charges.push(0.0);
                    }
                    // overlap with an earlier cluster: excluded, not flagged
                    PixelStatus::Hit => candidate.charges.push(0.0),
                    PixelStatus::Good => {
                        candidate.charges.push(charge[index]);
                        candidate.signal += charge[index];
                        candidate.noise_variance += noise[index] * noise[index];
                        candidate.claims.push(index);
                    }
                }
            }
        }

        candidate
    }
}
