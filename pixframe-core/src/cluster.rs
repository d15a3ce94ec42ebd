//! Cluster records and quality flags.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use crate::geometry::PixelCoord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::ops::{BitOr, BitOrAssign};

/// Quality bitmask of a cluster.
///
/// An empty mask means the cluster is fully inside the sensor and free of
/// BAD pixels. Overlap with an earlier cluster sets no flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClusterQuality(u8);

impl ClusterQuality {
    /// No flag set.
    pub const GOOD: Self = Self(0);
    /// At least one BAD pixel inside the window.
    pub const INCOMPLETE: Self = Self(1);
    /// At least one window position outside the sensor.
    pub const BORDER: Self = Self(1 << 2);

    /// Raw bit value.
    #[inline]
    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Rebuilds a mask from raw bits, dropping unknown bits.
    #[must_use]
    pub fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & (Self::INCOMPLETE.0 | Self::BORDER.0))
    }

    /// Returns true if every bit of `flag` is set.
    #[inline]
    #[must_use]
    pub fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    /// Returns true if no flag is set.
    #[inline]
    #[must_use]
    pub fn is_good(self) -> bool {
        self.0 == 0
    }

    /// Sets every bit of `flag`.
    #[inline]
    pub fn insert(&mut self, flag: Self) {
        self.0 |= flag.0;
    }
}

impl BitOr for ClusterQuality {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ClusterQuality {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::fmt::Display for ClusterQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (
            self.contains(Self::BORDER),
            self.contains(Self::INCOMPLETE),
        ) {
            (false, false) => f.write_str("good"),
            (true, false) => f.write_str("border"),
            (false, true) => f.write_str("incomplete"),
            (true, true) => f.write_str("border|incomplete"),
        }
    }
}

/// An accepted fixed-window cluster.
///
/// Self-contained: derived quantities are computed from the raster alone,
/// without going back to the event arrays.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterRecord {
    /// Sensor the cluster belongs to.
    pub sensor_id: usize,
    /// Per-event, per-sensor cluster number starting at 0.
    pub cluster_id: u32,
    /// Seed pixel at the window centre.
    pub seed: PixelCoord,
    /// Window width (odd).
    pub x_size: usize,
    /// Window height (odd).
    pub y_size: usize,
    /// Raster-ordered charges (row-major, y outer), `x_size * y_size` entries.
    pub charges: Vec<f64>,
    /// Quality flags.
    pub quality: ClusterQuality,
    /// Sum of contributing charges.
    pub signal: f64,
    /// Sum of contributing noise squared.
    pub noise_variance: f64,
}

impl ClusterRecord {
    #[inline]
    fn half_x(&self) -> i32 {
        (self.x_size / 2) as i32
    }

    #[inline]
    fn half_y(&self) -> i32 {
        (self.y_size / 2) as i32
    }

    #[inline]
    fn raster_index(&self, dx: i32, dy: i32) -> Option<usize> {
        let (hx, hy) = (self.half_x(), self.half_y());
        if dx.unsigned_abs() > hx.unsigned_abs() || dy.unsigned_abs() > hy.unsigned_abs() {
            return None;
        }
        Some(((dy + hy) as usize) * self.x_size + (dx + hx) as usize)
    }

    /// Number of raster entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.charges.len()
    }

    /// Returns true if the raster is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.charges.is_empty()
    }

    /// Charge at offset `(dx, dy)` from the seed, `None` outside the window.
    #[must_use]
    pub fn charge_at(&self, dx: i32, dy: i32) -> Option<f64> {
        self.raster_index(dx, dy).map(|i| self.charges[i])
    }

    /// Charge of the seed pixel.
    #[must_use]
    pub fn seed_charge(&self) -> f64 {
        self.charge_at(0, 0).unwrap_or_default()
    }

    /// Sum of all raster entries.
    #[must_use]
    pub fn total_charge(&self) -> f64 {
        self.charges.iter().sum()
    }

    /// Sum of the `n` largest raster entries.
    #[must_use]
    pub fn cluster_charge_n(&self, n: usize) -> f64 {
        let mut sorted = self.charges.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        sorted.iter().take(n).sum()
    }

    /// Sum over a centred `nx x ny` sub-window, clipped to the record's window.
    ///
    /// Even sizes are widened to the next odd size.
    #[must_use]
    pub fn sub_window_charge(&self, nx: usize, ny: usize) -> f64 {
        let hx = ((nx / 2) as i32).min(self.half_x());
        let hy = ((ny / 2) as i32).min(self.half_y());
        let mut sum = 0.0;
        for dy in -hy..=hy {
            for dx in -hx..=hx {
                sum += self.charge_at(dx, dy).unwrap_or_default();
            }
        }
        sum
    }

    /// Charge-weighted centroid over positive raster entries.
    ///
    /// Falls back to the seed coordinate when no entry is positive.
    #[must_use]
    pub fn centroid(&self) -> (f64, f64) {
        let (hx, hy) = (self.half_x(), self.half_y());
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut sum_weight = 0.0;

        for (i, &charge) in self.charges.iter().enumerate() {
            if charge <= 0.0 {
                continue;
            }
            let dx = (i % self.x_size) as i32 - hx;
            let dy = (i / self.x_size) as i32 - hy;
            sum_x += (f64::from(self.seed.x) + f64::from(dx)) * charge;
            sum_y += (f64::from(self.seed.y) + f64::from(dy)) * charge;
            sum_weight += charge;
        }

        if sum_weight > 0.0 {
            (sum_x / sum_weight, sum_y / sum_weight)
        } else {
            (f64::from(self.seed.x), f64::from(self.seed.y))
        }
    }

    /// Cluster signal-to-noise ratio.
    #[must_use]
    pub fn snr(&self) -> f64 {
        if self.noise_variance > 0.0 {
            self.signal / self.noise_variance.sqrt()
        } else {
            f64::INFINITY
        }
    }

    /// Returns true if every bit of `flag` is set on this cluster.
    #[must_use]
    pub fn has_quality(&self, flag: ClusterQuality) -> bool {
        self.quality.contains(flag)
    }

    /// Returns true if no quality flag is set.
    #[must_use]
    pub fn is_good(&self) -> bool {
        self.quality.is_good()
    }
}
