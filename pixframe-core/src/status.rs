//! Per-pixel status mask.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// State of one pixel within the current event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PixelStatus {
    /// Usable and not yet claimed.
    #[default]
    Good,
    /// Claimed by an accepted cluster in the current event.
    Hit,
    /// Permanently unusable for the run.
    Bad,
}

/// Mutable status of every pixel of one sensor.
///
/// The clustering pass only ever moves pixels GOOD -> HIT, and
/// [`reset_hits`](Self::reset_hits) moves them back at the next event.
/// BAD pixels come from the baseline and are never touched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusMask {
    status: Vec<PixelStatus>,
}

impl StatusMask {
    /// Creates a mask with every pixel GOOD.
    #[must_use]
    pub fn all_good(pixel_count: usize) -> Self {
        Self {
            status: vec![PixelStatus::Good; pixel_count],
        }
    }

    /// Creates a mask from an external baseline.
    ///
    /// HIT entries in the baseline are cleared to GOOD.
    #[must_use]
    pub fn from_baseline(baseline: Vec<PixelStatus>) -> Self {
        let mut mask = Self { status: baseline };
        mask.reset_hits();
        mask
    }

    /// Marks a pixel as BAD. Used only while building the baseline.
    pub fn mark_bad(&mut self, index: usize) {
        self.status[index] = PixelStatus::Bad;
    }

    /// Number of pixels in the mask.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.status.len()
    }

    /// Returns true if the mask has no pixels.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }

    /// Status of one pixel.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> PixelStatus {
        self.status[index]
    }

    /// Returns true if the pixel is GOOD.
    #[inline]
    #[must_use]
    pub fn is_good(&self, index: usize) -> bool {
        self.status[index] == PixelStatus::Good
    }

    /// Clears every HIT back to GOOD. BAD is preserved.
    pub fn reset_hits(&mut self) {
        for status in &mut self.status {
            if *status == PixelStatus::Hit {
                *status = PixelStatus::Good;
            }
        }
    }

    /// Marks the given GOOD pixels as HIT.
    ///
    /// Indices that are not GOOD are left unchanged.
    pub fn claim(&mut self, indices: &[usize]) {
        for &index in indices {
            let status = &mut self.status[index];
            debug_assert_eq!(*status, PixelStatus::Good, "pixel {index} claimed twice");
            if *status == PixelStatus::Good {
                *status = PixelStatus::Hit;
            }
        }
    }

    /// Number of pixels in the given state.
    #[must_use]
    pub fn count(&self, state: PixelStatus) -> usize {
        self.status.iter().filter(|&&s| s == state).count()
    }

    /// Read-only view of the raw status values.
    #[must_use]
    pub fn as_slice(&self) -> &[PixelStatus] {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_bad() {
        let mut mask = StatusMask::all_good(4);
        mask.mark_bad(1);
        mask.claim(&[0, 3]);
        assert_eq!(mask.count(PixelStatus::Hit), 2);

        mask.reset_hits();
        assert_eq!(
            mask.as_slice(),
            &[
                PixelStatus::Good,
                PixelStatus::Bad,
                PixelStatus::Good,
                PixelStatus::Good
            ]
        );
    }

    #[test]
    fn test_baseline_hits_are_cleared() {
        let mask = StatusMask::from_baseline(vec![
            PixelStatus::Hit,
            PixelStatus::Bad,
            PixelStatus::Good,
        ]);
        assert!(mask.is_good(0));
        assert_eq!(mask.get(1), PixelStatus::Bad);
        assert_eq!(mask.len(), 3);
    }

    #[test]
    fn test_claim_marks_hit() {
        let mut mask = StatusMask::all_good(3);
        mask.claim(&[2]);
        assert_eq!(mask.get(2), PixelStatus::Hit);
        assert!(!mask.is_good(2));
        assert!(mask.is_good(0));
    }
}
