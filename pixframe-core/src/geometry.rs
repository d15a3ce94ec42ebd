//! Sensor geometry and pixel indexing.
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use crate::error::{Axis, Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pixel coordinate on a sensor.
///
/// Signed so that window positions outside the sensor can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelCoord {
    /// X coordinate (column).
    pub x: i32,
    /// Y coordinate (row).
    pub y: i32,
}

impl PixelCoord {
    /// Creates a new pixel coordinate.
    #[inline]
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate shifted by `(dx, dy)`, or `None` if it leaves
    /// the `i32` range.
    #[inline]
    #[must_use]
    pub fn offset(&self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

/// Inclusive valid pixel rectangle of one sensor.
///
/// Set once at run start and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorFrame {
    /// First valid column.
    pub min_x: i32,
    /// Last valid column.
    pub max_x: i32,
    /// First valid row.
    pub min_y: i32,
    /// Last valid row.
    pub max_y: i32,
}

impl SensorFrame {
    /// Creates a frame from its inclusive bounds.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFrame`] if `min > max` on either axis.
    pub fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Result<Self> {
        let frame = Self {
            min_x,
            max_x,
            min_y,
            max_y,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Creates a frame starting at the origin.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFrame`] if either dimension is zero.
    pub fn with_size(width: u32, height: u32) -> Result<Self> {
        Self::new(0, width as i32 - 1, 0, height as i32 - 1)
    }

    /// Checks that both axes have a non-empty range and that the pixel
    /// count is addressable.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFrame`] naming the first empty axis and
    /// [`Error::FrameTooLarge`] if `width * height` overflows `usize`.
    pub fn validate(&self) -> Result<()> {
        if self.min_x > self.max_x {
            return Err(Error::InvalidFrame {
                axis: Axis::X,
                min: self.min_x,
                max: self.max_x,
            });
        }
        if self.min_y > self.max_y {
            return Err(Error::InvalidFrame {
                axis: Axis::Y,
                min: self.min_y,
                max: self.max_y,
            });
        }
        let width = Self::span(self.min_x, self.max_x);
        let height = Self::span(self.min_y, self.max_y);
        let addressable = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(w, h)| w.checked_mul(h));
        if addressable.is_none() {
            return Err(Error::FrameTooLarge { width, height });
        }
        Ok(())
    }

    #[inline]
    fn span(min: i32, max: i32) -> u64 {
        (i64::from(max) - i64::from(min) + 1) as u64
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        Self::span(self.min_x, self.max_x) as usize
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        Self::span(self.min_y, self.max_y) as usize
    }

    /// Number of pixels in the frame.
    #[inline]
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Returns true if the coordinate lies inside the frame.
    #[inline]
    #[must_use]
    pub fn contains(&self, coord: PixelCoord) -> bool {
        coord.x >= self.min_x && coord.x <= self.max_x && coord.y >= self.min_y && coord.y <= self.max_y
    }

    /// Returns the indexer for this frame.
    #[inline]
    #[must_use]
    pub fn indexer(&self) -> PixelIndexer {
        PixelIndexer::new(*self)
    }
}

/// Bijective mapping between in-frame coordinates and linear array indices.
///
/// Row-major: `index = (y - min_y) * width + (x - min_x)`. Callers classify
/// out-of-frame coordinates themselves and never pass them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelIndexer {
    frame: SensorFrame,
    width: usize,
}

impl PixelIndexer {
    /// Creates an indexer for the given frame.
    #[must_use]
    pub fn new(frame: SensorFrame) -> Self {
        Self {
            frame,
            width: frame.width(),
        }
    }

    /// The frame this indexer addresses.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> &SensorFrame {
        &self.frame
    }

    /// Linear index of an in-frame coordinate.
    #[inline]
    #[must_use]
    pub fn index(&self, coord: PixelCoord) -> usize {
        debug_assert!(self.frame.contains(coord));
        let col = (i64::from(coord.x) - i64::from(self.frame.min_x)) as usize;
        let row = (i64::from(coord.y) - i64::from(self.frame.min_y)) as usize;
        row * self.width + col
    }

    /// Coordinate of a linear index; the exact inverse of [`index`](Self::index).
    #[inline]
    #[must_use]
    pub fn coord(&self, index: usize) -> PixelCoord {
        debug_assert!(index < self.frame.pixel_count());
        let col = (index % self.width) as i64;
        let row = (index / self.width) as i64;
        PixelCoord::new(
            (i64::from(self.frame.min_x) + col) as i32,
            (i64::from(self.frame.min_y) + row) as i32,
        )
    }
}
