use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Largest pixel coordinate magnitude accepted for extents and centroids.
pub const MAX_PIXEL: i64 = 1 << 31;

/// Bounding box of one detected cell in one frame.
///
/// Pixel extents are inclusive. The centroid and area come from the contour
/// that produced the box and are independent of the extents. Decoded boxes
/// are checked with [`BoundingBox::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawBox")]
pub struct BoundingBox {
    /// Leftmost pixel column
    pub x_min: i64,
    /// Rightmost pixel column
    pub x_max: i64,
    /// Topmost pixel row
    pub y_min: i64,
    /// Bottom pixel row
    pub y_max: i64,
    /// Centroid x coordinate
    pub x_mean: f64,
    /// Centroid y coordinate
    pub y_mean: f64,
    /// Contour area in px²
    pub area: f64,
}

/// Box record as stored by the contour pipeline, before validation.
#[derive(Deserialize)]
struct RawBox {
    #[serde(deserialize_with = "pixel")]
    x_min: i64,
    #[serde(deserialize_with = "pixel")]
    x_max: i64,
    #[serde(deserialize_with = "pixel")]
    y_min: i64,
    #[serde(deserialize_with = "pixel")]
    y_max: i64,
    x_mean: f64,
    y_mean: f64,
    area: f64,
}

impl TryFrom<RawBox> for BoundingBox {
    type Error = Error;

    fn try_from(raw: RawBox) -> Result<Self> {
        let bbox = Self {
            x_min: raw.x_min,
            x_max: raw.x_max,
            y_min: raw.y_min,
            y_max: raw.y_max,
            x_mean: raw.x_mean,
            y_mean: raw.y_mean,
            area: raw.area,
        };
        bbox.validate()?;
        Ok(bbox)
    }
}

impl BoundingBox {
    /// Create a box from inclusive extents, centroid at the extents' midpoint.
    pub fn from_extents(x_min: i64, x_max: i64, y_min: i64, y_max: i64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            x_mean: (x_min + x_max) as f64 / 2.0,
            y_mean: (y_min + y_max) as f64 / 2.0,
            area: ((x_max - x_min + 1) * (y_max - y_min + 1)) as f64,
        }
    }

    /// Override the centroid.
    pub fn with_centroid(mut self, x_mean: f64, y_mean: f64) -> Self {
        self.x_mean = x_mean;
        self.y_mean = y_mean;
        self
    }

    /// Width in pixels, counting both edges.
    #[inline]
    pub fn width(&self) -> i64 {
        self.x_max - self.x_min + 1
    }

    /// Height in pixels, counting both edges.
    #[inline]
    pub fn height(&self) -> i64 {
        self.y_max - self.y_min + 1
    }

    /// Check that the extents are ordered and that extents and centroid are
    /// finite and within [`MAX_PIXEL`].
    pub fn validate(&self) -> Result<()> {
        let extents = [self.x_min, self.x_max, self.y_min, self.y_max];
        if extents.iter().any(|v| v.unsigned_abs() > MAX_PIXEL as u64) {
            return Err(Error::InvalidBox(format!(
                "extents {extents:?} exceed the pixel range"
            )));
        }
        if self.x_max < self.x_min || self.y_max < self.y_min {
            return Err(Error::InvalidBox(format!(
                "reversed extents x={}:{}, y={}:{}",
                self.x_min, self.x_max, self.y_min, self.y_max
            )));
        }
        let limit = MAX_PIXEL as f64;
        if !(self.x_mean.abs() <= limit && self.y_mean.abs() <= limit) {
            return Err(Error::InvalidBox(format!(
                "centroid ({}, {}) is not a finite pixel position",
                self.x_mean, self.y_mean
            )));
        }
        Ok(())
    }

    /// Centroid rounded to the nearest pixel (ties to even).
    #[inline]
    pub fn rounded_centroid(&self) -> (i64, i64) {
        (
            self.x_mean.round_ties_even() as i64,
            self.y_mean.round_ties_even() as i64,
        )
    }
}

/// Dimensions of the output stack, stored once per input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StackMeta {
    pub n_frames: usize,
    pub width: usize,
    pub height: usize,
}

impl StackMeta {
    pub fn new(n_frames: usize, width: usize, height: usize) -> Self {
        Self {
            n_frames,
            width,
            height,
        }
    }

    /// Shape of a stack as `(frames, rows, columns)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_frames, self.height, self.width)
    }
}

/// Contour pipelines write extents either as ints or as integral floats.
#[derive(Deserialize)]
#[serde(untagged)]
enum Pixel {
    Int(i64),
    Float(f64),
}

fn pixel<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    match Pixel::deserialize(deserializer)? {
        Pixel::Int(v) => Ok(v),
        Pixel::Float(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        Pixel::Float(v) => Err(D::Error::custom(format!(
            "pixel coordinate {v} is not an integer"
        ))),
    }
}
