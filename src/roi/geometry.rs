//! Placement of size-adjusted boxes around cells and drawing them into
//! frame stacks.

use std::fmt;

use ndarray::{Array3, s};

use crate::error::{Error, Result};
use crate::roi::bbox::BoundingBox;

/// Value drawn for a box that lies entirely inside the image.
pub const FIT_VALUE: u8 = 1;
/// Value drawn for a box that was clipped at the image border.
pub const CLIPPED_VALUE: u8 = 2;

/// Target size of a placed box in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareSize {
    pub width: i64,
    pub height: i64,
}

impl SquareSize {
    #[inline]
    pub fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// A square with the given side length.
    #[inline]
    pub fn square(side: i64) -> Self {
        Self::new(side, side)
    }

    /// Side of the square whose area is closest to `area`.
    #[inline]
    pub fn side_for_area(area: f64) -> i64 {
        area.sqrt().round_ties_even() as i64
    }

    /// Near-square rectangle for `area`: the width is rounded first and the
    /// height is derived from it, so `width * height` may differ from `area`.
    pub fn from_area(area: f64) -> Result<Self> {
        let width = Self::side_for_area(area);
        if width < 1 {
            return Err(Error::AreaTooSmall(area));
        }
        let height = (area / width as f64).round_ties_even() as i64;
        if height < 1 {
            return Err(Error::AreaTooSmall(area));
        }
        Ok(Self::new(width, height))
    }

    /// The inclusive size of an existing box.
    pub fn of_box(bbox: &BoundingBox) -> Self {
        Self::new(bbox.width(), bbox.height())
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width * self.height
    }
}

/// Where the placed box is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Centering {
    /// Centered on the original box extents; size changes are split evenly,
    /// odd remainders going to the lower edge.
    Bounds,
    /// Centered on the rounded centroid of the contour.
    Centroid,
}

/// Frames of the stack a box is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTarget {
    Frame(usize),
    All,
}

impl fmt::Display for FrameTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Frames are reported 1-based.
            Self::Frame(i) => write!(f, "{}", i + 1),
            Self::All => f.write_str(":"),
        }
    }
}

/// Half-open pixel extents `[x1, x2) x [y1, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extents {
    pub x1: i64,
    pub x2: i64,
    pub y1: i64,
    pub y2: i64,
}

impl Extents {
    /// Compute the extents of a box of `size` placed around `bbox`.
    ///
    /// Fails for boxes rejected by [`BoundingBox::validate`] and for
    /// placements that leave the `i64` pixel range.
    pub fn place(bbox: &BoundingBox, size: SquareSize, centering: Centering) -> Result<Self> {
        bbox.validate()?;
        let overflow = || {
            Error::InvalidBox(format!(
                "{}x{} box around {bbox:?} exceeds the pixel range",
                size.width, size.height
            ))
        };
        let (x1, y1) = match centering {
            Centering::Centroid => {
                let (cx, cy) = bbox.rounded_centroid();
                (
                    cx.checked_sub(size.width / 2),
                    cy.checked_sub(size.height / 2),
                )
            }
            Centering::Bounds => (
                size.width
                    .checked_sub(bbox.width())
                    .and_then(|d| bbox.x_min.checked_sub(d.div_euclid(2))),
                size.height
                    .checked_sub(bbox.height())
                    .and_then(|d| bbox.y_min.checked_sub(d.div_euclid(2))),
            ),
        };
        let (x1, y1) = x1.zip(y1).ok_or_else(overflow)?;
        Ok(Self {
            x1,
            x2: x1.checked_add(size.width).ok_or_else(overflow)?,
            y1,
            y2: y1.checked_add(size.height).ok_or_else(overflow)?,
        })
    }

    /// Whether the extents lie inside an image of `width` x `height`.
    pub fn fits(&self, width: usize, height: usize) -> bool {
        self.x1 >= 0 && self.y1 >= 0 && self.x2 <= width as i64 && self.y2 <= height as i64
    }

    /// Clamp the extents to an image of `width` x `height`.
    pub fn clamp(&self, width: usize, height: usize) -> Self {
        let (w, h) = (width as i64, height as i64);
        Self {
            x1: self.x1.clamp(0, w),
            x2: self.x2.clamp(0, w),
            y1: self.y1.clamp(0, h),
            y2: self.y2.clamp(0, h),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }
}

/// Outcome of placing one box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStatus {
    /// Drawn unclipped with [`FIT_VALUE`].
    Fits,
    /// Drawn inside the clamped extents with [`CLIPPED_VALUE`].
    Clipped(Extents),
    /// Hit the border and was not drawn.
    Excluded,
}

/// Action taken for a box that hits the image border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderAction {
    Include,
    Exclude,
}

impl fmt::Display for BorderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => f.write_str("INCLUDE"),
            Self::Exclude => f.write_str("EXCLUDE"),
        }
    }
}

/// Report of a box that extends beyond the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderDiagnostic {
    pub action: BorderAction,
    /// Extents before clamping
    pub extents: Extents,
    pub target: FrameTarget,
    pub size: SquareSize,
}

impl fmt::Display for BorderDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Extents { x1, x2, y1, y2 } = self.extents;
        write!(
            f,
            "{} box (x={x1}:{x2}, y={y1}:{y2})[{}] that hits border (w={}, h={})",
            self.action, self.target, self.size.width, self.size.height
        )
    }
}

/// Result of [`place_square`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Extents as computed, before any clamping
    pub extents: Extents,
    pub status: FitStatus,
    pub diagnostic: Option<BorderDiagnostic>,
}

/// Place a box of `size` around `bbox` and draw it into `stack`.
///
/// `stack` is indexed `(frame, y, x)`. Boxes inside the image are drawn with
/// [`FIT_VALUE`]. Boxes that hit the border are clipped and drawn with
/// [`CLIPPED_VALUE`] when `ignore_borders` is set and left out otherwise;
/// either way a [`BorderDiagnostic`] is logged and returned.
pub fn place_square(
    stack: &mut Array3<u8>,
    bbox: &BoundingBox,
    size: SquareSize,
    target: FrameTarget,
    centering: Centering,
    ignore_borders: bool,
) -> Result<Placement> {
    let (n_frames, height, width) = stack.dim();
    if let FrameTarget::Frame(frame) = target {
        if frame >= n_frames {
            return Err(Error::FrameOutOfRange { frame, n_frames });
        }
    }

    let extents = Extents::place(bbox, size, centering)?;
    if extents.fits(width, height) {
        fill(stack, target, extents, FIT_VALUE);
        return Ok(Placement {
            extents,
            status: FitStatus::Fits,
            diagnostic: None,
        });
    }

    let action = if ignore_borders {
        BorderAction::Include
    } else {
        BorderAction::Exclude
    };
    let diagnostic = BorderDiagnostic {
        action,
        extents,
        target,
        size,
    };
    log::warn!("{diagnostic}");

    let status = match action {
        BorderAction::Exclude => FitStatus::Excluded,
        BorderAction::Include => {
            let clipped = extents.clamp(width, height);
            fill(stack, target, clipped, CLIPPED_VALUE);
            FitStatus::Clipped(clipped)
        }
    };
    Ok(Placement {
        extents,
        status,
        diagnostic: Some(diagnostic),
    })
}

/// Write `value` into `extents`, which must already lie inside the stack.
fn fill(stack: &mut Array3<u8>, target: FrameTarget, extents: Extents, value: u8) {
    if extents.is_empty() {
        return;
    }
    let (x1, x2) = (extents.x1 as usize, extents.x2 as usize);
    let (y1, y2) = (extents.y1 as usize, extents.y2 as usize);
    match target {
        FrameTarget::Frame(f) => stack.slice_mut(s![f, y1..y2, x1..x2]).fill(value),
        FrameTarget::All => stack.slice_mut(s![.., y1..y2, x1..x2]).fill(value),
    }
}
