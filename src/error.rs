//! Error type shared by the ROI and I/O modules.

use thiserror::Error;

/// Errors raised while configuring a run, reading tracks, or writing stacks.
#[derive(Debug, Error)]
pub enum Error {
    /// Area is neither numeric nor a predefined area name.
    #[error(
        "Invalid area '{0}'. Area must be a numeric value or a name of a predefined area."
    )]
    InvalidArea(String),
    /// A named area was given without a resolution.
    #[error(
        "No resolution given. Resolution must be specified when specifying a named area."
    )]
    MissingResolution,
    /// Resolution is neither numeric nor a predefined resolution name.
    #[error(
        "Invalid resolution '{0}'. Resolution must be a numeric value or a name of a predefined resolution."
    )]
    InvalidResolution(String),
    #[error(
        "Invalid coordinate '{0}'. Coordinates must consist of two integers separated by a comma."
    )]
    InvalidCoordinate(String),
    #[error(
        "Invalid margin '{0}'. Margins must be comma-separated percentages of at least 0."
    )]
    InvalidMargin(String),
    /// The area rounds to a zero-sized box.
    #[error("Area {0} is too small to form a box of at least one pixel")]
    AreaTooSmall(f64),
    /// A bounding box with reversed, non-finite or out-of-range coordinates.
    #[error("Invalid bounding box: {0}")]
    InvalidBox(String),
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("No stack metadata found in the supplied track collections")]
    MissingStackMeta,
    #[error("More than one stack metadata record found in the supplied track collections")]
    DuplicateStackMeta,
    #[error("Invalid stack metadata: {0}")]
    InvalidStackMeta(String),
    #[error("Frame {frame} is out of range for a stack of {n_frames} frames")]
    FrameOutOfRange { frame: usize, n_frames: usize },
    /// Input data does not have the expected structure.
    #[error("Malformed track data: {0}")]
    Malformed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Pickle(#[from] serde_pickle::Error),
    #[error(transparent)]
    WriteNpz(#[from] ndarray_npy::WriteNpzError),
    #[error(transparent)]
    ReadNpz(#[from] ndarray_npy::ReadNpzError),
}

pub type Result<T> = std::result::Result<T, Error>;
