//! Trait for readers that produce track collections.

use std::path::Path;

use crate::error::Error;
use crate::io::pickle;
use crate::roi::TrackCollection;

/// Source of per-cell bounding boxes.
///
/// Implement this trait to feed boxes from another contour pipeline or file
/// format into [`SquarePipeline`](crate::SquarePipeline).
pub trait TrackSource {
    /// Error type for load failures.
    type Error;

    /// Load all tracks stored at `path`.
    fn load(&mut self, path: &Path) -> Result<TrackCollection, Self::Error>;
}

/// Reads pickled track dicts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickleSource;

impl TrackSource for PickleSource {
    type Error = Error;

    fn load(&mut self, path: &Path) -> Result<TrackCollection, Self::Error> {
        pickle::read_collection(path)
    }
}
