//! SquarePipeline for turning bounding-box files into mask stacks.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::io::{self, TrackSource};
use crate::roi::{self, Composition, CompositorConfig, TrackCollection};

/// Loads one input at a time, composites its tracks together with any
/// synthetic empty sites and writes one stack per margin.
pub struct SquarePipeline<S: TrackSource> {
    source: S,
    area: f64,
    empty_sites: Option<TrackCollection>,
    config: CompositorConfig,
    outdir: Option<PathBuf>,
}

impl<S> SquarePipeline<S>
where
    S: TrackSource,
    Error: From<S::Error>,
{
    /// Create a pipeline for a base ROI `area` in px².
    pub fn new(source: S, area: f64, config: CompositorConfig) -> Self {
        Self {
            source,
            area,
            empty_sites: None,
            config,
            outdir: None,
        }
    }

    /// Add synthetic boxes centered at `coords` to every input.
    pub fn with_empty_sites(mut self, coords: &[(i64, i64)]) -> Result<Self> {
        self.empty_sites = if coords.is_empty() {
            None
        } else {
            Some(roi::synthesize(coords, self.area)?)
        };
        Ok(self)
    }

    /// Write outputs to `outdir` instead of next to each input.
    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = Some(outdir.into());
        self
    }

    /// Composite `collection` and the empty sites without writing anything.
    pub fn composite(&self, collection: &TrackCollection) -> Result<Composition> {
        let mut collections = vec![collection];
        collections.extend(self.empty_sites.as_ref());
        roi::build_stacks(self.area, &collections, &self.config)
    }

    /// Process one input file and return the paths of the written stacks.
    pub fn process_file(&mut self, path: &Path) -> Result<Vec<PathBuf>> {
        let collection = self.source.load(path)?;
        log::debug!("{}: {} tracks", path.display(), collection.len());

        let composition = self.composite(&collection)?;
        if !composition.diagnostics.is_empty() {
            log::debug!(
                "{}: {} boxes hit the image border",
                path.display(),
                composition.diagnostics.len()
            );
        }
        io::export_squares(&composition.stacks, path, self.outdir.as_deref())
    }

    /// Get a reference to the underlying track source.
    pub fn source(&self) -> &S {
        &self.source
    }
}
