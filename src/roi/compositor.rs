//! Compositing of all tracks into one mask stack per margin.

use ndarray::Array3;

use crate::error::{Error, Result};
use crate::roi::bbox::StackMeta;
use crate::roi::geometry::{BorderDiagnostic, Centering, FrameTarget, SquareSize, place_square};
use crate::roi::track::{FrameKey, TrackCollection};

/// Handling of track entries that are not tied to a concrete frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllFramesPolicy {
    /// Leave them out of every frame
    #[default]
    Skip,
    /// Draw them into every frame
    Broadcast,
}

/// Configuration for [`build_stacks`].
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// Additional area relative to the base area; 0 is no margin, 1 doubles it.
    pub margins: Vec<f64>,
    pub ignore_borders: bool,
    pub all_frames: AllFramesPolicy,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            margins: vec![0.0],
            ignore_borders: false,
            all_frames: AllFramesPolicy::Skip,
        }
    }
}

/// Mask stack for one margin, indexed `(frame, y, x)`.
#[derive(Debug, Clone)]
pub struct MarginStack {
    pub margin: f64,
    pub stack: Array3<u8>,
}

impl MarginStack {
    fn new(margin: f64, meta: &StackMeta) -> Self {
        Self {
            margin,
            stack: Array3::zeros(meta.shape()),
        }
    }

    /// Square side drawn for a base `area` with this stack's margin.
    pub fn side(&self, area: f64) -> i64 {
        SquareSize::side_for_area((1.0 + self.margin) * area)
    }
}

/// Stacks produced by one run, in the order of the configured margins.
#[derive(Debug, Clone)]
pub struct Composition {
    pub meta: StackMeta,
    pub stacks: Vec<MarginStack>,
    pub diagnostics: Vec<BorderDiagnostic>,
}

impl Composition {
    /// Stack for `margin`, if it was requested.
    pub fn stack(&self, margin: f64) -> Option<&Array3<u8>> {
        self.stacks
            .iter()
            .find(|s| s.margin == margin)
            .map(|s| &s.stack)
    }
}

/// Find the single stack metadata record among `collections`.
pub fn stack_meta(collections: &[&TrackCollection]) -> Result<StackMeta> {
    let mut found = collections.iter().filter_map(|c| c.meta());
    let meta = *found.next().ok_or(Error::MissingStackMeta)?;
    if found.next().is_some() {
        return Err(Error::DuplicateStackMeta);
    }
    if meta.n_frames == 0 || meta.width == 0 || meta.height == 0 {
        return Err(Error::InvalidStackMeta(format!(
            "stack must have at least one frame and one pixel, got {} frames of {}x{}",
            meta.n_frames, meta.width, meta.height
        )));
    }
    Ok(meta)
}

/// Draw a centroid-centered square around every box of every track, once per
/// margin.
///
/// The square side for a margin `m` is `round(sqrt((1 + m) * area))`. All
/// stacks stay resident until the call returns, so memory grows with
/// `margins * n_frames * height * width` bytes.
pub fn build_stacks(
    area: f64,
    collections: &[&TrackCollection],
    config: &CompositorConfig,
) -> Result<Composition> {
    let meta = stack_meta(collections)?;
    let mut stacks: Vec<MarginStack> = config
        .margins
        .iter()
        .map(|&margin| MarginStack::new(margin, &meta))
        .collect();
    let mut diagnostics = Vec::new();

    for (id, track) in collections.iter().flat_map(|c| c.tracks()) {
        log::debug!("compositing track {id} with {} boxes", track.len());
        for margin_stack in stacks.iter_mut() {
            let size = SquareSize::square(margin_stack.side(area));
            for (key, bbox) in track.iter() {
                let target = match (key, config.all_frames) {
                    (FrameKey::Index(frame), _) => FrameTarget::Frame(frame),
                    (FrameKey::AllFrames, AllFramesPolicy::Broadcast) => FrameTarget::All,
                    (FrameKey::AllFrames, AllFramesPolicy::Skip) => continue,
                };
                let placement = place_square(
                    &mut margin_stack.stack,
                    bbox,
                    size,
                    target,
                    Centering::Centroid,
                    config.ignore_borders,
                )?;
                diagnostics.extend(placement.diagnostic);
            }
        }
    }

    Ok(Composition {
        meta,
        stacks,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::bbox::BoundingBox;
    use crate::roi::geometry::{BorderAction, CLIPPED_VALUE, FIT_VALUE};
    use crate::roi::track::{Track, TrackId};
    use ndarray::s;

    fn cell_at(x: f64, y: f64) -> BoundingBox {
        BoundingBox::from_extents(x as i64 - 3, x as i64 + 3, y as i64 - 3, y as i64 + 3)
            .with_centroid(x, y)
    }

    fn single_cell(frames: usize) -> TrackCollection {
        let mut collection = TrackCollection::with_meta(StackMeta::new(frames, 64, 48));
        let track = (0..frames)
            .map(|f| (FrameKey::Index(f), cell_at(20.0 + f as f64, 24.0)))
            .collect();
        collection.insert(TrackId::Index(0), track);
        collection
    }

    fn drawn(stack: &Array3<u8>, frame: usize) -> usize {
        stack
            .slice(s![frame, .., ..])
            .iter()
            .filter(|&&v| v != 0)
            .count()
    }

    #[test]
    fn test_one_stack_per_margin() {
        let collection = single_cell(3);
        let config = CompositorConfig {
            margins: vec![0.0, 0.25],
            ..Default::default()
        };

        let composition = build_stacks(100.0, &[&collection], &config).unwrap();

        assert_eq!(composition.stacks.len(), 2);
        let plain = composition.stack(0.0).unwrap();
        let wide = composition.stack(0.25).unwrap();
        assert_eq!(plain.dim(), (3, 48, 64));
        assert_eq!(wide.dim(), (3, 48, 64));
        for frame in 0..3 {
            assert_eq!(drawn(plain, frame), 10 * 10);
            assert_eq!(drawn(wide, frame), 11 * 11);
            assert!(drawn(wide, frame) >= drawn(plain, frame));
        }
        assert!(composition.diagnostics.is_empty());
    }

    #[test]
    fn test_square_tracks_centroid() {
        let collection = single_cell(2);
        let composition =
            build_stacks(16.0, &[&collection], &CompositorConfig::default()).unwrap();
        let stack = composition.stack(0.0).unwrap();

        // Frame 1 centroid is (21, 24); side 4 spans x 19..23, y 22..26.
        assert_eq!(stack[[1, 22, 19]], FIT_VALUE);
        assert_eq!(stack[[1, 25, 22]], FIT_VALUE);
        assert_eq!(stack[[1, 22, 18]], 0);
        assert_eq!(stack[[1, 26, 22]], 0);
    }

    #[test]
    fn test_border_policy() {
        let mut collection = TrackCollection::with_meta(StackMeta::new(1, 32, 32));
        collection.insert(
            TrackId::Name("edge".into()),
            [(FrameKey::Index(0), cell_at(2.0, 16.0))].into_iter().collect(),
        );

        let excluded =
            build_stacks(64.0, &[&collection], &CompositorConfig::default()).unwrap();
        assert_eq!(drawn(excluded.stack(0.0).unwrap(), 0), 0);
        assert_eq!(excluded.diagnostics.len(), 1);
        assert_eq!(excluded.diagnostics[0].action, BorderAction::Exclude);

        let config = CompositorConfig {
            ignore_borders: true,
            ..Default::default()
        };
        let included = build_stacks(64.0, &[&collection], &config).unwrap();
        let stack = included.stack(0.0).unwrap();
        // Side 8 around x=2 spans -2..6, clipped to 0..6.
        assert_eq!(drawn(stack, 0), 6 * 8);
        assert!(stack.iter().all(|&v| v == 0 || v == CLIPPED_VALUE));
        assert_eq!(included.diagnostics.len(), 1);
        assert_eq!(included.diagnostics[0].action, BorderAction::Include);
    }

    #[test]
    fn test_all_frames_entries() {
        let mut sites = TrackCollection::new();
        let track: Track = [(FrameKey::AllFrames, cell_at(40.0, 20.0))]
            .into_iter()
            .collect();
        sites.insert(TrackId::Index(0), track);
        let cells = single_cell(3);

        let skipped =
            build_stacks(25.0, &[&cells, &sites], &CompositorConfig::default()).unwrap();
        for frame in 0..3 {
            assert_eq!(drawn(skipped.stack(0.0).unwrap(), frame), 25);
        }

        let config = CompositorConfig {
            all_frames: AllFramesPolicy::Broadcast,
            ..Default::default()
        };
        let broadcast = build_stacks(25.0, &[&cells, &sites], &config).unwrap();
        for frame in 0..3 {
            assert_eq!(drawn(broadcast.stack(0.0).unwrap(), frame), 50);
        }
    }

    #[test]
    fn test_stack_meta_must_be_unique() {
        let empty = TrackCollection::new();
        assert!(matches!(
            build_stacks(25.0, &[&empty], &CompositorConfig::default()),
            Err(Error::MissingStackMeta)
        ));

        let a = single_cell(1);
        let b = single_cell(1);
        assert!(matches!(
            stack_meta(&[&a, &b]),
            Err(Error::DuplicateStackMeta)
        ));

        let zero = TrackCollection::with_meta(StackMeta::new(0, 10, 10));
        assert!(matches!(
            stack_meta(&[&zero]),
            Err(Error::InvalidStackMeta(_))
        ));
    }
}
