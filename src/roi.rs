mod bbox;
mod compositor;
mod empty_sites;
mod geometry;
mod track;

pub use bbox::{BoundingBox, StackMeta};
pub use compositor::{
    AllFramesPolicy, Composition, CompositorConfig, MarginStack, build_stacks, stack_meta,
};
pub use empty_sites::synthesize;
pub use geometry::{
    BorderAction, BorderDiagnostic, CLIPPED_VALUE, Centering, Extents, FIT_VALUE, FitStatus,
    FrameTarget, Placement, SquareSize, place_square,
};
pub use track::{FrameKey, Track, TrackCollection, TrackId};
