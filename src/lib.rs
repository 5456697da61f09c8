//! Squared, centered regions of interest around tracked cells.
//!
//! Per-frame bounding boxes from a contour-detection pipeline are turned into
//! binary mask stacks, one per requested margin. Each stack marks the square
//! of the requested area around every cell in every frame: `1` where the
//! square fits the image, `2` where it was clipped at the border.

pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod roi;

pub use error::{Error, Result};
pub use pipeline::SquarePipeline;
pub use roi::{
    AllFramesPolicy, BoundingBox, Composition, CompositorConfig, FrameKey, MarginStack,
    StackMeta, Track, TrackCollection, TrackId, build_stacks, synthesize,
};
