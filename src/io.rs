//! Reading bounding boxes and writing mask stacks.

pub mod npz;
pub mod pickle;
mod source;

pub use npz::{export_squares, output_path, read_stack, write_stack};
pub use source::{PickleSource, TrackSource};
