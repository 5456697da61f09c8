//! Per-cell trajectories and the collections read from one input source.

use std::collections::BTreeMap;
use std::fmt;

use crate::roi::bbox::{BoundingBox, StackMeta};

/// Key of one entry in a [`Track`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrameKey {
    /// Zero-based frame index
    Index(usize),
    /// Placeholder entry not tied to a concrete frame
    AllFrames,
}

/// Opaque identifier of a track within a collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackId {
    Index(i64),
    Name(String),
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Trajectory of one cell: a bounding box per frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    boxes: BTreeMap<FrameKey, BoundingBox>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a box, returning the one previously stored under `key`.
    pub fn insert(&mut self, key: FrameKey, bbox: BoundingBox) -> Option<BoundingBox> {
        self.boxes.insert(key, bbox)
    }

    pub fn get(&self, key: FrameKey) -> Option<&BoundingBox> {
        self.boxes.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FrameKey, &BoundingBox)> {
        self.boxes.iter().map(|(k, b)| (*k, b))
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl FromIterator<(FrameKey, BoundingBox)> for Track {
    fn from_iter<I: IntoIterator<Item = (FrameKey, BoundingBox)>>(iter: I) -> Self {
        Self {
            boxes: iter.into_iter().collect(),
        }
    }
}

/// All tracks read from one input, plus the stack metadata if the input
/// carries it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackCollection {
    tracks: BTreeMap<TrackId, Track>,
    meta: Option<StackMeta>,
}

impl TrackCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_meta(meta: StackMeta) -> Self {
        Self {
            tracks: BTreeMap::new(),
            meta: Some(meta),
        }
    }

    pub fn insert(&mut self, id: TrackId, track: Track) -> Option<Track> {
        self.tracks.insert(id, track)
    }

    pub fn set_meta(&mut self, meta: StackMeta) {
        self.meta = Some(meta);
    }

    pub fn meta(&self) -> Option<&StackMeta> {
        self.meta.as_ref()
    }

    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.get(id)
    }

    pub fn tracks(&self) -> impl Iterator<Item = (&TrackId, &Track)> {
        self.tracks.iter()
    }

    /// Number of tracks, not counting the metadata entry.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
