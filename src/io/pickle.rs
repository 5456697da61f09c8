//! Reader for pickled bounding-box files written by the contour pipeline.
//!
//! The file holds a dict from track name to a dict from frame index to a box
//! record. The `None` key of the outer dict holds the stack metadata
//! (`n_frames`, `width`, `height`). Inside a track, `None` and sentinel
//! objects such as `Ellipsis` mark entries that are not tied to a frame.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_pickle::{DeOptions, HashableValue, Value};

use crate::error::{Error, Result};
use crate::roi::{BoundingBox, FrameKey, StackMeta, Track, TrackCollection, TrackId};

/// Read a track collection from a pickle file.
pub fn read_collection(path: &Path) -> Result<TrackCollection> {
    let file = File::open(path)?;
    from_reader(BufReader::new(file))
}

/// Read a track collection from any pickle stream.
///
/// Values must be native Python ints and floats. numpy scalars such as
/// `numpy.float64` are pickled as globals `serde-pickle` cannot resolve;
/// they decode as `None` and the box is reported as [`Error::Malformed`].
pub fn from_reader<R: Read>(reader: R) -> Result<TrackCollection> {
    // Globals we cannot resolve (e.g. `Ellipsis`) decode as `None`.
    let options = DeOptions::new().replace_unresolved_globals();
    let value = serde_pickle::value_from_reader(reader, options)?;
    decode_collection(value)
}

fn decode_collection(value: Value) -> Result<TrackCollection> {
    let entries = match value {
        Value::Dict(entries) => entries,
        Value::None => return Ok(TrackCollection::new()),
        other => {
            return Err(Error::Malformed(format!(
                "expected a dict of tracks, got {}",
                kind(&other)
            )));
        }
    };

    let mut collection = TrackCollection::new();
    for (key, value) in entries {
        if key == HashableValue::None {
            let meta: StackMeta = serde_pickle::from_value(value)
                .map_err(|e| Error::Malformed(format!("stack metadata: {e}")))?;
            collection.set_meta(meta);
            continue;
        }

        let id = track_id(key)?;
        if let Some(track) = decode_track(&id, value)? {
            collection.insert(id, track);
        }
    }
    Ok(collection)
}

fn decode_track(id: &TrackId, value: Value) -> Result<Option<Track>> {
    let frames = match value {
        Value::Dict(frames) => frames,
        Value::None => return Ok(None),
        other => {
            return Err(Error::Malformed(format!(
                "track {id}: expected a dict of frames, got {}",
                kind(&other)
            )));
        }
    };

    let mut track = Track::new();
    for (key, value) in frames {
        let frame = frame_key(id, key)?;
        let bbox: BoundingBox = serde_pickle::from_value(value)
            .map_err(|e| Error::Malformed(format!("track {id}, frame {frame:?}: {e}")))?;
        track.insert(frame, bbox);
    }
    Ok(Some(track))
}

fn track_id(key: HashableValue) -> Result<TrackId> {
    match key {
        HashableValue::I64(i) => Ok(TrackId::Index(i)),
        HashableValue::String(name) => Ok(TrackId::Name(name)),
        HashableValue::Bytes(bytes) => Ok(TrackId::Name(
            String::from_utf8_lossy(&bytes).into_owned(),
        )),
        other => Err(Error::Malformed(format!(
            "unsupported track key {other:?}"
        ))),
    }
}

fn frame_key(id: &TrackId, key: HashableValue) -> Result<FrameKey> {
    match key {
        HashableValue::I64(i) if i >= 0 => Ok(FrameKey::Index(i as usize)),
        HashableValue::None => Ok(FrameKey::AllFrames),
        other => Err(Error::Malformed(format!(
            "track {id}: invalid frame key {other:?}"
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::None => "None",
        Value::Bool(_) => "bool",
        Value::I64(_) | Value::Int(_) => "int",
        Value::F64(_) => "float",
        Value::String(_) => "str",
        Value::Bytes(_) => "bytes",
        Value::List(_) | Value::Tuple(_) => "sequence",
        Value::Dict(_) => "dict",
        _ => "set",
    }
}
