//! Synthetic boxes at fixed positions, e.g. to analyze unoccupied adhesion
//! sites alongside real detections.

use crate::error::Result;
use crate::roi::bbox::BoundingBox;
use crate::roi::geometry::SquareSize;
use crate::roi::track::{FrameKey, Track, TrackCollection, TrackId};

/// Build one single-entry track per center in `coords`.
///
/// Each box has the near-square size of [`SquareSize::from_area`] and is
/// stored under [`FrameKey::AllFrames`]. Tracks are keyed by their position
/// in `coords`. The result carries no stack metadata.
pub fn synthesize(coords: &[(i64, i64)], area: f64) -> Result<TrackCollection> {
    let size = SquareSize::from_area(area)?;
    let (half_w, half_h) = (size.width / 2, size.height / 2);

    let mut collection = TrackCollection::new();
    for (i, &(cx, cy)) in coords.iter().enumerate() {
        let x1 = cx - half_w;
        let y1 = cy - half_h;
        let x2 = x1 + size.width;
        let y2 = y1 + size.height;
        // The far edge is stored as the first pixel past the box.
        let bbox = BoundingBox {
            x_min: x1,
            x_max: x2,
            y_min: y1,
            y_max: y2,
            x_mean: (x1 + x2) as f64 / 2.0,
            y_mean: (y1 + y2) as f64 / 2.0,
            area: size.area() as f64,
        };
        let track: Track = [(FrameKey::AllFrames, bbox)].into_iter().collect();
        collection.insert(TrackId::Index(i as i64), track);
    }
    Ok(collection)
}
