//! Tags every accident with its bike-lane status.

use bike_map_accident_models::AccidentPoint;
use serde::Serialize;

use crate::lanes::LaneBufferIndex;

/// Outcome of tagging a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagReport {
    /// Points seen.
    pub total: usize,
    /// Points inside the lane buffer.
    pub on_lane: usize,
    /// Points with a valid position outside the lane buffer.
    pub off_lane: usize,
    /// Points with a missing or invalid position, tagged off-lane.
    pub skipped: usize,
}

/// Sets `on_bike_lane` on every point.
///
/// Overwrites any previous tag, so re-running with the same index gives
/// identical results.
pub fn tag_all(points: &mut [AccidentPoint], index: &LaneBufferIndex) -> TagReport {
    let mut report = TagReport {
        total: points.len(),
        ..TagReport::default()
    };

    for point in points.iter_mut() {
        point.on_bike_lane = match point.valid_position() {
            Some(position) => index.classify(position),
            None => {
                report.skipped += 1;
                false
            }
        };
        if point.on_bike_lane {
            report.on_lane += 1;
        }
    }
    report.off_lane = report.total - report.on_lane - report.skipped;

    log::info!(
        "Tagged {} accidents: {} on bike lanes, {} off, {} without a usable position",
        report.total,
        report.on_lane,
        report.off_lane,
        report.skipped
    );

    report
}
