// src/fam/predicates.rs
//
// Admissibility checks: does a frame satisfy the defining constraints of a
// state? All checks are pure functions of the frame and thresholds.

use super::thresholds::Thresholds;
use crate::types::{FeatureFrame, StateKind};

/// Admissibility of `kind` for `frame`. Error is always admissible.
pub fn check(kind: StateKind, frame: &FeatureFrame, t: &Thresholds) -> bool {
    match kind {
        StateKind::AtStation => at_station(frame, t),
        StateKind::Wait => wait(frame, t),
        StateKind::Cross => cross(frame, t),
        StateKind::ApproachSidewalk => approach_sidewalk(frame, t),
        StateKind::MoveAlongSidewalk => move_along_sidewalk(frame, t),
        StateKind::ApproachTargetStation => approach_target_station(frame, t),
        StateKind::Error => true,
    }
}

/// `value < bound`, false when the feature is missing.
#[inline]
pub(crate) fn below(value: Option<f64>, bound: f64) -> bool {
    value.is_some_and(|v| v < bound)
}

/// `value <= bound`, false when the feature is missing.
#[inline]
pub(crate) fn at_most(value: Option<f64>, bound: f64) -> bool {
    value.is_some_and(|v| v <= bound)
}

/// Stationary, close to a station on both axes, off the road.
pub fn at_station(f: &FeatureFrame, t: &Thresholds) -> bool {
    let stationary = f.user_speed.abs() <= t.walk_stay * 2.0;
    let near_x = below(
        f.distance_to_closest_station_x,
        t.in_frame_units(t.close_to_station_x * 2.0),
    );
    let near_y = below(
        f.distance_to_closest_station_y,
        t.in_frame_units(t.close_to_station_y * 2.0),
    );

    stationary && near_x && near_y && !f.on_road
}

/// Slow enough to be standing, with some reason to be holding position.
pub fn wait(f: &FeatureFrame, t: &Thresholds) -> bool {
    f.user_speed.abs() <= t.walk_stay
        && (f.possible_interaction || f.looking_at_agv || f.on_road)
}

pub fn cross(f: &FeatureFrame, t: &Thresholds) -> bool {
    let moving = f.user_speed_y.abs() > t.walk_stay;
    moving && f.on_road && (f.facing_to_road || f.looking_at_agv)
}

/// Near the closest station in Y and heading out along +Y, off the road.
pub fn approach_sidewalk(f: &FeatureFrame, t: &Thresholds) -> bool {
    let near_station = f
        .distance_to_closest_station_y
        .is_some_and(|d| d.abs() <= t.in_frame_units(t.close_to_station_y * 2.0));
    let moving = f.user_speed_y > t.walk_stay * 0.3;

    near_station && moving && !f.on_road
}

pub fn move_along_sidewalk(f: &FeatureFrame, t: &Thresholds) -> bool {
    let moving = f.user_speed_x > t.walk_stay * 0.8;
    let margin = t.in_frame_units(t.sidewalk_offset + t.margin_near_sidewalks);
    let within_sidewalk =
        below(f.distance_from_start_station_y, margin) || below(f.distance_from_end_station_y, margin);

    within_sidewalk && moving
}

pub fn approach_target_station(f: &FeatureFrame, t: &Thresholds) -> bool {
    let near_x = below(
        f.distance_from_end_station_x,
        t.in_frame_units(t.station_length * 2.0),
    );
    let near_y = below(
        f.distance_from_end_station_y,
        t.in_frame_units(t.close_to_station * 1.5),
    );

    !f.on_road && near_x && near_y && f.user_speed > t.walk_stay * 0.2
}
