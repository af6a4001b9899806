// src/fam/transitions.rs
//
// Per-state transition rules. Branches are evaluated top to bottom and the
// first match wins; when nothing matches the state stays where it is.

use super::predicates::at_most;
use super::thresholds::Thresholds;
use crate::types::{FeatureFrame, StateKind};

/// Proposed next state together with the rule's confidence in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next: StateKind,
    pub probability: f64,
}

impl Transition {
    pub fn certain(next: StateKind) -> Self {
        Self {
            next,
            probability: 1.0,
        }
    }
}

pub fn from_at_station(f: &FeatureFrame, t: &Thresholds) -> Transition {
    let s = t.walk_stay;
    let speed = f.user_speed.abs();

    if speed > s && (f.on_sidewalks || f.facing_along_sidewalk) {
        return Transition::certain(StateKind::ApproachSidewalk);
    }
    if speed <= s && f.intent_to_cross && f.possible_interaction {
        return Transition::certain(StateKind::Wait);
    }
    Transition::certain(StateKind::AtStation)
}

pub fn from_wait(f: &FeatureFrame, t: &Thresholds) -> Transition {
    let s = t.walk_stay;
    let speed = f.user_speed.abs();

    if speed > 0.8 * s && f.on_road && f.facing_to_road {
        return Transition::certain(StateKind::Cross);
    }
    if speed > s && f.on_sidewalks {
        return Transition::certain(StateKind::ApproachSidewalk);
    }
    if f.user_speed_x.abs() > 0.8 * s && (f.on_sidewalks || f.facing_along_sidewalk) {
        return Transition::certain(StateKind::MoveAlongSidewalk);
    }
    Transition::certain(StateKind::Wait)
}

pub fn from_approach_sidewalk(f: &FeatureFrame, t: &Thresholds) -> Transition {
    let s = t.walk_stay;
    let speed_x = f.user_speed_x.abs();
    let speed_y = f.user_speed_y.abs();

    // Missing proximity reads as "not near".
    let near_station = f
        .distance_to_closest_station_x
        .is_some_and(|d| d < t.in_frame_units(t.close_to_station_x))
        && f
            .distance_to_closest_station_y
            .is_some_and(|d| d < t.in_frame_units(t.close_to_station_y));

    if speed_y > 0.5 * s && f.facing_to_road && f.on_road {
        return Transition::certain(StateKind::Cross);
    }
    if f.user_speed.abs() <= s && f.intent_to_cross && f.possible_interaction {
        return Transition::certain(StateKind::Wait);
    }
    let walking_along = speed_x > 1.5 * speed_y || (f.facing_along_sidewalk && speed_x > s);
    if walking_along && (!near_station || f.facing_along_sidewalk) {
        return Transition::certain(StateKind::MoveAlongSidewalk);
    }
    Transition::certain(StateKind::ApproachSidewalk)
}

pub fn from_cross(f: &FeatureFrame, t: &Thresholds) -> Transition {
    let s = t.walk_stay;
    let speed = f.user_speed.abs();
    let speed_x = f.user_speed_x.abs();
    let speed_y = f.user_speed_y.abs();

    if f.on_sidewalks
        && (speed_x > 1.5 * speed_y || (f.facing_along_sidewalk && speed_x > 0.5 * s))
    {
        return Transition::certain(StateKind::MoveAlongSidewalk);
    }
    if speed > s && f.closest_station == f.gazing_station && !f.on_road {
        return Transition::certain(StateKind::ApproachTargetStation);
    }
    if speed < s && f.possible_interaction && f.looking_at_agv && f.on_road {
        return Transition::certain(StateKind::Wait);
    }
    if speed < s
        && !f.facing_to_road
        && at_most(
            f.distance_to_closest_station,
            t.in_frame_units(t.close_to_station),
        )
    {
        return Transition::certain(StateKind::AtStation);
    }
    Transition::certain(StateKind::Cross)
}

pub fn from_move_along_sidewalk(f: &FeatureFrame, t: &Thresholds) -> Transition {
    let s = t.walk_stay;
    let speed = f.user_speed.abs();
    let speed_x = f.user_speed_x.abs();
    let speed_y = f.user_speed_y.abs();

    let turning_to_road = speed_y > 1.5 * speed_x || (speed_y > s && f.facing_to_road);
    if turning_to_road && (f.intent_to_cross || f.on_road) {
        return Transition::certain(StateKind::Cross);
    }
    if speed < s && f.intent_to_cross && f.possible_interaction {
        return Transition::certain(StateKind::Wait);
    }
    if (speed < s || f.looking_at_closest_station)
        && !f.facing_to_road
        && at_most(
            f.distance_to_closest_station,
            t.in_frame_units(t.close_to_station * 2.0),
        )
    {
        return Transition::certain(StateKind::ApproachTargetStation);
    }
    Transition::certain(StateKind::MoveAlongSidewalk)
}

pub fn from_approach_target_station(f: &FeatureFrame, t: &Thresholds) -> Transition {
    if f.user_speed.abs() < t.walk_stay
        && !f.facing_to_road
        && at_most(
            f.distance_to_closest_station,
            t.in_frame_units(t.close_to_station * 3.0),
        )
    {
        return Transition::certain(StateKind::AtStation);
    }
    Transition::certain(StateKind::ApproachTargetStation)
}
