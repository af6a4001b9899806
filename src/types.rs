// src/types.rs

use crate::fam::{MachineConfig, Thresholds};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub classifier: MachineConfig,
    pub thresholds: Thresholds,
    pub io: IoConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub input_dir: String,
    pub output_dir: String,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_dir: "data/features".to_string(),
            output_dir: "output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// BEHAVIORAL STATE LABELS
// ============================================================================

/// The seven labels a pedestrian can be classified as.
///
/// Declaration order of the ordinary states is the fixed evaluation order
/// used during recovery, and doubles as the recovery table ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateKind {
    #[serde(rename = "At Station")]
    AtStation,
    #[serde(rename = "Wait")]
    Wait,
    #[serde(rename = "Cross")]
    Cross,
    #[serde(rename = "Approach Sidewalk")]
    ApproachSidewalk,
    #[serde(rename = "Move Along Sidewalk")]
    MoveAlongSidewalk,
    #[serde(rename = "Approach Target Station")]
    ApproachTargetStation,
    #[serde(rename = "Error")]
    Error,
}

/// Number of ordinary (non-Error) states.
pub const ORDINARY_STATE_COUNT: usize = 6;

impl StateKind {
    /// Ordinary states in recovery evaluation order.
    pub const ORDINARY: [StateKind; ORDINARY_STATE_COUNT] = [
        StateKind::AtStation,
        StateKind::Wait,
        StateKind::Cross,
        StateKind::ApproachSidewalk,
        StateKind::MoveAlongSidewalk,
        StateKind::ApproachTargetStation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AtStation => "At Station",
            Self::Wait => "Wait",
            Self::Cross => "Cross",
            Self::ApproachSidewalk => "Approach Sidewalk",
            Self::MoveAlongSidewalk => "Move Along Sidewalk",
            Self::ApproachTargetStation => "Approach Target Station",
            Self::Error => "Error",
        }
    }

    /// Position in [`StateKind::ORDINARY`], `None` for `Error`.
    pub fn ordinal(&self) -> Option<usize> {
        match self {
            Self::AtStation => Some(0),
            Self::Wait => Some(1),
            Self::Cross => Some(2),
            Self::ApproachSidewalk => Some(3),
            Self::MoveAlongSidewalk => Some(4),
            Self::ApproachTargetStation => Some(5),
            Self::Error => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// FEATURE FRAME
// ============================================================================

/// One timestamped feature snapshot for a (pedestrian, AGV) pair.
///
/// Field names follow the upstream feature pipeline's columns. Distances are
/// in the pipeline's unit (centimetres by default, see
/// `Thresholds::units_per_meter`), speeds in m/s. Derived distances may be
/// missing for a frame; any comparison against a missing value is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    #[serde(rename = "AGV_name", default)]
    pub agv_name: String,
    #[serde(rename = "TimestampID", default)]
    pub timestamp_id: i64,

    // Kinematics
    #[serde(rename = "User_speed")]
    pub user_speed: f64,
    #[serde(rename = "User_speed_X")]
    pub user_speed_x: f64,
    #[serde(rename = "User_speed_Y")]
    pub user_speed_y: f64,

    // Gaze / intent flags
    #[serde(rename = "intent_to_cross")]
    pub intent_to_cross: bool,
    #[serde(rename = "possible_interaction")]
    pub possible_interaction: bool,
    #[serde(rename = "looking_at_AGV")]
    pub looking_at_agv: bool,
    #[serde(rename = "looking_at_closest_station", default)]
    pub looking_at_closest_station: bool,
    #[serde(rename = "facing_to_road")]
    pub facing_to_road: bool,
    #[serde(rename = "facing_along_sidewalk")]
    pub facing_along_sidewalk: bool,

    // Placement
    #[serde(rename = "On_sidewalks")]
    pub on_sidewalks: bool,
    #[serde(rename = "On_road")]
    pub on_road: bool,

    // Stations (-1 = none)
    #[serde(rename = "closest_station")]
    pub closest_station: i32,
    #[serde(rename = "Gazing_station")]
    pub gazing_station: i32,

    // Derived distances
    #[serde(rename = "distance_to_closest_station", default)]
    pub distance_to_closest_station: Option<f64>,
    #[serde(rename = "distance_to_closest_station_X", default)]
    pub distance_to_closest_station_x: Option<f64>,
    #[serde(rename = "distance_to_closest_station_Y", default)]
    pub distance_to_closest_station_y: Option<f64>,
    #[serde(rename = "distance_from_start_station_Y", default)]
    pub distance_from_start_station_y: Option<f64>,
    #[serde(rename = "distance_from_end_station_X", default)]
    pub distance_from_end_station_x: Option<f64>,
    #[serde(rename = "distance_from_end_station_Y", default)]
    pub distance_from_end_station_y: Option<f64>,
}

impl Default for FeatureFrame {
    fn default() -> Self {
        Self {
            agv_name: String::new(),
            timestamp_id: 0,
            user_speed: 0.0,
            user_speed_x: 0.0,
            user_speed_y: 0.0,
            intent_to_cross: false,
            possible_interaction: false,
            looking_at_agv: false,
            looking_at_closest_station: false,
            facing_to_road: false,
            facing_along_sidewalk: false,
            on_sidewalks: false,
            on_road: false,
            closest_station: -1,
            gazing_station: -1,
            distance_to_closest_station: None,
            distance_to_closest_station_x: None,
            distance_to_closest_station_y: None,
            distance_from_start_station_y: None,
            distance_from_end_station_x: None,
            distance_from_end_station_y: None,
        }
    }
}
