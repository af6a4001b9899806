// src/fam/thresholds.rs
//
// Classifier constants. Every predicate reads its thresholds from one
// immutable value so tests can override them without touching globals.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Base walking speed separating "walking" from "staying" (m/s).
    pub walk_stay: f64,
    /// Bound on the distance to the closest station (m).
    pub close_to_station: f64,
    /// X proximity to the closest station (m).
    pub close_to_station_x: f64,
    /// Y proximity to the closest station (m).
    pub close_to_station_y: f64,
    /// Extra Y margin around the sidewalk (m).
    pub margin_near_sidewalks: f64,
    /// Y offset between a station and its sidewalk (m).
    pub sidewalk_offset: f64,
    /// Length of a station along X (m).
    pub station_length: f64,
    /// Distance units per metre in incoming frames (100 = centimetres).
    pub units_per_meter: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            walk_stay: 0.3,
            close_to_station: 3.0,
            close_to_station_x: 3.0,
            close_to_station_y: 2.0,
            margin_near_sidewalks: 1.0,
            sidewalk_offset: 5.0,
            station_length: 5.0,
            units_per_meter: 100.0,
        }
    }
}

impl Thresholds {
    /// Convert a length in metres into the frame's distance unit.
    #[inline]
    pub fn in_frame_units(&self, meters: f64) -> f64 {
        meters * self.units_per_meter
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("walk_stay", self.walk_stay),
            ("close_to_station", self.close_to_station),
            ("close_to_station_x", self.close_to_station_x),
            ("close_to_station_y", self.close_to_station_y),
            ("sidewalk_offset", self.sidewalk_offset),
            ("station_length", self.station_length),
            ("units_per_meter", self.units_per_meter),
        ];
        for (name, value) in positive {
            ensure!(
                value.is_finite() && value > 0.0,
                "threshold `{}` must be a positive number, got {}",
                name,
                value
            );
        }
        ensure!(
            self.margin_near_sidewalks.is_finite() && self.margin_near_sidewalks >= 0.0,
            "threshold `margin_near_sidewalks` must be non-negative, got {}",
            self.margin_near_sidewalks
        );
        Ok(())
    }
}
