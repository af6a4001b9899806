// src/pipeline/metrics.rs
//
// Classification counters across every trajectory in a run.

use crate::fam::TickOutcome;
use crate::types::StateKind;
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct ClassificationMetrics {
    pub trajectories: u64,
    pub total_frames: u64,
    pub inadmissible_frames: u64,
    pub transitions: u64,
    pub recoveries: u64,
    pub state_frames: BTreeMap<StateKind, u64>,
    pub started_at: Instant,
}

impl ClassificationMetrics {
    pub fn new() -> Self {
        Self {
            trajectories: 0,
            total_frames: 0,
            inadmissible_frames: 0,
            transitions: 0,
            recoveries: 0,
            state_frames: BTreeMap::new(),
            started_at: Instant::now(),
        }
    }

    pub fn start_trajectory(&mut self) {
        self.trajectories += 1;
    }

    pub fn record(&mut self, outcome: &TickOutcome) {
        self.total_frames += 1;
        if !outcome.admissible {
            self.inadmissible_frames += 1;
        }
        if outcome.transitioned {
            self.transitions += 1;
        }
        if outcome.recovery_triggered {
            self.recoveries += 1;
        }
        *self.state_frames.entry(outcome.state).or_insert(0) += 1;
    }

    /// Share of frames labelled Error.
    pub fn error_ratio(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        let errors = self.state_frames.get(&StateKind::Error).copied().unwrap_or(0);
        errors as f64 / self.total_frames as f64
    }

    pub fn fps(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            self.total_frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            trajectories: self.trajectories,
            total_frames: self.total_frames,
            inadmissible_frames: self.inadmissible_frames,
            transitions: self.transitions,
            recoveries: self.recoveries,
            error_ratio: self.error_ratio(),
            state_frames: self.state_frames.clone(),
            fps: self.fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for ClassificationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub trajectories: u64,
    pub total_frames: u64,
    pub inadmissible_frames: u64,
    pub transitions: u64,
    pub recoveries: u64,
    pub error_ratio: f64,
    pub state_frames: BTreeMap<StateKind, u64>,
    pub fps: f64,
    pub elapsed_secs: f64,
}
