// src/pipeline/runner.rs
//
// Classifies whole trajectories: one fresh machine per AGV, frames fed in
// input order, one labelled record per frame.

use super::metrics::ClassificationMetrics;
use crate::fam::{FiniteAutomationMachine, MachineConfig, Thresholds};
use crate::types::{FeatureFrame, StateKind};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelledFrame {
    #[serde(rename = "AGV_name")]
    pub agv_name: String,
    #[serde(rename = "TimestampID")]
    pub timestamp_id: i64,
    pub state: StateKind,
    pub admissible: bool,
}

pub struct TrajectoryRunner {
    config: MachineConfig,
    thresholds: Thresholds,
    metrics: ClassificationMetrics,
}

impl TrajectoryRunner {
    pub fn new(config: MachineConfig, thresholds: Thresholds) -> Self {
        Self {
            config,
            thresholds,
            metrics: ClassificationMetrics::new(),
        }
    }

    pub fn classify(&mut self, agv_name: &str, frames: &[FeatureFrame]) -> Vec<LabelledFrame> {
        self.metrics.start_trajectory();
        let mut machine = FiniteAutomationMachine::new(self.config, self.thresholds);
        let mut labels = Vec::with_capacity(frames.len());

        for frame in frames {
            let outcome = machine.run(frame);
            self.metrics.record(&outcome);
            labels.push(LabelledFrame {
                agv_name: agv_name.to_string(),
                timestamp_id: frame.timestamp_id,
                state: outcome.state,
                admissible: outcome.admissible,
            });
        }

        info!(
            "🏁 {}: {} frames, final state {}",
            agv_name,
            frames.len(),
            machine.state_name()
        );
        labels
    }

    pub fn metrics(&self) -> &ClassificationMetrics {
        &self.metrics
    }
}

pub fn write_labels(path: &Path, labels: &[LabelledFrame]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for label in labels {
        let json_line = serde_json::to_string(label)?;
        writeln!(writer, "{}", json_line)?;
    }
    writer.flush()?;
    info!("💾 {} labels saved to {}", labels.len(), path.display());
    Ok(())
}
