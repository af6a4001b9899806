// src/pipeline/mod.rs

pub mod frame_source;
pub mod metrics;
pub mod runner;

pub use frame_source::{find_frame_files, group_by_agv, load_frames, parse_frames};
pub use metrics::{ClassificationMetrics, MetricsSummary};
pub use runner::{write_labels, LabelledFrame, TrajectoryRunner};
