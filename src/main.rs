// src/main.rs

use anyhow::{Context, Result};
use pedestrian_fam::pipeline::{
    find_frame_files, group_by_agv, load_frames, write_labels, TrajectoryRunner,
};
use pedestrian_fam::Config;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    let config = if Path::new(&config_path).exists() {
        Some(Config::load(&config_path)?)
    } else {
        None
    };
    let loaded = config.is_some();
    let config = config.unwrap_or_default();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pedestrian_fam={}", config.logging.level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🚶 Pedestrian Behavior Classifier Starting");
    if loaded {
        info!("✓ Configuration loaded from {}", config_path);
    } else {
        warn!("{} not found, using defaults", config_path);
    }
    info!(
        "Thresholds: walk_stay={:.2}, close_to_station={:.1}m, error_flag_size={}",
        config.thresholds.walk_stay,
        config.thresholds.close_to_station,
        config.classifier.error_flag_size
    );

    let input_dir = PathBuf::from(&config.io.input_dir);
    let output_dir = PathBuf::from(&config.io.output_dir);
    let files = find_frame_files(&input_dir)?;
    if files.is_empty() {
        error!("No frame files found in {}", input_dir.display());
        return Ok(());
    }
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut runner = TrajectoryRunner::new(config.classifier, config.thresholds);

    for (idx, path) in files.iter().enumerate() {
        info!("\n========================================");
        info!("Processing file {}/{}: {}", idx + 1, files.len(), path.display());
        info!("========================================\n");

        let frames = match load_frames(path) {
            Ok(frames) => frames,
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                continue;
            }
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("frames");

        let mut labels = Vec::with_capacity(frames.len());
        for (agv_name, trajectory) in group_by_agv(frames) {
            labels.extend(runner.classify(&agv_name, &trajectory));
        }

        let out_path = output_dir.join(format!("{}_states.jsonl", stem));
        write_labels(&out_path, &labels)?;
    }

    let summary = runner.metrics().summary();
    info!("\n📊 Classification summary");
    info!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
