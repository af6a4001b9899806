// src/pipeline/frame_source.rs
//
// Reads feature frames produced by the upstream feature pipeline: one JSON
// object per line, possibly interleaving several AGVs.

use crate::types::FeatureFrame;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const FRAME_EXTENSIONS: [&str; 2] = ["jsonl", "ndjson"];

pub fn find_frame_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        anyhow::bail!("Input directory {} does not exist", input_dir.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext))
        })
        .collect();
    files.sort();

    info!("Found {} frame files", files.len());
    Ok(files)
}

pub fn load_frames(path: &Path) -> Result<Vec<FeatureFrame>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read frame file {}", path.display()))?;
    let frames = parse_frames(&contents)
        .with_context(|| format!("Malformed frame file {}", path.display()))?;
    debug!("Loaded {} frames from {}", frames.len(), path.display());
    Ok(frames)
}

/// Speeds are finite differences against the previous row, so the first
/// row of every trajectory carries nulls there.
const SPEED_COLUMNS: [&str; 3] = ["User_speed", "User_speed_X", "User_speed_Y"];

/// Parse JSON lines into frames. Rows whose speeds are null have no motion
/// estimate yet and are skipped; any other undecodable line is an error.
pub fn parse_frames(contents: &str) -> Result<Vec<FeatureFrame>> {
    let mut frames = Vec::new();
    let mut skipped = 0usize;

    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row: serde_json::Value =
            serde_json::from_str(line).with_context(|| format!("line {}", idx + 1))?;
        if SPEED_COLUMNS
            .iter()
            .any(|column| row.get(column).is_some_and(|v| v.is_null()))
        {
            skipped += 1;
            continue;
        }
        let frame = serde_json::from_value(row).with_context(|| format!("line {}", idx + 1))?;
        frames.push(frame);
    }

    if skipped > 0 {
        debug!("Skipped {} rows without a speed estimate", skipped);
    }
    Ok(frames)
}

/// Split frames into per-AGV trajectories, keeping first-seen AGV order and
/// the input order within each trajectory.
pub fn group_by_agv(frames: Vec<FeatureFrame>) -> Vec<(String, Vec<FeatureFrame>)> {
    let mut groups: Vec<(String, Vec<FeatureFrame>)> = Vec::new();
    for frame in frames {
        match groups.iter_mut().find(|(name, _)| *name == frame.agv_name) {
            Some((_, trajectory)) => trajectory.push(frame),
            None => groups.push((frame.agv_name.clone(), vec![frame])),
        }
    }
    groups
}
