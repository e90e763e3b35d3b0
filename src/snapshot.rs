//! Periodic JSON checkpoints of the full population geometry.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::geometry::Depression;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub step: u64,
    pub time: f64,
    pub timestamp: String,
    pub count: usize,
}

/// A full, reloadable snapshot of the population at one step.
#[derive(Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub meta: CheckpointMetadata,
    pub shapes: Vec<Depression>,
}

pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval_steps: u64,
}

impl SnapshotWriter {
    /// `interval_steps == 0` disables periodic snapshots entirely.
    pub fn new(output_dir: impl AsRef<Path>, interval_steps: u64) -> Result<Self, SimError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            interval_steps,
        })
    }

    pub fn should_snapshot(&self, step: u64) -> bool {
        self.interval_steps != 0 && step % self.interval_steps == 0
    }

    pub fn maybe_write(
        &self,
        step: u64,
        time: f64,
        shapes: &[Depression],
    ) -> Result<Option<PathBuf>, SimError> {
        if !self.should_snapshot(step) {
            return Ok(None);
        }
        self.write(step, time, shapes).map(Some)
    }

    /// Unconditionally writes a checkpoint, e.g. at termination.
    pub fn write(&self, step: u64, time: f64, shapes: &[Depression]) -> Result<PathBuf, SimError> {
        let checkpoint = Checkpoint {
            meta: CheckpointMetadata {
                step,
                time,
                timestamp: chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string(),
                count: shapes.len(),
            },
            shapes: shapes.to_vec(),
        };
        let path = self.output_dir.join(format!("step_{step:08}.json"));
        let json = serde_json::to_string(&checkpoint)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Checkpoint, SimError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
