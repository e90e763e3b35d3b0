//! Append-only run output: the per-step time series and the run ledger.
//!
//! One `StepRecord` row is emitted per shape per recorded step, matching the
//! long-format series of the original field study. Rows accumulate in memory
//! and, when a path is configured, stream to a CSV file that is flushed at
//! every record so a crashed run still leaves usable data on disk.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::SimError;
use crate::geometry::Depression;

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: u64,
    pub time: f64,
    /// Depressions seeded into the run at time zero.
    pub seeded: usize,
    /// Depressions alive at this step, after merging.
    pub count: usize,
    pub area: f64,
    pub perimeter: f64,
}

pub struct Recorder {
    seeded: usize,
    rows: Vec<StepRecord>,
    writer: Option<csv::Writer<File>>,
}

impl Recorder {
    /// Recorder that only accumulates rows in memory.
    pub fn in_memory(seeded: usize) -> Self {
        Self {
            seeded,
            rows: Vec::new(),
            writer: None,
        }
    }

    /// Recorder that also streams rows to a CSV file.
    pub fn with_csv(seeded: usize, path: impl AsRef<Path>) -> Result<Self, SimError> {
        let writer = csv::Writer::from_path(path.as_ref())?;
        Ok(Self {
            seeded,
            rows: Vec::new(),
            writer: Some(writer),
        })
    }

    pub fn record(
        &mut self,
        step: u64,
        time: f64,
        shapes: &[Depression],
    ) -> Result<(), SimError> {
        for shape in shapes {
            let row = StepRecord {
                step,
                time,
                seeded: self.seeded,
                count: shapes.len(),
                area: shape.area(),
                perimeter: shape.perimeter(),
            };
            if let Some(writer) = self.writer.as_mut() {
                writer.serialize(&row)?;
            }
            self.rows.push(row);
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    pub fn rows(&self) -> &[StepRecord] {
        &self.rows
    }
}

/// Append-only index of runs, one tab-separated line per run.
///
/// Replaces the original's global index file: the ledger is an explicit
/// object owned by the driver and passed to whoever starts a run.
pub struct RunLedger {
    path: PathBuf,
}

impl RunLedger {
    const HEADER: &'static str = "sim_name\tn\tk\tc\tdt\tmerge\n";

    /// Opens (creating if needed) the ledger file, writing the header once.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SimError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            std::fs::write(&path, Self::HEADER)?;
        }
        Ok(Self { path })
    }

    pub fn append(&self, scenario: &crate::scenario::Scenario) -> Result<(), SimError> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(
            file,
            "{}\t{}\t{}\t{}\t{}\t{}",
            scenario.name,
            scenario.initial_count,
            scenario.growth.scale_factor,
            scenario.growth.rate,
            scenario.growth.dt,
            scenario.merge_enabled
        )?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
