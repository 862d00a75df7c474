//! Checkpoint persistence.
//!
//! A checkpoint is a self-contained JSON snapshot of a run: configuration,
//! evolutionary state, Pareto-front history, and the random stream. Saving
//! goes through a sibling temp file and an atomic rename so an interrupted
//! write never corrupts the previous checkpoint.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use chrono::{DateTime, Utc};
use evoctl_gp::Individual;
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::runner::GpRunner;

/// Error saving or loading a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("checkpoint serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk snapshot of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub saved_at: DateTime<Utc>,
    pub runner: GpRunner,
    /// The shared random stream, captured mid-run.
    pub rng: Pcg64Mcg,
    /// Hall-of-fame snapshot after every generation.
    pub pareto_fronts: Vec<Vec<Individual>>,
    pub initialized: bool,
}

impl Checkpoint {
    /// Writes the checkpoint to `path`, replacing any previous file.
    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        let tmp = path.with_extension("tmp");
        {
            let file = File::create(&tmp)?;
            serde_json::to_writer(BufWriter::new(file), self)?;
        }
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Loads a checkpoint written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self, CheckpointError> {
        let file = File::open(path)?;
        let checkpoint = serde_json::from_reader(BufReader::new(file))?;
        Ok(checkpoint)
    }
}
