//! Evaluation checkpoint (`*.ckpt.json`) parsing.
//!
//! The trainer writes one checkpoint per evaluation pass: run metadata, the
//! ELBO history, and the encoder outputs (latent means plus one-hot labels)
//! for the evaluation split. The diagnostics binary consumes these instead
//! of re-running the model.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{LabelError, OneHotLabels};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Supervised-sample count the run was trained with.
    pub sup_num: f64,
    /// Encoder batch size used when the split was encoded.
    pub batch_size: usize,
    /// Epochs completed when the checkpoint was written.
    pub epochs_done: usize,
    pub latent_dim: usize,
    /// Per-epoch negative ELBO on the training split.
    pub train_elbo: Vec<f64>,
    /// Per-epoch negative ELBO on the evaluation split.
    pub test_elbo: Vec<f64>,
    /// Latent mean per evaluation sample, each row `latent_dim` long.
    pub latent_means: Vec<Vec<f32>>,
    /// One-hot label row per evaluation sample.
    pub labels: Vec<Vec<u8>>,
}

impl Checkpoint {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let ckpt: Self = serde_json::from_str(json).context("parse checkpoint json")?;
        ckpt.validate()?;
        Ok(ckpt)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let json = std::fs::read_to_string(path_ref)
            .with_context(|| format!("read {}", path_ref.display()))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.latent_dim > 0, "latent_dim must be > 0");
        anyhow::ensure!(!self.latent_means.is_empty(), "checkpoint has no latent means");
        for (row, mean) in self.latent_means.iter().enumerate() {
            anyhow::ensure!(
                mean.len() == self.latent_dim,
                "latent mean row {} has {} values, expected {}",
                row,
                mean.len(),
                self.latent_dim
            );
        }
        anyhow::ensure!(
            self.labels.len() == self.latent_means.len(),
            "{} label rows for {} latent means",
            self.labels.len(),
            self.latent_means.len()
        );
        anyhow::ensure!(
            self.train_elbo.len() == self.test_elbo.len(),
            "train elbo has {} epochs, test elbo has {}",
            self.train_elbo.len(),
            self.test_elbo.len()
        );
        Ok(())
    }

    /// Latent means flattened row-major, with the row width.
    pub fn flat_means(&self) -> (Vec<f32>, usize) {
        let mut flat = Vec::with_capacity(self.latent_means.len() * self.latent_dim);
        for mean in &self.latent_means {
            flat.extend_from_slice(mean);
        }
        (flat, self.latent_dim)
    }

    pub fn one_hot_labels(&self) -> Result<OneHotLabels, LabelError> {
        OneHotLabels::from_one_hot(&self.labels)
    }
}
