//! Barnes-Hut t-SNE via the `bhtsne` crate.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::{validate, ReduceError, Reducer, TsneConfig};

/// Name of the embedding artifact written into the artifact directory.
pub const EMBEDDING_ARTIFACT: &str = "embedding.csv";

/// Accelerated backend. Not seeded; repeated runs may differ, which is why
/// the reproducible path uses [`ExactTsne`](crate::ExactTsne) instead.
pub struct BarnesHutTsne {
    /// Accuracy/memory trade-off in (0, 1]; smaller is closer to exact.
    pub theta: f32,
    pub perplexity: f32,
    pub epochs: usize,
    /// When set, the final embedding is also written there as CSV.
    pub artifact_dir: Option<PathBuf>,
}

impl BarnesHutTsne {
    pub fn new(theta: f32) -> Self {
        Self::from_config(TsneConfig::default(), theta)
    }

    pub fn from_config(config: TsneConfig, theta: f32) -> Self {
        Self {
            theta,
            perplexity: config.perplexity,
            epochs: config.epochs,
            artifact_dir: None,
        }
    }

    fn write_artifact(&self, dir: &Path, points: &[[f32; 2]]) -> Result<(), ReduceError> {
        fs::create_dir_all(dir).map_err(|e| ReduceError::Io(e.to_string()))?;
        let path = dir.join(EMBEDDING_ARTIFACT);
        let mut csv = String::with_capacity(points.len() * 16);
        for p in points {
            csv.push_str(&format!("{},{}\n", p[0], p[1]));
        }
        fs::write(&path, csv).map_err(|e| ReduceError::Io(e.to_string()))?;
        info!("wrote embedding artifact to {}", path.display());
        Ok(())
    }
}

impl Reducer for BarnesHutTsne {
    fn fit_transform(
        &mut self,
        data: &[f32],
        n_points: usize,
        dims: usize,
    ) -> Result<Vec<[f32; 2]>, ReduceError> {
        validate(data, n_points, dims, self.perplexity)?;
        if !(self.theta > 0.0 && self.theta <= 1.0) {
            return Err(ReduceError::Theta(self.theta));
        }

        let samples: Vec<&[f32]> = data.chunks(dims).collect();
        let mut tsne = bhtsne::tSNE::new(&samples);
        tsne.embedding_dim(2)
            .perplexity(self.perplexity)
            .epochs(self.epochs)
            .barnes_hut(self.theta, |a, b| {
                a.iter()
                    .zip(b.iter())
                    .map(|(x, y)| (x - y).powi(2))
                    .sum::<f32>()
                    .sqrt()
            });
        let flat = tsne.embedding();
        debug_assert_eq!(flat.len(), n_points * 2);
        let points: Vec<[f32; 2]> = flat.chunks_exact(2).map(|c| [c[0], c[1]]).collect();

        if let Some(dir) = &self.artifact_dir {
            self.write_artifact(dir, &points)?;
        }
        Ok(points)
    }
}
