//! 2-D embedding backends for latent-space diagnostics.
//!
//! Both backends implement [`Reducer`] over row-major `f32` slices. The
//! exact solver is seeded and reproducible; the Barnes-Hut backend trades
//! reproducibility for speed on larger inputs.

mod barnes_hut;
mod exact;

pub use barnes_hut::{BarnesHutTsne, EMBEDDING_ARTIFACT};
pub use exact::ExactTsne;

use std::path::PathBuf;

use thiserror::Error;

/// Seed of the reproducible path when no explicit seed is given.
pub const DEFAULT_SEED: u64 = 0;

#[derive(Debug, Error, PartialEq)]
pub enum ReduceError {
    #[error("embedding input is empty")]
    Empty,
    #[error("data length {len} != n_points {n_points} * dims {dims}")]
    BadShape {
        len: usize,
        n_points: usize,
        dims: usize,
    },
    #[error("non-finite value at index {0}")]
    NonFinite(usize),
    #[error("perplexity must be positive, got {0}")]
    NonPositivePerplexity(f32),
    #[error("perplexity {perplexity} too large for {n_points} points (need n_points - 1 >= 3 * perplexity)")]
    Perplexity { perplexity: f32, n_points: usize },
    #[error("barnes-hut theta must be in (0, 1], got {0}")]
    Theta(f32),
    #[error("artifact io: {0}")]
    Io(String),
}

/// Contract for the 2-D embedding backends.
pub trait Reducer {
    /// Fit on `data` (row-major, `n_points` x `dims`) and return one 2-D
    /// point per input row.
    fn fit_transform(
        &mut self,
        data: &[f32],
        n_points: usize,
        dims: usize,
    ) -> Result<Vec<[f32; 2]>, ReduceError>;
}

/// Knobs shared by both t-SNE backends.
#[derive(Debug, Clone, Copy)]
pub struct TsneConfig {
    pub perplexity: f32,
    pub epochs: usize,
}

impl Default for TsneConfig {
    fn default() -> Self {
        Self {
            perplexity: 30.0,
            epochs: 1000,
        }
    }
}

/// Backend selection, resolved when the reducer is built rather than at
/// call time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backend {
    Exact { seed: u64 },
    BarnesHut { theta: f32 },
}

impl Backend {
    /// Maps the acceleration toggle. `false` always selects the seeded
    /// exact solver.
    pub fn for_flag(accelerated: bool) -> Self {
        if accelerated {
            Backend::BarnesHut { theta: 0.5 }
        } else {
            Backend::Exact { seed: DEFAULT_SEED }
        }
    }

    pub fn build(&self, config: TsneConfig, artifact_dir: Option<PathBuf>) -> Box<dyn Reducer> {
        match *self {
            Backend::Exact { seed } => Box::new(ExactTsne::from_config(config, seed)),
            Backend::BarnesHut { theta } => {
                let mut tsne = BarnesHutTsne::from_config(config, theta);
                tsne.artifact_dir = artifact_dir;
                Box::new(tsne)
            }
        }
    }
}

pub(crate) fn validate(
    data: &[f32],
    n_points: usize,
    dims: usize,
    perplexity: f32,
) -> Result<(), ReduceError> {
    if n_points == 0 || dims == 0 {
        return Err(ReduceError::Empty);
    }
    if data.len() != n_points * dims {
        return Err(ReduceError::BadShape {
            len: data.len(),
            n_points,
            dims,
        });
    }
    if let Some(idx) = data.iter().position(|v| !v.is_finite()) {
        return Err(ReduceError::NonFinite(idx));
    }
    if perplexity <= 0.0 {
        return Err(ReduceError::NonPositivePerplexity(perplexity));
    }
    if ((n_points - 1) as f32) < 3.0 * perplexity {
        return Err(ReduceError::Perplexity {
            perplexity,
            n_points,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_off_is_the_seeded_exact_backend() {
        assert_eq!(
            Backend::for_flag(false),
            Backend::Exact { seed: DEFAULT_SEED }
        );
    }

    #[test]
    fn flag_on_is_barnes_hut() {
        assert!(matches!(Backend::for_flag(true), Backend::BarnesHut { .. }));
    }

    #[test]
    fn validate_rejects_shape_mismatch() {
        let err = validate(&[0.0; 10], 4, 3, 1.0).unwrap_err();
        assert_eq!(
            err,
            ReduceError::BadShape {
                len: 10,
                n_points: 4,
                dims: 3
            }
        );
    }

    #[test]
    fn validate_rejects_non_finite() {
        let data = [0.0, f32::NAN, 1.0, 2.0];
        assert_eq!(validate(&data, 2, 2, 0.1), Err(ReduceError::NonFinite(1)));
    }

    #[test]
    fn validate_rejects_oversized_perplexity() {
        let data = vec![0.0f32; 12 * 2];
        let err = validate(&data, 12, 2, 30.0).unwrap_err();
        assert!(matches!(err, ReduceError::Perplexity { .. }));
    }

    #[test]
    fn validate_rejects_empty() {
        assert_eq!(validate(&[], 0, 2, 1.0), Err(ReduceError::Empty));
    }
}
