//! Exact t-SNE with a seeded initialization.
//!
//! O(n^2) per epoch, sized for diagnostic inputs where reproducibility
//! matters more than speed. The schedule follows the reference gradient
//! descent: early exaggeration, a momentum switch, and per-dimension gain
//! adaptation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::{validate, ReduceError, Reducer, TsneConfig, DEFAULT_SEED};

const EARLY_EXAGGERATION: f32 = 12.0;
const EXAGGERATION_EPOCHS: usize = 250;
const MOMENTUM_SWITCH_EPOCH: usize = 250;
const INITIAL_MOMENTUM: f32 = 0.5;
const FINAL_MOMENTUM: f32 = 0.8;
const MIN_GAIN: f32 = 0.01;
const MIN_PROB: f32 = 1e-12;

pub struct ExactTsne {
    pub perplexity: f32,
    pub epochs: usize,
    pub learning_rate: f32,
    pub seed: u64,
}

impl ExactTsne {
    pub fn new(seed: u64) -> Self {
        Self::from_config(TsneConfig::default(), seed)
    }

    pub fn from_config(config: TsneConfig, seed: u64) -> Self {
        Self {
            perplexity: config.perplexity,
            epochs: config.epochs,
            learning_rate: 200.0,
            seed,
        }
    }
}

impl Default for ExactTsne {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl Reducer for ExactTsne {
    fn fit_transform(
        &mut self,
        data: &[f32],
        n_points: usize,
        dims: usize,
    ) -> Result<Vec<[f32; 2]>, ReduceError> {
        validate(data, n_points, dims, self.perplexity)?;
        let n = n_points;

        let mut p = joint_probabilities(data, n, dims, self.perplexity);
        for v in p.iter_mut() {
            *v *= EARLY_EXAGGERATION;
        }
        let stop_lying = EXAGGERATION_EPOCHS.min(self.epochs / 2);
        let momentum_switch = MOMENTUM_SWITCH_EPOCH.min(self.epochs / 2);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut y = vec![0.0f32; n * 2];
        for v in y.iter_mut() {
            let z: f32 = rng.sample(StandardNormal);
            *v = 1e-4 * z;
        }

        let mut dy = vec![0.0f32; n * 2];
        let mut gains = vec![1.0f32; n * 2];
        let mut grad = vec![0.0f32; n * 2];
        let mut num = vec![0.0f32; n * n];

        for epoch in 0..self.epochs {
            // Student-t numerators and their sum over all pairs.
            let mut z_sum = 0.0f32;
            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = y[2 * i] - y[2 * j];
                    let dv = y[2 * i + 1] - y[2 * j + 1];
                    let t = 1.0 / (1.0 + dx * dx + dv * dv);
                    num[i * n + j] = t;
                    num[j * n + i] = t;
                    z_sum += 2.0 * t;
                }
            }
            let z_sum = z_sum.max(MIN_PROB);

            grad.fill(0.0);
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let t = num[i * n + j];
                    let q = (t / z_sum).max(MIN_PROB);
                    let mult = 4.0 * (p[i * n + j] - q) * t;
                    grad[2 * i] += mult * (y[2 * i] - y[2 * j]);
                    grad[2 * i + 1] += mult * (y[2 * i + 1] - y[2 * j + 1]);
                }
            }

            let momentum = if epoch < momentum_switch {
                INITIAL_MOMENTUM
            } else {
                FINAL_MOMENTUM
            };
            for k in 0..n * 2 {
                let same_sign = (grad[k] > 0.0) == (dy[k] > 0.0);
                gains[k] = if same_sign {
                    (gains[k] * 0.8).max(MIN_GAIN)
                } else {
                    gains[k] + 0.2
                };
                dy[k] = momentum * dy[k] - self.learning_rate * gains[k] * grad[k];
                y[k] += dy[k];
            }

            let mut cx = 0.0f32;
            let mut cy = 0.0f32;
            for i in 0..n {
                cx += y[2 * i];
                cy += y[2 * i + 1];
            }
            cx /= n as f32;
            cy /= n as f32;
            for i in 0..n {
                y[2 * i] -= cx;
                y[2 * i + 1] -= cy;
            }

            if epoch + 1 == stop_lying {
                for v in p.iter_mut() {
                    *v /= EARLY_EXAGGERATION;
                }
            }
        }

        Ok((0..n).map(|i| [y[2 * i], y[2 * i + 1]]).collect())
    }
}

/// Symmetrized joint probabilities. The per-row precision is found by
/// binary search so every conditional distribution hits the target entropy
/// `ln(perplexity)`.
fn joint_probabilities(data: &[f32], n: usize, dims: usize, perplexity: f32) -> Vec<f32> {
    let mut d2 = vec![0.0f32; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let a = &data[i * dims..(i + 1) * dims];
            let b = &data[j * dims..(j + 1) * dims];
            let dist: f32 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
            d2[i * n + j] = dist;
            d2[j * n + i] = dist;
        }
    }

    let target_entropy = perplexity.ln();
    let mut cond = vec![0.0f32; n * n];
    let mut row = vec![0.0f32; n];

    for i in 0..n {
        let mut beta = 1.0f32;
        let mut beta_min = f32::NEG_INFINITY;
        let mut beta_max = f32::INFINITY;

        for _ in 0..50 {
            let mut sum = 0.0f32;
            for j in 0..n {
                row[j] = if i == j {
                    0.0
                } else {
                    (-beta * d2[i * n + j]).exp()
                };
                sum += row[j];
            }
            let sum = sum.max(MIN_PROB);
            let mut dot = 0.0f32;
            for j in 0..n {
                dot += d2[i * n + j] * row[j];
            }
            let entropy = sum.ln() + beta * dot / sum;

            let diff = entropy - target_entropy;
            if diff.abs() < 1e-5 {
                break;
            }
            if diff > 0.0 {
                beta_min = beta;
                beta = if beta_max.is_finite() {
                    (beta + beta_max) / 2.0
                } else {
                    beta * 2.0
                };
            } else {
                beta_max = beta;
                beta = if beta_min.is_finite() {
                    (beta + beta_min) / 2.0
                } else {
                    beta / 2.0
                };
            }
        }

        let sum: f32 = row.iter().sum::<f32>().max(MIN_PROB);
        for j in 0..n {
            cond[i * n + j] = row[j] / sum;
        }
    }

    let mut joint = vec![0.0f32; n * n];
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            joint[i * n + j] =
                ((cond[i * n + j] + cond[j * n + i]) / (2.0 * n as f32)).max(MIN_PROB);
        }
    }
    joint
}
