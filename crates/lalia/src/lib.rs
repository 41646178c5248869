//! lalia core data model
//!
//! Shared types for the lalia semi-supervised speech VAE pipeline:
//! the fixed parameter table, one-hot label handling for the evaluation
//! split, and the evaluation-checkpoint artifact written by the trainer.
//!
//! ## Module Structure
//!
//! - `params` - fixed parameters of the feature pipeline and model
//! - `data` - one-hot labels and evaluation-split containers
//! - `checkpoint` - `*.ckpt.json` evaluation artifacts

pub mod checkpoint;
pub mod data;
pub mod params;

pub use checkpoint::Checkpoint;
pub use data::{one_hot, DataSplit, LabelError, OneHotLabels};
