//! Conditional sample grids, one per evaluation class.

use lalia::data::one_hot;
use lalia::params::{FRAMES_PER_UTTERANCE, FREQ_BINS, NUM_EVAL_CLASSES, SPEC_CHANNELS};
use tracing::info;

use crate::client::{ImageTensor, PlotOpts, PlotRequest, VizError};
use crate::session::VizSession;

pub const SAMPLES_PER_CLASS: usize = 100;
pub const IMAGES_PER_ROW: usize = 10;
pub const GRID_PADDING: u32 = 2;

/// Upstream generative model: one decoder-mean draw for a conditioning
/// vector, flattened to the spectrogram image shape.
pub trait ConditionalSampler {
    fn sample(&self, conditioning: &[f32]) -> anyhow::Result<Vec<f32>>;
}

/// Draws [`SAMPLES_PER_CLASS`] conditional samples for each evaluation class
/// and submits each batch as one grid plot named `samples_class_{c}`, laid
/// out [`IMAGES_PER_ROW`] per row. Display-only; nothing is written to disk.
pub fn plot_sample_grids<S: ConditionalSampler>(
    session: &mut VizSession,
    sampler: &S,
) -> Result<(), VizError> {
    let shape = [SPEC_CHANNELS, FREQ_BINS, FRAMES_PER_UTTERANCE];
    for class in 0..NUM_EVAL_CLASSES {
        let conditioning = one_hot(class, NUM_EVAL_CLASSES);
        let mut tensors = Vec::with_capacity(SAMPLES_PER_CLASS);
        for _ in 0..SAMPLES_PER_CLASS {
            let sample = sampler.sample(&conditioning).map_err(VizError::Model)?;
            tensors.push(ImageTensor::new(shape, sample)?);
        }
        let opts = PlotOpts {
            title: Some(format!("samples for class {class}")),
            ..PlotOpts::default()
        };
        let request = PlotRequest::images(&tensors, IMAGES_PER_ROW, GRID_PADDING, opts)?;
        session.plot(&format!("samples_class_{class}"), &request)?;
        info!(class, n = SAMPLES_PER_CLASS, "submitted sample grid");
    }
    Ok(())
}
