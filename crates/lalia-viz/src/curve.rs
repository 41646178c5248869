//! ELBO training-curve rendering to a static PNG.

use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use crate::client::{draw_err, VizError};

pub const ELBO_CURVE_FILE: &str = "test_elbo_vae.png";

const CANVAS: (u32, u32) = (1500, 500);

/// Table of (epoch, negated test-ELBO) rows, epochs 0..K-1.
pub fn elbo_table(test_elbo: &[f64]) -> Vec<(usize, f64)> {
    test_elbo.iter().enumerate().map(|(e, &v)| (e, -v)).collect()
}

/// Renders the per-epoch test-ELBO curve as a combined scatter-and-line
/// chart and writes [`ELBO_CURVE_FILE`] into `output_dir`, replacing any
/// previous file. Returns the written path.
///
/// The training sequence is accepted and length-checked but not plotted;
/// the chart keeps the two-column schema (epoch index, negated test ELBO).
/// The drawing backend is scoped to this call, no figure state survives it.
pub fn save_elbo_curve(
    output_dir: &Path,
    train_elbo: &[f64],
    test_elbo: &[f64],
) -> Result<PathBuf, VizError> {
    if test_elbo.is_empty() {
        return Err(VizError::Shape("elbo curve is empty".to_string()));
    }
    if train_elbo.len() != test_elbo.len() {
        return Err(VizError::Shape(format!(
            "train elbo has {} epochs, test elbo has {}",
            train_elbo.len(),
            test_elbo.len()
        )));
    }

    let table = elbo_table(test_elbo);
    let path = output_dir.join(ELBO_CURVE_FILE);
    {
        let root = BitMapBackend::new(&path, CANVAS).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let (y_min, y_max) = table
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, v)| {
                (lo.min(v), hi.max(v))
            });
        let pad = ((y_max - y_min) * 0.05).max(1.0);
        let x_max = (table.len() - 1).max(1) as f64;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..x_max, (y_min - pad)..(y_max + pad))
            .map_err(draw_err)?;
        chart
            .configure_mesh()
            .x_desc("Training Epoch")
            .y_desc("Test ELBO")
            .draw()
            .map_err(draw_err)?;
        chart
            .draw_series(LineSeries::new(
                table.iter().map(|&(e, v)| (e as f64, v)),
                &BLUE,
            ))
            .map_err(draw_err)?;
        chart
            .draw_series(
                table
                    .iter()
                    .map(|&(e, v)| Circle::new((e as f64, v), 3, BLUE.filled())),
            )
            .map_err(draw_err)?;
        root.present().map_err(draw_err)?;
    }
    info!(path = %path.display(), epochs = table.len(), "saved elbo curve");
    Ok(path)
}
