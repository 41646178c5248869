//! Latent-embedding scatters: interactive server plots and the static PNG
//! alternative.

use std::path::{Path, PathBuf};

use lalia::data::{DataSplit, OneHotLabels};
use lalia::params::NUM_EVAL_CLASSES;
use lalia_reduce::Reducer;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::client::{draw_err, PlotOpts, PlotRequest, VizError};
use crate::palette::{class_color, CLASS_COLORS};
use crate::session::VizSession;

const MARKER_SIZE: u32 = 4;
const COMBINED_CANVAS: u32 = 800;
const PNG_CANVAS: (u32, u32) = (800, 800);

/// Latent statistics returned by the upstream encoder for a batch.
pub struct LatentStats {
    pub means: Vec<Vec<f32>>,
    pub sigmas: Vec<Vec<f32>>,
}

/// Upstream encoder over the evaluation split.
pub trait LatentEncoder {
    fn encode(
        &self,
        inputs: &[Vec<f32>],
        labels: &OneHotLabels,
        batch_size: usize,
    ) -> anyhow::Result<LatentStats>;
}

/// Reduces `latents` (row-major, one row per label) to 2-D and submits one
/// scatter per non-empty class (`z_tsne_class_{c}`) plus the combined
/// 800x800 view (`z_tsne`). Returns the embedding, one 2-D point per row.
///
/// Classes with zero rows are skipped; the server rejects empty scatters.
pub fn plot_latent_embedding(
    session: &mut VizSession,
    reducer: &mut dyn Reducer,
    latents: &[f32],
    dims: usize,
    labels: &OneHotLabels,
) -> Result<Vec<[f32; 2]>, VizError> {
    let n = labels.n_samples();
    if dims == 0 || latents.len() != n * dims {
        return Err(VizError::Shape(format!(
            "{} latent values for {} samples of dim {}",
            latents.len(),
            n,
            dims
        )));
    }
    info!(n, dims, "computing 2-D embedding of latent vectors");
    let embedding = reducer.fit_transform(latents, n, dims)?;

    for class in 0..NUM_EVAL_CLASSES {
        let rows = labels.indices_of_class(class);
        if rows.is_empty() {
            debug!(class, "no samples, skipping class scatter");
            continue;
        }
        let points: Vec<[f32; 2]> = rows.iter().map(|&i| embedding[i]).collect();
        let classes = vec![(class + 1) as u32; points.len()];
        let opts = PlotOpts {
            title: Some(format!("z tsne class {class}")),
            markersize: Some(MARKER_SIZE),
            markercolor: Some(vec![class_color(class)]),
            legend: Some(vec![class.to_string()]),
            ..PlotOpts::default()
        };
        let request = PlotRequest::scatter(&points, &classes, opts)?;
        session.plot(&format!("z_tsne_class_{class}"), &request)?;
    }

    let classes: Vec<u32> = (0..n).map(|i| (labels.class_of(i) + 1) as u32).collect();
    let opts = PlotOpts {
        title: Some("z tsne".to_string()),
        width: Some(COMBINED_CANVAS),
        height: Some(COMBINED_CANVAS),
        markersize: Some(MARKER_SIZE),
        markercolor: Some(CLASS_COLORS.to_vec()),
        legend: Some((0..NUM_EVAL_CLASSES).map(|c| c.to_string()).collect()),
    };
    let request = PlotRequest::scatter(&embedding, &classes, opts)?;
    session.plot("z_tsne", &request)?;

    Ok(embedding)
}

/// Static alternative to [`plot_latent_embedding`]: per non-empty class a
/// `z_embedding_{c}.png` scatter, plus the combined `z_embedding_all.png`
/// with a legend, colored by a categorical palette indexed by class number.
/// Returns the written paths.
pub fn save_embedding_pngs(
    output_dir: &Path,
    embedding: &[[f32; 2]],
    labels: &OneHotLabels,
) -> Result<Vec<PathBuf>, VizError> {
    if embedding.len() != labels.n_samples() {
        return Err(VizError::Shape(format!(
            "{} embedding rows but {} label rows",
            embedding.len(),
            labels.n_samples()
        )));
    }
    let (x_range, y_range) = padded_bounds(embedding);
    let mut written = Vec::new();

    for class in 0..NUM_EVAL_CLASSES {
        let rows = labels.indices_of_class(class);
        if rows.is_empty() {
            debug!(class, "no samples, skipping class image");
            continue;
        }
        let path = output_dir.join(format!("z_embedding_{class}.png"));
        {
            let root = BitMapBackend::new(&path, PNG_CANVAS).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;
            let mut chart = ChartBuilder::on(&root)
                .caption(format!("class {class}"), ("sans-serif", 24))
                .margin(20)
                .x_label_area_size(30)
                .y_label_area_size(40)
                .build_cartesian_2d(x_range.clone(), y_range.clone())
                .map_err(draw_err)?;
            chart.configure_mesh().draw().map_err(draw_err)?;
            let color = Palette99::pick(class);
            chart
                .draw_series(rows.iter().map(|&i| {
                    Circle::new(
                        (embedding[i][0], embedding[i][1]),
                        3,
                        color.filled(),
                    )
                }))
                .map_err(draw_err)?;
            root.present().map_err(draw_err)?;
        }
        written.push(path);
    }

    let path = output_dir.join("z_embedding_all.png");
    {
        let root = BitMapBackend::new(&path, PNG_CANVAS).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let mut chart = ChartBuilder::on(&root)
            .caption("latent embedding", ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_err)?;
        chart.configure_mesh().draw().map_err(draw_err)?;
        for class in 0..NUM_EVAL_CLASSES {
            let rows = labels.indices_of_class(class);
            if rows.is_empty() {
                continue;
            }
            let color = Palette99::pick(class);
            chart
                .draw_series(rows.iter().map(|&i| {
                    Circle::new(
                        (embedding[i][0], embedding[i][1]),
                        3,
                        color.filled(),
                    )
                }))
                .map_err(draw_err)?
                .label(class.to_string())
                .legend(move |(x, y)| Circle::new((x, y), 3, color.filled()));
        }
        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(draw_err)?;
        root.present().map_err(draw_err)?;
    }
    written.push(path);

    info!(files = written.len(), "saved embedding images");
    Ok(written)
}

/// Runs the upstream encoder over the evaluation split, flattens the latent
/// means, and renders their embedding. The original top-level diagnostic.
pub fn visualize_test_latents<E: LatentEncoder>(
    session: &mut VizSession,
    reducer: &mut dyn Reducer,
    encoder: &E,
    split: &DataSplit,
    batch_size: usize,
) -> Result<Vec<[f32; 2]>, VizError> {
    let stats = encoder
        .encode(&split.data, &split.labels, batch_size)
        .map_err(VizError::Model)?;
    let dims = stats.means.first().map(|m| m.len()).unwrap_or(0);
    let mut flat = Vec::with_capacity(stats.means.len() * dims);
    for (row, mean) in stats.means.iter().enumerate() {
        if mean.len() != dims {
            return Err(VizError::Shape(format!(
                "latent mean row {} has {} values, expected {}",
                row,
                mean.len(),
                dims
            )));
        }
        flat.extend_from_slice(mean);
    }
    plot_latent_embedding(session, reducer, &flat, dims, &split.labels)
}

fn padded_bounds(
    embedding: &[[f32; 2]],
) -> (std::ops::Range<f32>, std::ops::Range<f32>) {
    let mut x_min = f32::INFINITY;
    let mut x_max = f32::NEG_INFINITY;
    let mut y_min = f32::INFINITY;
    let mut y_max = f32::NEG_INFINITY;
    for p in embedding {
        x_min = x_min.min(p[0]);
        x_max = x_max.max(p[0]);
        y_min = y_min.min(p[1]);
        y_max = y_max.max(p[1]);
    }
    let x_pad = ((x_max - x_min) * 0.05).max(1.0);
    let y_pad = ((y_max - y_min) * 0.05).max(1.0);
    (
        (x_min - x_pad)..(x_max + x_pad),
        (y_min - y_pad)..(y_max + y_pad),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{RecordingTransport, VizError};
    use crate::config::VizConfig;
    use lalia_reduce::ExactTsne;
    use lalia_reduce::TsneConfig;

    struct EchoEncoder;

    impl LatentEncoder for EchoEncoder {
        fn encode(
            &self,
            inputs: &[Vec<f32>],
            _labels: &OneHotLabels,
            _batch_size: usize,
        ) -> anyhow::Result<LatentStats> {
            Ok(LatentStats {
                means: inputs.to_vec(),
                sigmas: vec![vec![1.0; inputs[0].len()]; inputs.len()],
            })
        }
    }

    fn session_over(transport: &RecordingTransport) -> (tempfile::TempDir, VizSession) {
        let dir = tempfile::tempdir().unwrap();
        let config = VizConfig::new(dir.path());
        let session =
            VizSession::with_transport(Box::new(transport.clone()), &config).unwrap();
        (dir, session)
    }

    fn reducer() -> ExactTsne {
        ExactTsne::from_config(
            TsneConfig {
                perplexity: 2.0,
                epochs: 30,
            },
            0,
        )
    }

    fn latents(n: usize, dims: usize) -> Vec<f32> {
        (0..n * dims)
            .map(|i| ((i * 31 + 5) % 19) as f32 * 0.1)
            .collect()
    }

    #[test]
    fn one_scatter_per_nonempty_class_plus_combined() {
        let transport = RecordingTransport::new();
        let (_dir, mut session) = session_over(&transport);
        // 12 samples over classes 0..2 only.
        let labels =
            OneHotLabels::from_indices(&[0, 1, 2, 0, 1, 2, 0, 1, 2, 0, 1, 2], 10).unwrap();
        let embedding = plot_latent_embedding(
            &mut session,
            &mut reducer(),
            &latents(12, 4),
            4,
            &labels,
        )
        .unwrap();

        assert_eq!(embedding.len(), 12);
        // 3 class scatters + 1 combined, empty classes skipped.
        assert_eq!(transport.created(), 4);
        assert!(session.has_window("z_tsne"));
        assert!(session.has_window("z_tsne_class_0"));
        assert!(!session.has_window("z_tsne_class_9"));

        let combined = transport.events().pop().unwrap();
        assert_eq!(combined.opts.width, Some(800));
        assert_eq!(combined.opts.height, Some(800));
        assert_eq!(combined.opts.legend.as_ref().unwrap().len(), 10);
    }

    #[test]
    fn rejects_latent_label_row_mismatch() {
        let transport = RecordingTransport::new();
        let (_dir, mut session) = session_over(&transport);
        let labels = OneHotLabels::from_indices(&[0, 1], 10).unwrap();
        let err = plot_latent_embedding(
            &mut session,
            &mut reducer(),
            &latents(12, 4),
            4,
            &labels,
        )
        .unwrap_err();
        assert!(matches!(err, VizError::Shape(_)));
    }

    #[test]
    fn reducer_failure_propagates() {
        let transport = RecordingTransport::new();
        let (_dir, mut session) = session_over(&transport);
        // Perplexity too large for 12 points.
        let mut tsne = ExactTsne::from_config(
            TsneConfig {
                perplexity: 30.0,
                epochs: 30,
            },
            0,
        );
        let labels = OneHotLabels::from_indices(&[0; 12], 10).unwrap();
        let err =
            plot_latent_embedding(&mut session, &mut tsne, &latents(12, 4), 4, &labels)
                .unwrap_err();
        assert!(matches!(err, VizError::Reduce(_)));
    }

    #[test]
    fn encoder_output_feeds_the_embedding() {
        let transport = RecordingTransport::new();
        let (_dir, mut session) = session_over(&transport);
        let data: Vec<Vec<f32>> = (0..12)
            .map(|i| (0..4).map(|d| ((i * 4 + d) % 7) as f32).collect())
            .collect();
        let labels = OneHotLabels::from_indices(&[0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1], 10)
            .unwrap();
        let split = DataSplit::new(data, labels).unwrap();

        let embedding = visualize_test_latents(
            &mut session,
            &mut reducer(),
            &EchoEncoder,
            &split,
            4,
        )
        .unwrap();
        assert_eq!(embedding.len(), 12);
        // 2 class scatters + combined.
        assert_eq!(transport.created(), 3);
    }
}
