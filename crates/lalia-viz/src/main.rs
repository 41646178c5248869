//! lalia-viz: latent-space diagnostics for a trained run.
//!
//! Loads an evaluation checkpoint, connects a visualization session, saves
//! the ELBO curve, and renders the 2-D embedding of the test-split latents.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lalia::params::CHECKPOINT_SUFFIX;
use lalia::Checkpoint;
use lalia_reduce::{Backend, TsneConfig};
use lalia_viz::curve::save_elbo_curve;
use lalia_viz::embed::{plot_latent_embedding, save_embedding_pngs};
use lalia_viz::{VizConfig, VizSession};
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(
    name = "lalia-viz",
    about = "Latent-space diagnostics for the lalia speech VAE"
)]
struct Args {
    /// Evaluation checkpoint (*.ckpt.json) to visualize.
    #[arg(long)]
    continue_from: Option<PathBuf>,

    /// Supervised-sample count the run was trained with.
    #[arg(long, default_value_t = 3000.0)]
    sup_num: f64,

    /// Encoder batch size the checkpoint was produced with.
    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    /// Use the accelerated (Barnes-Hut) embedding backend. The default is
    /// the seeded exact solver, reproducible across runs.
    #[arg(long)]
    accelerated: bool,

    /// Plot-server endpoint; overrides LALIA_VIZ_ENDPOINT and the default.
    #[arg(long)]
    endpoint: Option<String>,

    /// Output directory for file-based plots.
    #[arg(long, default_value = "results")]
    out_dir: PathBuf,

    /// Also write the per-class embedding PNGs.
    #[arg(long)]
    static_images: bool,

    /// t-SNE perplexity.
    #[arg(long, default_value_t = 30.0)]
    perplexity: f32,

    /// t-SNE gradient-descent epochs.
    #[arg(long, default_value_t = 1000)]
    epochs: usize,

    /// Log level: trace, debug, info, warn, error.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let ckpt_path = args
        .continue_from
        .context("nothing to visualize: pass --continue-from <run.ckpt.json>")?;
    if !ckpt_path.to_string_lossy().ends_with(CHECKPOINT_SUFFIX) {
        warn!(
            path = %ckpt_path.display(),
            "checkpoint path does not end in .{CHECKPOINT_SUFFIX}"
        );
    }
    let ckpt = Checkpoint::from_path(&ckpt_path)?;
    info!(
        path = %ckpt_path.display(),
        samples = ckpt.latent_means.len(),
        epochs_done = ckpt.epochs_done,
        "loaded checkpoint"
    );
    if ckpt.sup_num != args.sup_num {
        warn!(
            checkpoint = ckpt.sup_num,
            requested = args.sup_num,
            "sup-num differs from the checkpoint"
        );
    }
    if ckpt.batch_size != args.batch_size {
        warn!(
            checkpoint = ckpt.batch_size,
            requested = args.batch_size,
            "batch-size differs from the checkpoint"
        );
    }

    let mut config = VizConfig::new(&args.out_dir);
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    let mut session = VizSession::connect(&config)?;

    if !ckpt.test_elbo.is_empty() {
        let path = save_elbo_curve(session.output_dir(), &ckpt.train_elbo, &ckpt.test_elbo)?;
        info!(path = %path.display(), "elbo curve written");
    }

    let tsne = TsneConfig {
        perplexity: args.perplexity,
        epochs: args.epochs,
    };
    let backend = Backend::for_flag(args.accelerated);
    let mut reducer = backend.build(tsne, Some(args.out_dir.join("tsne")));

    let labels = ckpt.one_hot_labels()?;
    let (flat, dims) = ckpt.flat_means();
    let embedding =
        plot_latent_embedding(&mut session, reducer.as_mut(), &flat, dims, &labels)?;

    if args.static_images {
        let written = save_embedding_pngs(session.output_dir(), &embedding, &labels)?;
        info!(files = written.len(), "static embedding images written");
    }

    println!(
        "visualized {} latent vectors from {}",
        embedding.len(),
        ckpt_path.display()
    );
    Ok(())
}
