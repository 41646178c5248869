//! lalia latent-space diagnostics
//!
//! Client-side visualizers for a semi-supervised speech VAE: conditional
//! sample grids, ELBO training curves, and 2-D latent embeddings, rendered
//! either on a running visualization server or as static PNG files.
//!
//! ## Module Structure
//!
//! - `config` - session configuration (endpoint, environment, output dir)
//! - `client` - plot-server transports, payload types, errors
//! - `session` - explicit session owning the plot-handle registry
//! - `palette` - fixed 10-color qualitative class palette
//! - `samples` - conditional sample grids, one per evaluation class
//! - `curve` - ELBO training-curve rendering to PNG
//! - `embed` - latent-embedding scatters (server and PNG paths)

pub mod client;
pub mod config;
pub mod curve;
pub mod embed;
pub mod palette;
pub mod samples;
pub mod session;

pub use client::{
    HttpTransport, PlotRequest, PlotTransport, RecordingTransport, VizError, WindowId,
};
pub use config::VizConfig;
pub use session::VizSession;
