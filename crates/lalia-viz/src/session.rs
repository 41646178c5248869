//! Visualization session: transport, plot-handle registry, output directory.
//!
//! The session is an explicitly constructed object; nothing here is process
//! global, so tests and parallel runs can hold independent sessions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::client::{HttpTransport, PlotRequest, PlotTransport, VizError, WindowId};
use crate::config::VizConfig;

pub struct VizSession {
    transport: Box<dyn PlotTransport>,
    env: String,
    windows: HashMap<String, WindowId>,
    output_dir: PathBuf,
}

impl std::fmt::Debug for VizSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VizSession")
            .field("env", &self.env)
            .field("windows", &self.windows)
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

impl VizSession {
    /// Connects to the plot server and prepares the output directory.
    /// Unreachable server is fatal; there is no retry.
    pub fn connect(config: &VizConfig) -> Result<Self, VizError> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        Self::with_transport(Box::new(transport), config)
    }

    /// Builds a session over an arbitrary transport, for offline runs and
    /// tests with [`RecordingTransport`](crate::RecordingTransport).
    pub fn with_transport(
        mut transport: Box<dyn PlotTransport>,
        config: &VizConfig,
    ) -> Result<Self, VizError> {
        config.validate()?;
        if !transport.ping() {
            return Err(VizError::Unreachable(config.endpoint.clone()));
        }
        std::fs::create_dir_all(&config.output_dir)?;
        info!(
            endpoint = %config.endpoint,
            out_dir = %config.output_dir.display(),
            "visualization session ready"
        );
        Ok(Self {
            transport,
            env: config.env.clone(),
            windows: HashMap::new(),
            output_dir: config.output_dir.clone(),
        })
    }

    /// Directory file-based plots are written into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether a window handle is registered under `name`.
    pub fn has_window(&self, name: &str) -> bool {
        self.windows.contains_key(name)
    }

    /// Submits `request` under `name`: updates the registered window when one
    /// exists, creates one otherwise. An update failure surfaces as an error
    /// and the handle stays registered, so a genuine server problem is never
    /// papered over by a fresh create.
    pub fn plot(&mut self, name: &str, request: &PlotRequest) -> Result<(), VizError> {
        if let Some(window) = self.windows.get(name) {
            debug!(plot = name, window = %window, "updating plot");
            self.transport.update(&self.env, window, request)
        } else {
            let window = self.transport.create(&self.env, request)?;
            debug!(plot = name, window = %window, "created plot");
            self.windows.insert(name.to_string(), window);
            Ok(())
        }
    }

    /// Drops the handle registered under `name`; the next plot call creates a
    /// fresh window. Deliberate recovery path after a stale-window error.
    pub fn forget(&mut self, name: &str) -> Option<WindowId> {
        self.windows.remove(name)
    }
}
