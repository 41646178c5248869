//! Session configuration.

use std::path::PathBuf;

use crate::client::VizError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8097";
pub const ENDPOINT_ENV: &str = "LALIA_VIZ_ENDPOINT";

/// Configuration for a visualization session.
#[derive(Debug, Clone)]
pub struct VizConfig {
    /// Plot-server endpoint.
    pub endpoint: String,
    /// Plot environment the windows are grouped under.
    pub env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Directory for file-based plots, created on connect.
    pub output_dir: PathBuf,
}

impl VizConfig {
    /// Builds a config for `output_dir`. The endpoint comes from
    /// `LALIA_VIZ_ENDPOINT` when set, the local default otherwise.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            endpoint: std::env::var(ENDPOINT_ENV)
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            env: "main".to_string(),
            timeout_secs: 30,
            output_dir: output_dir.into(),
        }
    }

    pub fn validate(&self) -> Result<(), VizError> {
        if self.endpoint.is_empty() {
            return Err(VizError::Config("endpoint cannot be empty".to_string()));
        }
        if self.env.is_empty() {
            return Err(VizError::Config("environment cannot be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(VizError::Config("timeout must be > 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = VizConfig::new("results");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_endpoint() {
        let mut config = VizConfig::new("results");
        config.endpoint.clear();
        assert!(matches!(config.validate(), Err(VizError::Config(_))));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = VizConfig::new("results");
        config.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(VizError::Config(_))));
    }
}
