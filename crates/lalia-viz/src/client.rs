//! Plot-server client: transports, payload types, errors.
//!
//! The wire format is owned by the server; this module only shapes typed
//! payloads. One envelope per request: `POST {endpoint}/events` carrying
//! `{env, win?, kind, data, opts}`, with the window id as the response
//! body. The connectivity probe is `GET {endpoint}/ping`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::VizConfig;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("visualization server unreachable at {0}")]
    Unreachable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("server rejected plot ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("window {0} is gone on the server")]
    StaleWindow(String),

    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("drawing error: {0}")]
    Draw(String),

    #[error("model error: {0}")]
    Model(anyhow::Error),

    #[error("reduce error: {0}")]
    Reduce(#[from] lalia_reduce::ReduceError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub(crate) fn draw_err<E: fmt::Display>(e: E) -> VizError {
    VizError::Draw(e.to_string())
}

/// Opaque server-side window handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowId(String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    Scatter,
    Images,
}

/// Display options forwarded with a plot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlotOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markersize: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markercolor: Option<Vec<[u8; 3]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Vec<String>>,
}

/// Shape-tagged image, flattened row-major as channels x height x width.
#[derive(Debug, Clone, Serialize)]
pub struct ImageTensor {
    pub shape: [usize; 3],
    pub data: Vec<f32>,
}

impl ImageTensor {
    pub fn new(shape: [usize; 3], data: Vec<f32>) -> Result<Self, VizError> {
        let expected = shape[0] * shape[1] * shape[2];
        if data.len() != expected {
            return Err(VizError::Shape(format!(
                "image data has {} values, shape {:?} needs {}",
                data.len(),
                shape,
                expected
            )));
        }
        Ok(Self { shape, data })
    }
}

/// One plot submission: payload kind, data, display options.
#[derive(Debug, Clone, Serialize)]
pub struct PlotRequest {
    pub kind: PlotKind,
    pub data: Value,
    pub opts: PlotOpts,
}

impl PlotRequest {
    /// Scatter of 2-D points with per-point class indices. The server
    /// expects 1-based indices, zero is rejected here.
    pub fn scatter(
        points: &[[f32; 2]],
        classes: &[u32],
        opts: PlotOpts,
    ) -> Result<Self, VizError> {
        if points.is_empty() {
            return Err(VizError::Shape("scatter has no points".to_string()));
        }
        if points.len() != classes.len() {
            return Err(VizError::Shape(format!(
                "{} points but {} class indices",
                points.len(),
                classes.len()
            )));
        }
        if classes.contains(&0) {
            return Err(VizError::Shape(
                "scatter class indices are 1-based".to_string(),
            ));
        }
        Ok(Self {
            kind: PlotKind::Scatter,
            data: serde_json::json!({ "points": points, "classes": classes }),
            opts,
        })
    }

    /// Grid of images laid out `images_per_row` per row, with `padding`
    /// pixels between cells; rows follow from the image count.
    pub fn images(
        tensors: &[ImageTensor],
        images_per_row: usize,
        padding: u32,
        opts: PlotOpts,
    ) -> Result<Self, VizError> {
        if tensors.is_empty() {
            return Err(VizError::Shape("image grid has no images".to_string()));
        }
        if images_per_row == 0 {
            return Err(VizError::Shape("images_per_row must be > 0".to_string()));
        }
        Ok(Self {
            kind: PlotKind::Images,
            data: serde_json::json!({
                "tensors": tensors,
                "nrow": images_per_row,
                "padding": padding,
            }),
            opts,
        })
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    env: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    win: Option<&'a str>,
    kind: PlotKind,
    data: &'a Value,
    opts: &'a PlotOpts,
}

/// Server-facing side of a session. The HTTP transport talks to a live
/// plot server; [`RecordingTransport`] keeps everything in memory.
pub trait PlotTransport {
    /// Probe connectivity. Any transport failure reads as "down".
    fn ping(&mut self) -> bool;

    /// Create a new window and return its handle.
    fn create(&mut self, env: &str, request: &PlotRequest) -> Result<WindowId, VizError>;

    /// Update an existing window in place.
    fn update(
        &mut self,
        env: &str,
        window: &WindowId,
        request: &PlotRequest,
    ) -> Result<(), VizError>;
}

pub struct HttpTransport {
    endpoint: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(config: &VizConfig) -> Result<Self, VizError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VizError::Config(e.to_string()))?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            http,
        })
    }

    fn post_event(
        &self,
        env: &str,
        win: Option<&WindowId>,
        request: &PlotRequest,
    ) -> Result<WindowId, VizError> {
        let url = format!("{}/events", self.endpoint);
        let envelope = Envelope {
            env,
            win: win.map(|w| w.as_str()),
            kind: request.kind,
            data: &request.data,
            opts: &request.opts,
        };
        let response = self.http.post(&url).json(&envelope).send()?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(w) = win {
                return Err(VizError::StaleWindow(w.to_string()));
            }
        }
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(VizError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        let body = response.text()?;
        let id = body.trim();
        if id.is_empty() {
            return Err(VizError::Rejected {
                status: status.as_u16(),
                message: "empty window id".to_string(),
            });
        }
        Ok(WindowId::new(id))
    }
}

impl PlotTransport for HttpTransport {
    fn ping(&mut self) -> bool {
        let url = format!("{}/ping", self.endpoint);
        match self.http.get(&url).send() {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn create(&mut self, env: &str, request: &PlotRequest) -> Result<WindowId, VizError> {
        self.post_event(env, None, request)
    }

    fn update(
        &mut self,
        env: &str,
        window: &WindowId,
        request: &PlotRequest,
    ) -> Result<(), VizError> {
        self.post_event(env, Some(window), request).map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedAction {
    Created,
    Updated,
}

#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub action: RecordedAction,
    pub env: String,
    pub window: WindowId,
    pub kind: PlotKind,
    pub data: Value,
    pub opts: PlotOpts,
}

struct RecordingState {
    reachable: bool,
    fail_updates: bool,
    next_id: usize,
    events: Vec<RecordedEvent>,
}

/// In-memory transport for tests and offline runs. Clones share the same
/// recorded state, so a caller can keep one handle while the session owns
/// the other.
#[derive(Clone)]
pub struct RecordingTransport {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RecordingState {
                reachable: true,
                fail_updates: false,
                next_id: 0,
                events: Vec::new(),
            })),
        }
    }

    /// A transport whose ping always fails.
    pub fn unreachable() -> Self {
        let transport = Self::new();
        transport.state.lock().reachable = false;
        transport
    }

    /// Makes subsequent updates fail as stale windows.
    pub fn fail_updates(&self, fail: bool) {
        self.state.lock().fail_updates = fail;
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state.lock().events.clone()
    }

    pub fn created(&self) -> usize {
        self.state
            .lock()
            .events
            .iter()
            .filter(|e| e.action == RecordedAction::Created)
            .count()
    }

    pub fn updated(&self) -> usize {
        self.state
            .lock()
            .events
            .iter()
            .filter(|e| e.action == RecordedAction::Updated)
            .count()
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotTransport for RecordingTransport {
    fn ping(&mut self) -> bool {
        self.state.lock().reachable
    }

    fn create(&mut self, env: &str, request: &PlotRequest) -> Result<WindowId, VizError> {
        let mut state = self.state.lock();
        state.next_id += 1;
        let window = WindowId::new(format!("window_{}", state.next_id));
        state.events.push(RecordedEvent {
            action: RecordedAction::Created,
            env: env.to_string(),
            window: window.clone(),
            kind: request.kind,
            data: request.data.clone(),
            opts: request.opts.clone(),
        });
        Ok(window)
    }

    fn update(
        &mut self,
        env: &str,
        window: &WindowId,
        request: &PlotRequest,
    ) -> Result<(), VizError> {
        let mut state = self.state.lock();
        if state.fail_updates {
            return Err(VizError::StaleWindow(window.to_string()));
        }
        state.events.push(RecordedEvent {
            action: RecordedAction::Updated,
            env: env.to_string(),
            window: window.clone(),
            kind: request.kind,
            data: request.data.clone(),
            opts: request.opts.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_rejects_length_mismatch() {
        let err = PlotRequest::scatter(&[[0.0, 0.0]], &[1, 2], PlotOpts::default());
        assert!(matches!(err, Err(VizError::Shape(_))));
    }

    #[test]
    fn scatter_rejects_zero_based_classes() {
        let err = PlotRequest::scatter(&[[0.0, 0.0]], &[0], PlotOpts::default());
        assert!(matches!(err, Err(VizError::Shape(_))));
    }

    #[test]
    fn image_tensor_checks_flattened_length() {
        assert!(ImageTensor::new([1, 2, 2], vec![0.0; 4]).is_ok());
        assert!(matches!(
            ImageTensor::new([1, 2, 2], vec![0.0; 3]),
            Err(VizError::Shape(_))
        ));
    }

    #[test]
    fn envelope_omits_unset_fields() {
        let request =
            PlotRequest::scatter(&[[1.0, 2.0]], &[1], PlotOpts::default()).unwrap();
        let envelope = Envelope {
            env: "main",
            win: None,
            kind: request.kind,
            data: &request.data,
            opts: &request.opts,
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert!(value.get("win").is_none());
        assert_eq!(value["kind"], "scatter");
        assert!(value["opts"].get("title").is_none());
    }

    #[test]
    fn recording_transport_assigns_distinct_windows() {
        let mut transport = RecordingTransport::new();
        let request =
            PlotRequest::scatter(&[[1.0, 2.0]], &[1], PlotOpts::default()).unwrap();
        let a = transport.create("main", &request).unwrap();
        let b = transport.create("main", &request).unwrap();
        assert_ne!(a, b);
        assert_eq!(transport.created(), 2);
    }
}
