use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
  #[error("delivery strategy is not available")]
  Unavailable,
  #[error("no async runtime to deliver on")]
  NoRuntime,
  #[error("delivery queue is closed")]
  Closed,
  #[error("transport: {0}")]
  Transport(String),
  #[error("endpoint answered with status {0}")]
  Status(u16),
}

/// Where tracking payloads end up.
#[async_trait]
pub trait HttpSink: Send + Sync {
  async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<(), DeliveryError>;
}

/// Posts with `surf`.
#[derive(Debug, Clone, Default)]
pub struct SurfSink {
  client: surf::Client,
}

#[async_trait]
impl HttpSink for SurfSink {
  async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<(), DeliveryError> {
    let response = self
      .client
      .post(url)
      .body_bytes(body)
      .content_type(surf::http::mime::JSON)
      .await
      .map_err(|e| DeliveryError::Transport(e.to_string()))?;
    let status = response.status();
    if status.is_success() {
      Ok(())
    } else {
      Err(DeliveryError::Status(status.into()))
    }
  }
}

/// A way of handing a payload over without waiting for it to arrive.
pub trait DeliveryStrategy: Send + Sync {
  /// Accepts `body` for delivery. An `Ok` only means the payload was handed over.
  ///
  /// # Errors
  /// Fails when the strategy cannot take the payload at all.
  fn dispatch(&self, body: Vec<u8>) -> Result<(), DeliveryError>;
}

/// Queues payloads to a detached worker that outlives the caller. The worker stops once every
/// handle is dropped and the queue is drained.
#[derive(Debug, Clone)]
pub struct BeaconSender {
  queue: Option<UnboundedSender<Vec<u8>>>,
}

impl BeaconSender {
  /// Starts the worker on the current tokio runtime. Without a runtime the beacon is unavailable.
  #[must_use]
  pub fn spawn(url: String, sink: Arc<dyn HttpSink>) -> Self {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
      return Self::unavailable();
    };
    let (sender, mut receiver) = unbounded_channel::<Vec<u8>>();
    handle.spawn(async move {
      while let Some(body) = receiver.recv().await {
        if let Err(e) = sink.post_json(&url, body).await {
          log::warn!("Tracking beacon failed: {e}");
        }
      }
    });
    Self {
      queue: Some(sender),
    }
  }

  #[must_use]
  pub fn unavailable() -> Self {
    Self { queue: None }
  }
}

impl DeliveryStrategy for BeaconSender {
  fn dispatch(&self, body: Vec<u8>) -> Result<(), DeliveryError> {
    self
      .queue
      .as_ref()
      .ok_or(DeliveryError::Unavailable)?
      .send(body)
      .map_err(|_| DeliveryError::Closed)
  }
}

/// Spawns one request per payload.
#[derive(Clone)]
pub struct RequestSender {
  url: String,
  sink: Arc<dyn HttpSink>,
}

impl RequestSender {
  #[must_use]
  pub fn new(url: String, sink: Arc<dyn HttpSink>) -> Self {
    Self { url, sink }
  }
}

impl DeliveryStrategy for RequestSender {
  fn dispatch(&self, body: Vec<u8>) -> Result<(), DeliveryError> {
    let handle = tokio::runtime::Handle::try_current().map_err(|_| DeliveryError::NoRuntime)?;
    let url = self.url.clone();
    let sink = Arc::clone(&self.sink);
    handle.spawn(async move {
      if let Err(e) = sink.post_json(&url, body).await {
        log::warn!("Tracking request failed: {e}");
      }
    });
    Ok(())
  }
}

/// Tries the primary strategy and falls back to the secondary one. Never reports failure.
pub struct BestEffortSender {
  primary: Box<dyn DeliveryStrategy>,
  fallback: Box<dyn DeliveryStrategy>,
}

impl BestEffortSender {
  #[must_use]
  pub fn new(primary: Box<dyn DeliveryStrategy>, fallback: Box<dyn DeliveryStrategy>) -> Self {
    Self { primary, fallback }
  }

  /// Beacon first, a plain request otherwise, both posting to `url` through `sink`.
  #[must_use]
  pub fn to_endpoint(url: &str, sink: Arc<dyn HttpSink>) -> Self {
    Self::new(
      Box::new(BeaconSender::spawn(url.to_string(), Arc::clone(&sink))),
      Box::new(RequestSender::new(url.to_string(), sink)),
    )
  }

  pub fn send<T: Serialize>(&self, payload: &T) {
    let body = match serde_json::to_vec(payload) {
      Ok(body) => body,
      Err(e) => {
        log::error!("Cannot serialize tracking payload: {e}");
        return;
      }
    };
    if let Err(e) = self.primary.dispatch(body.clone()) {
      log::debug!("Beacon unavailable ({e}), falling back to a request");
      if let Err(e) = self.fallback.dispatch(body) {
        log::warn!("Tracking dropped: {e}");
      }
    }
  }
}
