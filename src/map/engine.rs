use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use super::coordinates::{GeoBounds, ScreenPoint, WGS84Coordinate};
use super::feature_collection::{FeatureProperties, RenderedDataset};
use super::markers::MarkerImage;
use super::style::{ClusterAggregate, LayerId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
  #[error("unknown cluster {0}")]
  UnknownCluster(u64),
  #[error("unknown source '{0}'")]
  UnknownSource(String),
  #[error("map engine: {0}")]
  Engine(String),
}

/// A cluster as reported by a rendered-feature query.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterFeature {
  pub cluster_id: u64,
  pub coordinate: WGS84Coordinate,
  pub aggregate: ClusterAggregate,
}

/// A single location as reported by a rendered-feature query.
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
  pub coordinate: WGS84Coordinate,
  pub properties: FeatureProperties,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedFeature {
  Cluster(ClusterFeature),
  Point(PointFeature),
}

/// A small popup anchored at a map position.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
  pub coordinate: WGS84Coordinate,
  pub text: String,
}

/// The rendering engine that draws the map. Clustering, projection and hit geometry live behind
/// this boundary.
pub trait MapEngine {
  fn add_image(&mut self, key: &str, image: &MarkerImage);

  fn add_source(&mut self, id: &str, spec: &Value, data: &RenderedDataset);

  fn add_layer(&mut self, layer: LayerId, spec: &Value);

  /// Replaces the whole data of a source.
  ///
  /// # Errors
  /// Fails when the source was never added.
  fn set_data(&mut self, source: &str, data: &RenderedDataset) -> Result<(), EngineError>;

  /// Features drawn under `point` on any of `layers`, topmost first.
  fn query_rendered_features(&self, point: ScreenPoint, layers: &[LayerId])
  -> Vec<RenderedFeature>;

  /// Zoom at which the cluster splits apart.
  ///
  /// # Errors
  /// Fails when the engine cannot resolve the cluster.
  fn cluster_expansion_zoom(&self, cluster_id: u64) -> Result<f64, EngineError>;

  fn zoom(&self) -> f64;

  fn ease_to(&mut self, center: WGS84Coordinate, zoom: f64);

  fn fit_bounds(&mut self, bounds: &GeoBounds);

  fn show_popup(&mut self, tooltip: &Tooltip);

  fn remove_popup(&mut self);

  fn show_user_location(&mut self, position: WGS84Coordinate);
}

/// An engine without a screen. It keeps what it is given and never reports features under a point.
#[derive(Debug, Default)]
pub struct HeadlessEngine {
  images: HashMap<String, (u32, u32)>,
  sources: HashMap<String, RenderedDataset>,
  layers: Vec<LayerId>,
  center: WGS84Coordinate,
  zoom: f64,
  popup: Option<Tooltip>,
  user_location: Option<WGS84Coordinate>,
}

impl HeadlessEngine {
  #[must_use]
  pub fn new(center: WGS84Coordinate, zoom: f64) -> Self {
    Self {
      center,
      zoom,
      ..Self::default()
    }
  }

  #[must_use]
  pub fn image_size(&self, key: &str) -> Option<(u32, u32)> {
    self.images.get(key).copied()
  }

  #[must_use]
  pub fn source(&self, id: &str) -> Option<&RenderedDataset> {
    self.sources.get(id)
  }

  #[must_use]
  pub fn layers(&self) -> &[LayerId] {
    &self.layers
  }

  #[must_use]
  pub fn center(&self) -> WGS84Coordinate {
    self.center
  }

  #[must_use]
  pub fn popup(&self) -> Option<&Tooltip> {
    self.popup.as_ref()
  }

  #[must_use]
  pub fn user_location(&self) -> Option<WGS84Coordinate> {
    self.user_location
  }
}

impl MapEngine for HeadlessEngine {
  fn add_image(&mut self, key: &str, image: &MarkerImage) {
    self
      .images
      .insert(key.to_string(), (image.width, image.height));
  }

  fn add_source(&mut self, id: &str, _spec: &Value, data: &RenderedDataset) {
    self.sources.insert(id.to_string(), data.clone());
  }

  fn add_layer(&mut self, layer: LayerId, _spec: &Value) {
    self.layers.push(layer);
  }

  fn set_data(&mut self, source: &str, data: &RenderedDataset) -> Result<(), EngineError> {
    let current = self
      .sources
      .get_mut(source)
      .ok_or_else(|| EngineError::UnknownSource(source.to_string()))?;
    *current = data.clone();
    Ok(())
  }

  fn query_rendered_features(
    &self,
    _point: ScreenPoint,
    _layers: &[LayerId],
  ) -> Vec<RenderedFeature> {
    Vec::new()
  }

  fn cluster_expansion_zoom(&self, cluster_id: u64) -> Result<f64, EngineError> {
    Err(EngineError::UnknownCluster(cluster_id))
  }

  fn zoom(&self) -> f64 {
    self.zoom
  }

  fn ease_to(&mut self, center: WGS84Coordinate, zoom: f64) {
    self.center = center;
    self.zoom = zoom;
  }

  fn fit_bounds(&mut self, bounds: &GeoBounds) {
    self.center = bounds.center();
  }

  fn show_popup(&mut self, tooltip: &Tooltip) {
    self.popup = Some(tooltip.clone());
  }

  fn remove_popup(&mut self) {
    self.popup = None;
  }

  fn show_user_location(&mut self, position: WGS84Coordinate) {
    self.user_location = Some(position);
  }
}
