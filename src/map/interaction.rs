//! Resolves what a click or a hover on the map refers to when symbols overlap.
//!
//! Layers are tested in a fixed priority order and the first non-empty layer wins: clusters, then
//! schools, then instructors. A school therefore always shadows an instructor drawn at the same
//! spot.

use itertools::Itertools;

use super::coordinates::{ScreenPoint, WGS84Coordinate};
use super::engine::{ClusterFeature, MapEngine, PointFeature, RenderedFeature, Tooltip};
use super::style::{ClusterAggregate, LayerId};

/// An interactive layer group, in the order hits are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitLayer {
  Cluster,
  School,
  Instructor,
}

impl HitLayer {
  pub const PRIORITY: [HitLayer; 3] = [HitLayer::Cluster, HitLayer::School, HitLayer::Instructor];

  /// Engine layers queried for this group.
  #[must_use]
  pub fn layers(&self) -> &'static [LayerId] {
    match self {
      HitLayer::Cluster => &[LayerId::Clusters, LayerId::ClusterCount],
      HitLayer::School => &[LayerId::EcolePoints],
      HitLayer::Instructor => &[LayerId::MoniteurPoints],
    }
  }

  fn test<E: MapEngine + ?Sized>(self, engine: &E, point: ScreenPoint) -> Option<Hit> {
    let features = engine.query_rendered_features(point, self.layers());
    match self {
      HitLayer::Cluster => features.into_iter().find_map(|f| match f {
        RenderedFeature::Cluster(cluster) => Some(Hit::Cluster(cluster)),
        RenderedFeature::Point(_) => None,
      }),
      HitLayer::School | HitLayer::Instructor => features.into_iter().find_map(|f| match f {
        RenderedFeature::Point(point) => Some(Hit::Point(self, point)),
        RenderedFeature::Cluster(_) => None,
      }),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
enum Hit {
  Cluster(ClusterFeature),
  Point(HitLayer, PointFeature),
}

/// The topmost hit under `point`.
fn resolve<E: MapEngine + ?Sized>(engine: &E, point: ScreenPoint) -> Option<Hit> {
  HitLayer::PRIORITY
    .iter()
    .find_map(|layer| layer.test(engine, point))
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
  /// Ease to the cluster so that it splits apart.
  ExpandCluster { center: WGS84Coordinate, zoom: f64 },
  /// A cluster was hit but the engine could not tell its expansion zoom.
  ClusterUnresolved,
  /// A location pin was hit. `zoom` is never below the configured selection zoom.
  Select {
    layer: HitLayer,
    code: u32,
    center: WGS84Coordinate,
    zoom: f64,
  },
  /// Nothing interactive under the pointer.
  Dismiss,
}

/// Resolves a click at `point`. `select_zoom` is the minimum zoom to ease to for a selected pin.
pub fn resolve_click<E: MapEngine + ?Sized>(
  engine: &E,
  point: ScreenPoint,
  select_zoom: f64,
) -> ClickOutcome {
  match resolve(engine, point) {
    Some(Hit::Cluster(cluster)) => match engine.cluster_expansion_zoom(cluster.cluster_id) {
      Ok(zoom) => ClickOutcome::ExpandCluster {
        center: cluster.coordinate,
        zoom,
      },
      Err(e) => {
        log::warn!("Cannot expand cluster: {e}");
        ClickOutcome::ClusterUnresolved
      }
    },
    Some(Hit::Point(layer, feature)) => ClickOutcome::Select {
      layer,
      code: feature.properties.code,
      center: feature.coordinate,
      zoom: engine.zoom().max(select_zoom),
    },
    None => ClickOutcome::Dismiss,
  }
}

/// Tooltip for a hover at `point`, if anything interactive is there.
pub fn resolve_hover<E: MapEngine + ?Sized>(engine: &E, point: ScreenPoint) -> Option<Tooltip> {
  match resolve(engine, point)? {
    Hit::Cluster(cluster) => Some(Tooltip {
      coordinate: cluster.coordinate,
      text: cluster_breakdown(&cluster.aggregate),
    }),
    Hit::Point(_, feature) => Some(Tooltip {
      coordinate: feature.coordinate,
      text: feature.properties.name,
    }),
  }
}

fn count_clause(count: u32, singular: &str, plural: &str) -> Option<String> {
  match count {
    0 => None,
    1 => Some(format!("1 {singular}")),
    n => Some(format!("{n} {plural}")),
  }
}

/// E.g. `3 écoles, 1 moniteur`. Clauses with a zero count are left out.
#[must_use]
pub fn cluster_breakdown(aggregate: &ClusterAggregate) -> String {
  [
    count_clause(aggregate.ecole_count, "école", "écoles"),
    count_clause(aggregate.moniteur_count, "moniteur", "moniteurs"),
  ]
  .into_iter()
  .flatten()
  .join(", ")
}

/// Holds the single tooltip that may be open on the map.
#[derive(Debug, Default)]
pub struct TooltipSlot {
  current: Option<Tooltip>,
}

impl TooltipSlot {
  /// Shows `tooltip`, closing the previous one first.
  pub fn open<E: MapEngine + ?Sized>(&mut self, engine: &mut E, tooltip: Tooltip) {
    self.dismiss(engine);
    engine.show_popup(&tooltip);
    self.current = Some(tooltip);
  }

  pub fn dismiss<E: MapEngine + ?Sized>(&mut self, engine: &mut E) {
    if self.current.take().is_some() {
      engine.remove_popup();
    }
  }

  #[must_use]
  pub fn current(&self) -> Option<&Tooltip> {
    self.current.as_ref()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::map::coordinates::GeoBounds;
  use crate::map::engine::EngineError;
  use crate::map::feature_collection::{FeatureProperties, RenderedDataset};
  use crate::map::markers::MarkerImage;
  use serde_json::Value;

  /// Reports a fixed set of features per layer, wherever the pointer is.
  #[derive(Default)]
  struct StackedEngine {
    hits: Vec<(LayerId, RenderedFeature)>,
    expansion: Option<f64>,
    zoom: f64,
    popups: Vec<String>,
    removed: usize,
  }

  impl MapEngine for StackedEngine {
    fn add_image(&mut self, _key: &str, _image: &MarkerImage) {}
    fn add_source(&mut self, _id: &str, _spec: &Value, _data: &RenderedDataset) {}
    fn add_layer(&mut self, _layer: LayerId, _spec: &Value) {}
    fn set_data(&mut self, _source: &str, _data: &RenderedDataset) -> Result<(), EngineError> {
      Ok(())
    }
    fn query_rendered_features(
      &self,
      _point: ScreenPoint,
      layers: &[LayerId],
    ) -> Vec<RenderedFeature> {
      self
        .hits
        .iter()
        .filter(|(layer, _)| layers.contains(layer))
        .map(|(_, f)| f.clone())
        .collect()
    }
    fn cluster_expansion_zoom(&self, cluster_id: u64) -> Result<f64, EngineError> {
      self.expansion.ok_or(EngineError::UnknownCluster(cluster_id))
    }
    fn zoom(&self) -> f64 {
      self.zoom
    }
    fn ease_to(&mut self, _center: WGS84Coordinate, _zoom: f64) {}
    fn fit_bounds(&mut self, _bounds: &GeoBounds) {}
    fn show_popup(&mut self, tooltip: &Tooltip) {
      self.popups.push(tooltip.text.clone());
    }
    fn remove_popup(&mut self) {
      self.removed += 1;
    }
    fn show_user_location(&mut self, _position: WGS84Coordinate) {}
  }

  const HERE: WGS84Coordinate = WGS84Coordinate {
    lat: 45.19,
    lon: 5.72,
  };

  fn point(code: u32, name: &str, ecole: u8) -> RenderedFeature {
    RenderedFeature::Point(PointFeature {
      coordinate: HERE,
      properties: FeatureProperties {
        code,
        name: name.to_string(),
        ecole,
        ..FeatureProperties::default()
      },
    })
  }

  fn cluster() -> RenderedFeature {
    RenderedFeature::Cluster(ClusterFeature {
      cluster_id: 42,
      coordinate: HERE,
      aggregate: ClusterAggregate::new(1, 19),
    })
  }

  fn stacked() -> StackedEngine {
    StackedEngine {
      hits: vec![
        (LayerId::MoniteurPoints, point(2, "Léa Martin", 0)),
        (LayerId::EcolePoints, point(1, "École Vercors", 1)),
        (LayerId::Clusters, cluster()),
      ],
      expansion: Some(11.),
      zoom: 6.,
      ..StackedEngine::default()
    }
  }

  #[test]
  fn cluster_wins_over_everything() {
    let engine = stacked();
    assert_eq!(
      resolve_click(&engine, ScreenPoint::default(), 12.),
      ClickOutcome::ExpandCluster {
        center: HERE,
        zoom: 11.
      }
    );
  }

  #[test]
  fn cluster_label_counts_as_cluster_hit() {
    let engine = StackedEngine {
      hits: vec![(LayerId::ClusterCount, cluster())],
      expansion: Some(9.),
      ..StackedEngine::default()
    };
    assert!(matches!(
      resolve_click(&engine, ScreenPoint::default(), 12.),
      ClickOutcome::ExpandCluster { .. }
    ));
  }

  #[test]
  fn failed_expansion_is_a_no_op() {
    let mut engine = stacked();
    engine.expansion = None;
    assert_eq!(
      resolve_click(&engine, ScreenPoint::default(), 12.),
      ClickOutcome::ClusterUnresolved
    );
  }

  #[test]
  fn school_wins_over_instructor() {
    let mut engine = stacked();
    engine.hits.retain(|(layer, _)| *layer != LayerId::Clusters);
    assert_eq!(
      resolve_click(&engine, ScreenPoint::default(), 12.),
      ClickOutcome::Select {
        layer: HitLayer::School,
        code: 1,
        center: HERE,
        zoom: 12.
      }
    );
    assert_eq!(
      resolve_hover(&engine, ScreenPoint::default()).map(|t| t.text),
      Some("École Vercors".to_string())
    );
  }

  #[test]
  fn instructor_alone_is_selected_and_zoom_is_kept_when_higher() {
    let mut engine = stacked();
    engine.hits.retain(|(layer, _)| *layer == LayerId::MoniteurPoints);
    engine.zoom = 14.;
    assert_eq!(
      resolve_click(&engine, ScreenPoint::default(), 12.),
      ClickOutcome::Select {
        layer: HitLayer::Instructor,
        code: 2,
        center: HERE,
        zoom: 14.
      }
    );
  }

  #[test]
  fn empty_map_dismisses() {
    let engine = StackedEngine::default();
    assert_eq!(
      resolve_click(&engine, ScreenPoint::default(), 12.),
      ClickOutcome::Dismiss
    );
    assert_eq!(resolve_hover(&engine, ScreenPoint::default()), None);
  }

  #[test]
  fn cluster_hover_shows_breakdown() {
    let engine = stacked();
    assert_eq!(
      resolve_hover(&engine, ScreenPoint::default()).map(|t| t.text),
      Some("1 école, 19 moniteurs".to_string())
    );
  }

  #[test]
  fn breakdown_omits_zero_counts() {
    assert_eq!(cluster_breakdown(&ClusterAggregate::new(3, 0)), "3 écoles");
    assert_eq!(cluster_breakdown(&ClusterAggregate::new(0, 1)), "1 moniteur");
    assert_eq!(cluster_breakdown(&ClusterAggregate::new(2, 5)), "2 écoles, 5 moniteurs");
  }

  #[test]
  fn one_tooltip_at_a_time() {
    let mut engine = StackedEngine::default();
    let mut slot = TooltipSlot::default();
    let tooltip = |text: &str| Tooltip {
      coordinate: HERE,
      text: text.to_string(),
    };

    slot.open(&mut engine, tooltip("a"));
    assert_eq!(engine.removed, 0);
    slot.open(&mut engine, tooltip("b"));
    assert_eq!(engine.removed, 1);
    assert_eq!(slot.current().map(|t| t.text.as_str()), Some("b"));

    slot.dismiss(&mut engine);
    slot.dismiss(&mut engine);
    assert_eq!(engine.removed, 2);
    assert!(slot.current().is_none());
    assert_eq!(engine.popups, vec!["a", "b"]);
  }
}
