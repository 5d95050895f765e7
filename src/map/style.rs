//! Source and layer declarations handed to the map engine, written in its expression language.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::markers::{ClusterPalette, ClusterTier, Pin};

pub const SOURCE_ID: &str = "locations";

/// Clustering parameters of the `locations` source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
  pub max_zoom: u8,
  pub radius: u32,
}

impl Default for ClusterOptions {
  fn default() -> Self {
    Self {
      max_zoom: 13,
      radius: 55,
    }
  }
}

/// Per-cluster reductions: how many members are schools and how many are instructors.
#[must_use]
pub fn cluster_properties() -> Value {
  json!({
    "ecoleCount": ["+", ["case", ["==", ["get", "ecole"], 1], 1, 0]],
    "moniteurCount": ["+", ["case", ["==", ["get", "ecole"], 0], 1, 0]],
  })
}

/// The clustered `GeoJSON` source, without its data.
#[must_use]
pub fn source_spec(options: ClusterOptions) -> Value {
  json!({
    "type": "geojson",
    "cluster": true,
    "clusterMaxZoom": options.max_zoom,
    "clusterRadius": options.radius,
    "clusterProperties": cluster_properties(),
  })
}

/// The layers this map declares, in the order they are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerId {
  Clusters,
  ClusterCount,
  MoniteurPoints,
  EcolePoints,
}

impl LayerId {
  #[must_use]
  pub fn all() -> &'static [LayerId] {
    &[
      LayerId::Clusters,
      LayerId::ClusterCount,
      LayerId::MoniteurPoints,
      LayerId::EcolePoints,
    ]
  }

  #[must_use]
  pub fn name(&self) -> &'static str {
    match self {
      LayerId::Clusters => "clusters",
      LayerId::ClusterCount => "cluster-count",
      LayerId::MoniteurPoints => "moniteur-points",
      LayerId::EcolePoints => "ecole-points",
    }
  }

  /// Draw order among point symbols; lower keys are drawn on top.
  #[must_use]
  pub fn sort_key(&self) -> Option<u8> {
    match self {
      LayerId::EcolePoints => Some(0),
      LayerId::MoniteurPoints => Some(1),
      LayerId::Clusters | LayerId::ClusterCount => None,
    }
  }

  /// Full layer declaration.
  #[must_use]
  pub fn spec(&self) -> Value {
    let base = json!({
      "id": self.name(),
      "type": "symbol",
      "source": SOURCE_ID,
    });
    let rest = match self {
      LayerId::Clusters => json!({
        "filter": ["has", "point_count"],
        "layout": {
          "icon-image": badge_expression(),
          "icon-allow-overlap": true,
          "icon-size": 1,
        },
      }),
      LayerId::ClusterCount => json!({
        "filter": ["has", "point_count"],
        "layout": {
          "text-field": "{point_count_abbreviated}",
          "text-font": ["DIN Pro Bold", "Arial Unicode MS Bold"],
          "text-size": text_size_expression(),
          "text-allow-overlap": true,
          "text-offset": [0, 0.05],
        },
        "paint": {
          "text-color": ["case", has_school(), "#3a2800", "#fff"],
          "text-halo-color": ["case", has_school(), "rgba(255,215,0,0.4)", "rgba(0,0,0,0.2)"],
          "text-halo-width": 1,
        },
      }),
      LayerId::MoniteurPoints => point_layer(Pin::Moniteur, 0, 1, None),
      LayerId::EcolePoints => point_layer(Pin::Ecole, 1, 0, Some("source")),
    };
    merge(base, rest)
  }
}

fn merge(mut base: Value, rest: Value) -> Value {
  if let (Value::Object(base), Value::Object(rest)) = (&mut base, rest) {
    base.extend(rest);
  }
  base
}

fn has_school() -> Value {
  json!([">=", ["get", "ecoleCount"], 1])
}

fn point_layer(pin: Pin, ecole: u8, sort_key: u8, z_order: Option<&str>) -> Value {
  let mut layout = json!({
    "icon-image": pin.key(),
    "icon-size": 1,
    "icon-allow-overlap": true,
    "icon-anchor": "bottom",
    "symbol-sort-key": sort_key,
  });
  if let (Some(z_order), Value::Object(map)) = (z_order, &mut layout) {
    map.insert("symbol-z-order".to_string(), json!(z_order));
  }
  json!({
    "filter": ["all", ["!", ["has", "point_count"]], ["==", ["get", "ecole"], ecole]],
    "layout": layout,
  })
}

/// `step` over `point_count`, choosing gold or blue inside every tier.
fn badge_expression() -> Value {
  let choose = |tier: ClusterTier| {
    json!([
      "case",
      has_school(),
      ClusterPalette::Gold.key(tier),
      ClusterPalette::Blue.key(tier)
    ])
  };
  let mut expr = vec![json!("step"), json!(["get", "point_count"]), choose(ClusterTier::Sm)];
  for (threshold, tier) in ClusterTier::THRESHOLDS.iter().zip(&ClusterTier::all()[1..]) {
    expr.push(json!(threshold));
    expr.push(choose(*tier));
  }
  Value::Array(expr)
}

fn text_size_expression() -> Value {
  let mut expr = vec![
    json!("step"),
    json!(["get", "point_count"]),
    json!(ClusterTier::Sm.text_size()),
  ];
  for (threshold, tier) in ClusterTier::THRESHOLDS.iter().zip(&ClusterTier::all()[1..]) {
    expr.push(json!(threshold));
    expr.push(json!(tier.text_size()));
  }
  Value::Array(expr)
}

/// What the engine computes for every cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClusterAggregate {
  pub point_count: u32,
  #[serde(rename = "ecoleCount")]
  pub ecole_count: u32,
  #[serde(rename = "moniteurCount")]
  pub moniteur_count: u32,
}

impl ClusterAggregate {
  #[must_use]
  pub fn new(ecole_count: u32, moniteur_count: u32) -> Self {
    Self {
      point_count: ecole_count + moniteur_count,
      ecole_count,
      moniteur_count,
    }
  }

  #[must_use]
  pub fn tier(&self) -> ClusterTier {
    ClusterTier::for_point_count(self.point_count)
  }

  #[must_use]
  pub fn palette(&self) -> ClusterPalette {
    ClusterPalette::for_school_count(self.ecole_count)
  }

  /// Key of the badge image the `clusters` layer shows for this cluster.
  #[must_use]
  pub fn badge_key(&self) -> String {
    self.palette().key(self.tier())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::map::feature_collection::FeatureProperties;

  /// What `cluster_properties` computes for a set of member points.
  fn reduce<'a>(members: impl IntoIterator<Item = &'a FeatureProperties>) -> ClusterAggregate {
    members.into_iter().fold(ClusterAggregate::default(), |acc, member| {
      if member.is_school() {
        ClusterAggregate::new(acc.ecole_count + 1, acc.moniteur_count)
      } else {
        ClusterAggregate::new(acc.ecole_count, acc.moniteur_count + 1)
      }
    })
  }

  #[test]
  fn badge_for_aggregate() {
    assert_eq!(ClusterAggregate::new(1, 19).badge_key(), "cluster-gold-md");
    assert_eq!(ClusterAggregate::new(1, 18).badge_key(), "cluster-gold-sm");
    assert_eq!(ClusterAggregate::new(0, 19).badge_key(), "cluster-blue-sm");
    assert_eq!(ClusterAggregate::new(3, 97).badge_key(), "cluster-gold-xl");
    assert_eq!(ClusterAggregate::new(0, 60).badge_key(), "cluster-blue-lg");
  }

  #[test]
  fn reduction_over_members() {
    let school = FeatureProperties {
      ecole: 1,
      ..FeatureProperties::default()
    };
    let instructor = FeatureProperties::default();
    let aggregate = reduce([&school, &instructor, &instructor]);
    assert_eq!(aggregate, ClusterAggregate::new(1, 2));
    assert_eq!(aggregate.point_count, 3);
  }

  #[test]
  fn aggregate_reads_engine_properties() {
    let aggregate: ClusterAggregate =
      serde_json::from_value(json!({"point_count": 20, "ecoleCount": 1, "moniteurCount": 19}))
        .unwrap();
    assert_eq!(aggregate, ClusterAggregate::new(1, 19));
  }

  #[test]
  fn badge_expression_matches_tiers() {
    let expr = badge_expression();
    assert_eq!(expr[0], "step");
    assert_eq!(expr[2][2], "cluster-gold-sm");
    assert_eq!(expr[3], 20);
    assert_eq!(expr[4][3], "cluster-blue-md");
    assert_eq!(expr[5], 50);
    assert_eq!(expr[7], 100);
    assert_eq!(expr[8][2], "cluster-gold-xl");
  }

  #[test]
  fn schools_are_drawn_above_instructors() {
    let ecole = LayerId::EcolePoints.spec();
    let moniteur = LayerId::MoniteurPoints.spec();
    assert_eq!(ecole["layout"]["symbol-sort-key"], 0);
    assert_eq!(moniteur["layout"]["symbol-sort-key"], 1);
    assert_eq!(ecole["layout"]["symbol-z-order"], "source");
    assert!(moniteur["layout"].get("symbol-z-order").is_none());
    assert_eq!(ecole["filter"][2][2], 1);
    assert_eq!(ecole["source"], SOURCE_ID);
    assert!(LayerId::EcolePoints.sort_key() < LayerId::MoniteurPoints.sort_key());
  }

  #[test]
  fn source_declares_clustering() {
    let source = source_spec(ClusterOptions::default());
    assert_eq!(source["clusterMaxZoom"], 13);
    assert_eq!(source["clusterRadius"], 55);
    assert!(source["clusterProperties"]["ecoleCount"].is_array());
  }
}
