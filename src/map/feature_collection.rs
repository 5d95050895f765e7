use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coordinates::WGS84Coordinate;
use crate::directory::LocationRecord;

/// A `GeoJSON` point geometry.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Point")]
pub struct PointGeometry {
  pub coordinates: [f64; 2],
}

impl PointGeometry {
  #[must_use]
  pub fn coordinate(&self) -> WGS84Coordinate {
    WGS84Coordinate::new(self.coordinates[1], self.coordinates[0])
  }
}

impl From<WGS84Coordinate> for PointGeometry {
  fn from(coord: WGS84Coordinate) -> Self {
    Self {
      coordinates: coord.lon_lat(),
    }
  }
}

/// Everything the map layers and the detail card read from a feature.
///
/// Facet lists are stored as JSON encoded strings because the engine's property values are
/// scalars.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct FeatureProperties {
  pub code: u32,
  pub name: String,
  pub ecole: u8,
  pub adresse: String,
  pub cp: String,
  pub city: String,
  pub tel: String,
  pub email: String,
  pub site_internet: String,
  pub discipline: String,
  pub prestation: String,
  pub test_mcf: String,
  pub code_ohme_id: String,
}

impl FeatureProperties {
  #[must_use]
  pub fn is_school(&self) -> bool {
    self.ecole == 1
  }
}

fn encode_list<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
  Value::from(values.into_iter().cloned().collect::<Vec<_>>()).to_string()
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
  pub geometry: PointGeometry,
  pub properties: FeatureProperties,
}

impl From<&LocationRecord> for Feature {
  fn from(record: &LocationRecord) -> Self {
    Self {
      geometry: record.position.into(),
      properties: FeatureProperties {
        code: record.code,
        name: record.name.clone(),
        ecole: u8::from(record.is_school),
        adresse: record.address.clone(),
        cp: record.postal_code.clone(),
        city: record.city.clone(),
        tel: record.phone.clone(),
        email: record.email.clone(),
        site_internet: record.website.clone(),
        discipline: encode_list(&record.disciplines),
        prestation: encode_list(&record.services),
        test_mcf: encode_list(&record.certifications),
        code_ohme_id: record.code_ohme_id.clone().unwrap_or_default(),
      },
    }
  }
}

/// The filtered records as a `GeoJSON` feature collection. Always replaces the engine source as a
/// whole.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct RenderedDataset {
  features: Vec<Feature>,
}

impl RenderedDataset {
  #[must_use]
  pub fn features(&self) -> &[Feature] {
    &self.features
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.features.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.features.is_empty()
  }

  #[must_use]
  pub fn school_count(&self) -> usize {
    self
      .features
      .iter()
      .filter(|f| f.properties.is_school())
      .count()
  }
}

impl<'a> FromIterator<&'a LocationRecord> for RenderedDataset {
  fn from_iter<T: IntoIterator<Item = &'a LocationRecord>>(iter: T) -> Self {
    Self {
      features: iter.into_iter().map(Feature::from).collect(),
    }
  }
}
