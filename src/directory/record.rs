use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::map::coordinates::{GeoBounds, WGS84Coordinate, parse_coordinates};

/// A provider as it appears in the JSON feed, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLocation {
  #[serde(deserialize_with = "lenient_string")]
  pub code_ohme_id: Option<String>,
  pub name: Option<String>,
  #[serde(deserialize_with = "lenient_bool")]
  pub ecole: bool,
  pub adresse: Option<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub cp: Option<String>,
  pub city: Option<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub tel: Option<String>,
  pub email: Option<String>,
  pub site_internet: Option<String>,
  #[serde(deserialize_with = "lenient_list")]
  pub discipline: Vec<String>,
  #[serde(deserialize_with = "lenient_list")]
  pub prestation: Vec<String>,
  #[serde(deserialize_with = "lenient_list")]
  pub test_mcf: Vec<String>,
  #[serde(deserialize_with = "lenient_string")]
  pub position: Option<String>,
}

/// Postal codes and phone numbers show up both as strings and numbers in the feed.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::String(s) if !s.trim().is_empty() => Some(s),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  })
}

/// Missing or `null` facet lists are empty; non-string entries are skipped.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::Array(values) => values
      .into_iter()
      .filter_map(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
      })
      .collect(),
    _ => Vec::new(),
  })
}

/// Only a literal `true` marks a school.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

/// Which category a provider belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Ecole,
  Moniteur,
}

impl Category {
  #[must_use]
  pub fn name(&self) -> &'static str {
    match self {
      Category::Ecole => "ecole",
      Category::Moniteur => "moniteur",
    }
  }

  #[must_use]
  pub fn label(&self) -> &'static str {
    match self {
      Category::Ecole => "École MCF",
      Category::Moniteur => "Moniteur indépendant",
    }
  }
}

/// A validated provider. Immutable once the directory is loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRecord {
  pub code: u32,
  pub code_ohme_id: Option<String>,
  pub name: String,
  pub is_school: bool,
  pub address: String,
  pub postal_code: String,
  pub city: String,
  pub phone: String,
  pub email: String,
  pub website: String,
  pub disciplines: BTreeSet<String>,
  pub services: BTreeSet<String>,
  pub certifications: BTreeSet<String>,
  pub position: WGS84Coordinate,
}

impl LocationRecord {
  /// Validates a raw entry. Returns `None` for unparsable or out-of-bounds positions.
  ///
  /// The code is provisional; `Directory::load` renumbers records once they are ranked.
  #[must_use]
  pub fn from_raw(raw: RawLocation, bounds: &GeoBounds) -> Option<Self> {
    let position = parse_coordinates(raw.position.as_deref().unwrap_or_default())
      .inspect_err(|e| log::debug!("Dropping '{}': {e}", raw.name.as_deref().unwrap_or_default()))
      .ok()?;
    if !bounds.contains_coordinate(&position) {
      log::debug!(
        "Dropping '{}': {:.4}, {:.4} is out of bounds",
        raw.name.as_deref().unwrap_or_default(),
        position.lon,
        position.lat
      );
      return None;
    }

    Some(Self {
      code: 0,
      code_ohme_id: raw.code_ohme_id,
      name: raw.name.unwrap_or_default(),
      is_school: raw.ecole,
      address: raw.adresse.unwrap_or_default(),
      postal_code: raw.cp.unwrap_or_default(),
      city: raw.city.unwrap_or_default(),
      phone: raw.tel.unwrap_or_default(),
      email: raw.email.unwrap_or_default(),
      website: raw.site_internet.unwrap_or_default(),
      disciplines: raw.discipline.into_iter().collect(),
      services: raw.prestation.into_iter().collect(),
      certifications: raw.test_mcf.into_iter().collect(),
      position,
    })
  }

  #[must_use]
  pub fn category(&self) -> Category {
    if self.is_school {
      Category::Ecole
    } else {
      Category::Moniteur
    }
  }

  #[must_use]
  pub fn trimmed_name(&self) -> &str {
    self.name.trim()
  }

  /// External identity, if the provider is linked to one.
  #[must_use]
  pub fn external_id(&self) -> Option<&str> {
    self.code_ohme_id.as_deref().filter(|id| !id.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::map::coordinates::METROPOLITAN_FRANCE;

  #[test]
  fn deserialize_feed_entry() {
    let raw: RawLocation = serde_json::from_str(
      r#"{
        "code_ohme_id": 1234,
        "name": " Vélo École ",
        "ecole": true,
        "adresse": "1 rue des Alpes",
        "cp": 38000,
        "city": "Grenoble",
        "tel": "0476000000",
        "discipline": ["VTT", "Route"],
        "prestation": ["Stage"],
        "position": "5.72,45.18"
      }"#,
    )
    .unwrap();

    assert_eq!(raw.code_ohme_id.as_deref(), Some("1234"));
    assert_eq!(raw.cp.as_deref(), Some("38000"));
    assert!(raw.ecole);
    assert!(raw.test_mcf.is_empty());
    assert_eq!(raw.email, None);
  }

  #[test]
  fn null_lists_are_empty() {
    let raw: RawLocation = serde_json::from_str(
      r#"{"discipline": null, "prestation": ["Stage", 3], "position": null}"#,
    )
    .unwrap();
    assert!(raw.discipline.is_empty());
    assert_eq!(raw.prestation, vec!["Stage".to_string()]);
    assert_eq!(raw.position, None);
    assert!(LocationRecord::from_raw(raw, &METROPOLITAN_FRANCE).is_none());
  }

  #[test]
  fn non_boolean_ecole_is_instructor() {
    let raw: RawLocation =
      serde_json::from_str(r#"{"name": "x", "ecole": "true", "position": "5.72,45.18"}"#).unwrap();
    assert!(!raw.ecole);
  }

  #[test]
  fn blank_external_id_is_absent() {
    let raw: RawLocation =
      serde_json::from_str(r#"{"code_ohme_id": "  ", "position": "5.72,45.18"}"#).unwrap();
    assert_eq!(raw.code_ohme_id, None);
  }

  #[test]
  fn from_raw_validates_position() {
    let mut raw = RawLocation {
      name: Some("Moniteur".to_string()),
      position: Some("5.72,45.18".to_string()),
      ..RawLocation::default()
    };
    let record = LocationRecord::from_raw(raw.clone(), &METROPOLITAN_FRANCE).unwrap();
    assert_eq!(record.category(), Category::Moniteur);
    assert_eq!(record.position, WGS84Coordinate::new(45.18, 5.72));

    raw.position = Some("55.53,-21.11".to_string());
    assert!(LocationRecord::from_raw(raw.clone(), &METROPOLITAN_FRANCE).is_none());

    raw.position = Some("45.18".to_string());
    assert!(LocationRecord::from_raw(raw, &METROPOLITAN_FRANCE).is_none());
  }

  #[test]
  fn trimmed_name_and_external_id() {
    let raw = RawLocation {
      name: Some("  Jean Dupont ".to_string()),
      code_ohme_id: Some(String::new()),
      position: Some("2.35,48.85".to_string()),
      ..RawLocation::default()
    };
    let record = LocationRecord::from_raw(raw, &METROPOLITAN_FRANCE).unwrap();
    assert_eq!(record.trimmed_name(), "Jean Dupont");
    assert_eq!(record.external_id(), None);
  }
}
