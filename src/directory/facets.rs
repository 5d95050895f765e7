use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::record::LocationRecord;

/// One of the three category dimensions a user can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facet {
  Discipline,
  Service,
  Certification,
}

impl Facet {
  /// Identifier used by the feed and the map properties.
  #[must_use]
  pub fn id(&self) -> &'static str {
    match self {
      Facet::Discipline => "discipline",
      Facet::Service => "prestation",
      Facet::Certification => "test_mcf",
    }
  }

  #[must_use]
  pub fn all() -> &'static [Facet] {
    &[Facet::Discipline, Facet::Service, Facet::Certification]
  }

  #[must_use]
  pub fn group(&self) -> &'static FacetGroup {
    match self {
      Facet::Discipline => &FACET_GROUPS[0],
      Facet::Service => &FACET_GROUPS[1],
      Facet::Certification => &FACET_GROUPS[2],
    }
  }

  /// The values of this facet carried by a record.
  #[must_use]
  pub fn values_of<'a>(&self, record: &'a LocationRecord) -> &'a BTreeSet<String> {
    match self {
      Facet::Discipline => &record.disciplines,
      Facet::Service => &record.services,
      Facet::Certification => &record.certifications,
    }
  }
}

#[derive(Debug)]
pub struct FacetOption {
  pub label: &'static str,
  pub icon: &'static str,
}

#[derive(Debug)]
pub struct FacetGroup {
  pub title: &'static str,
  pub facet: Facet,
  pub options: &'static [FacetOption],
}

impl FacetGroup {
  #[must_use]
  pub fn icon_for(&self, label: &str) -> Option<&'static str> {
    self
      .options
      .iter()
      .find(|o| o.label == label)
      .map(|o| o.icon)
  }
}

const fn option(label: &'static str, icon: &'static str) -> FacetOption {
  FacetOption { label, icon }
}

pub static FACET_GROUPS: [FacetGroup; 3] = [
  FacetGroup {
    title: "Disciplines",
    facet: Facet::Discipline,
    options: &[
      option("BMX", "fas fa-bicycle"),
      option("FatBike", "fa-solid fa-motorcycle"),
      option("Gravel", "fas fa-road"),
      option("Mobilité/Remise en selle", "fa-solid fa-vest-patches"),
      option("Route", "fas fa-route"),
      option("Trial", "fa-solid fa-person-biking-mountain"),
      option("VTT", "fas fa-biking"),
      option("VTT Descente", "fas fa-biking"),
      option("VTT Enduro", "fas fa-biking"),
      option("VTT Electrique", "fas fa-biking"),
    ],
  },
  FacetGroup {
    title: "Type de Prestation",
    facet: Facet::Service,
    options: &[
      option("Cours particuliers", "fas fa-chalkboard-teacher"),
      option("Format Club", "fas fa-users"),
      option("Formation", "fas fa-book"),
      option("Randonnée/Balade", "fas fa-hiking"),
      option("Stage", "fas fa-calendar-alt"),
      option("Séminaire", "fas fa-briefcase"),
      option("Voyage à vélo", "fa-solid fa-plane"),
    ],
  },
  FacetGroup {
    title: "Tests MCF",
    facet: Facet::Certification,
    options: &[
      option("Loupiot-Biclou", "fa-solid fa-child"),
      option("Bikers", "fa-solid fa-person-biking"),
      option("Rocket-Gachette", "fa-solid fa-rocket"),
    ],
  },
];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn groups_match_facets() {
    for facet in Facet::all() {
      assert_eq!(facet.group().facet, *facet);
    }
  }

  #[test]
  fn icon_lookup() {
    let group = Facet::Certification.group();
    assert_eq!(group.icon_for("Bikers"), Some("fa-solid fa-person-biking"));
    assert_eq!(group.icon_for("VTT"), None);
    assert_eq!(Facet::Service.group().options.len(), 7);
  }
}
