use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::facets::Facet;
use super::record::LocationRecord;
use crate::map::feature_collection::RenderedDataset;
use crate::search::{is_active_term, relevance_score};

/// Which categories the legend currently shows. Never both hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityState {
  schools_visible: bool,
  instructors_visible: bool,
}

impl Default for VisibilityState {
  fn default() -> Self {
    Self {
      schools_visible: true,
      instructors_visible: true,
    }
  }
}

impl VisibilityState {
  #[must_use]
  pub fn schools_visible(&self) -> bool {
    self.schools_visible
  }

  #[must_use]
  pub fn instructors_visible(&self) -> bool {
    self.instructors_visible
  }

  /// Flips school visibility. Returns `false` (and changes nothing) if schools are the only
  /// visible category.
  pub fn toggle_schools(&mut self) -> bool {
    if self.schools_visible && !self.instructors_visible {
      return false;
    }
    self.schools_visible = !self.schools_visible;
    true
  }

  /// Flips instructor visibility, with the same guard as `toggle_schools`.
  pub fn toggle_instructors(&mut self) -> bool {
    if self.instructors_visible && !self.schools_visible {
      return false;
    }
    self.instructors_visible = !self.instructors_visible;
    true
  }

  #[must_use]
  pub fn shows(&self, record: &LocationRecord) -> bool {
    if record.is_school {
      self.schools_visible
    } else {
      self.instructors_visible
    }
  }
}

/// What the user asked for through the search box and the facet checkboxes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
  pub search: String,
  pub disciplines: BTreeSet<String>,
  pub services: BTreeSet<String>,
  pub certifications: BTreeSet<String>,
}

impl FilterCriteria {
  #[must_use]
  pub fn selection(&self, facet: Facet) -> &BTreeSet<String> {
    match facet {
      Facet::Discipline => &self.disciplines,
      Facet::Service => &self.services,
      Facet::Certification => &self.certifications,
    }
  }

  pub fn selection_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
    match facet {
      Facet::Discipline => &mut self.disciplines,
      Facet::Service => &mut self.services,
      Facet::Certification => &mut self.certifications,
    }
  }

  /// Checks or unchecks one facet value.
  pub fn set_selected(&mut self, facet: Facet, value: &str, selected: bool) {
    let selection = self.selection_mut(facet);
    if selected {
      selection.insert(value.to_string());
    } else {
      selection.remove(value);
    }
  }

  /// Number of checked values across all facets.
  #[must_use]
  pub fn active_facet_count(&self) -> usize {
    Facet::all().iter().map(|f| self.selection(*f).len()).sum()
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }

  fn matches_search(&self, record: &LocationRecord) -> bool {
    !is_active_term(&self.search) || relevance_score(record, &self.search) > 0
  }

  fn matches_facet(&self, facet: Facet, record: &LocationRecord) -> bool {
    let selected = self.selection(facet);
    selected.is_empty() || !selected.is_disjoint(facet.values_of(record))
  }
}

/// Whether a record passes the legend state and all criteria. Cheapest checks go first.
#[must_use]
pub fn passes(record: &LocationRecord, visibility: &VisibilityState, criteria: &FilterCriteria) -> bool {
  visibility.shows(record)
    && criteria.matches_search(record)
    && Facet::all()
      .iter()
      .all(|facet| criteria.matches_facet(*facet, record))
}

/// Builds the dataset to hand to the map engine.
#[must_use]
pub fn apply_filters(
  records: &[LocationRecord],
  visibility: &VisibilityState,
  criteria: &FilterCriteria,
) -> RenderedDataset {
  let dataset: RenderedDataset = records
    .iter()
    .filter(|r| passes(r, visibility, criteria))
    .collect();
  log::debug!(
    "Filtered {} of {} locations ({} écoles, search '{}', {} facet values)",
    dataset.len(),
    records.len(),
    dataset.school_count(),
    criteria.search,
    criteria.active_facet_count()
  );
  dataset
}

/// Selected counts per facet group and in total, as shown beside the group titles and on the
/// filter button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
  pub group_counts: Vec<(Facet, usize)>,
  pub total: usize,
}

impl From<&FilterCriteria> for FilterSummary {
  fn from(criteria: &FilterCriteria) -> Self {
    Self {
      group_counts: Facet::all()
        .iter()
        .map(|facet| (*facet, criteria.selection(*facet).len()))
        .collect(),
      total: criteria.active_facet_count(),
    }
  }
}

impl FilterSummary {
  /// `(n)`, or nothing when no value of the group is checked.
  #[must_use]
  pub fn group_label(&self, facet: Facet) -> String {
    match self.group_counts.iter().find(|(f, _)| *f == facet) {
      Some((_, n)) if *n > 0 => format!("({n})"),
      _ => String::new(),
    }
  }

  /// Total shown on the badge; hidden when nothing is selected.
  #[must_use]
  pub fn badge(&self) -> Option<usize> {
    (self.total > 0).then_some(self.total)
  }
}

/// Text shown next to the search box.
#[must_use]
pub fn result_count_label(count: usize) -> String {
  if count == 0 {
    "Aucun résultat".to_string()
  } else {
    format!("{count} résultat(s)")
  }
}
