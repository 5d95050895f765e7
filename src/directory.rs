//! The provider directory: validated records, facets, filtering and the detail card.

pub mod card;
pub mod facets;
pub mod filter;
pub mod record;

use std::str::FromStr;

pub use facets::{FACET_GROUPS, Facet, FacetGroup};
pub use filter::{FilterCriteria, FilterSummary, VisibilityState, apply_filters, result_count_label};
pub use record::{Category, LocationRecord, RawLocation};

use crate::map::coordinates::GeoBounds;

/// Load-time restriction coming from the `show` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFilter {
  Ecoles,
  Moniteurs,
}

impl ShowFilter {
  /// Reads the `show` parameter out of a query string such as `"?show=ecole&x=1"`.
  #[must_use]
  pub fn from_query(query: &str) -> Option<Self> {
    query
      .trim_start_matches('?')
      .split('&')
      .filter_map(|pair| pair.split_once('='))
      .find(|(key, _)| *key == "show")
      .and_then(|(_, value)| value.parse().ok())
  }

  fn keeps(self, raw: &RawLocation) -> bool {
    match self {
      ShowFilter::Ecoles => raw.ecole,
      ShowFilter::Moniteurs => !raw.ecole,
    }
  }
}

impl FromStr for ShowFilter {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "ecole" => Ok(ShowFilter::Ecoles),
      "moniteur" => Ok(ShowFilter::Moniteurs),
      other => Err(format!("unknown category '{other}'")),
    }
  }
}

/// All records of the session, schools first, with codes `1..=n` in that order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
  records: Vec<LocationRecord>,
}

impl Directory {
  /// Validates the raw feed. Entries outside `bounds` or with unusable positions are dropped.
  #[must_use]
  pub fn load(raw: Vec<RawLocation>, show: Option<ShowFilter>, bounds: &GeoBounds) -> Self {
    let total = raw.len();
    let mut records: Vec<LocationRecord> = raw
      .into_iter()
      .filter(|r| show.is_none_or(|s| s.keeps(r)))
      .filter_map(|r| LocationRecord::from_raw(r, bounds))
      .collect();

    // Stable, so the feed order is kept within each category.
    records.sort_by_key(|r| !r.is_school);
    for (code, record) in (1..).zip(records.iter_mut()) {
      record.code = code;
    }

    let schools = records.iter().filter(|r| r.is_school).count();
    log::info!(
      "{} locations ({} écoles, {} filtrées)",
      records.len(),
      schools,
      total - records.len()
    );
    Self { records }
  }

  #[must_use]
  pub fn records(&self) -> &[LocationRecord] {
    &self.records
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.records.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  #[must_use]
  pub fn find_by_code(&self, code: u32) -> Option<&LocationRecord> {
    self.records.iter().find(|r| r.code == code)
  }
}
