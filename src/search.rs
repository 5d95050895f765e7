pub mod debounce;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::directory::LocationRecord;

/// Terms this short (in characters) are not used for filtering.
pub const MIN_SEARCH_LEN: usize = 2;

/// Lower-cases and strips diacritics, so that `"Écoles"` and `"ecoles"` compare equal.
#[must_use]
pub fn normalize_text(text: &str) -> String {
  text
    .to_lowercase()
    .nfd()
    .filter(|c| !is_combining_mark(*c))
    .collect()
}

/// Whether a raw search input should take part in filtering at all.
#[must_use]
pub fn is_active_term(term: &str) -> bool {
  normalize_text(term).chars().count() >= MIN_SEARCH_LEN
}

/// Field weights used by `relevance_score`.
const WEIGHTS: [(Field, u32); 5] = [
  (Field::Name, 3),
  (Field::Address, 2),
  (Field::City, 2),
  (Field::Phone, 1),
  (Field::Email, 1),
];

#[derive(Debug, Clone, Copy)]
enum Field {
  Name,
  Address,
  City,
  Phone,
  Email,
}

impl Field {
  fn of(self, record: &LocationRecord) -> &str {
    match self {
      Field::Name => &record.name,
      Field::Address => &record.address,
      Field::City => &record.city,
      Field::Phone => &record.phone,
      Field::Email => &record.email,
    }
  }
}

/// Scores how well `term` matches a record. Zero means no field contains the term.
///
/// Empty fields never match, even for an empty term.
#[must_use]
pub fn relevance_score(record: &LocationRecord, term: &str) -> u32 {
  let term = normalize_text(term);
  WEIGHTS
    .iter()
    .filter(|(field, _)| {
      let value = field.of(record);
      !value.is_empty() && normalize_text(value).contains(&term)
    })
    .map(|(_, weight)| weight)
    .sum()
}
