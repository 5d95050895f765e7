use itertools::Itertools;
use serde::Serialize;

use super::facets::Facet;
use super::record::{Category, LocationRecord};

/// A facet value as displayed on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
  pub label: String,
  pub icon: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRow {
  pub title: &'static str,
  pub tags: Vec<Tag>,
}

/// The summary card opened when a pin is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCard {
  pub code: u32,
  pub category: Category,
  pub type_label: &'static str,
  pub name: String,
  pub address_lines: Vec<String>,
  pub tag_rows: Vec<TagRow>,
}

impl From<&LocationRecord> for LocationCard {
  fn from(record: &LocationRecord) -> Self {
    let locality = [record.postal_code.as_str(), record.city.as_str()]
      .into_iter()
      .filter(|part| !part.is_empty())
      .join(" ");
    let address_lines = [record.address.clone(), locality]
      .into_iter()
      .filter(|line| !line.is_empty())
      .collect();

    let tag_rows = Facet::all()
      .iter()
      .filter_map(|facet| {
        let group = facet.group();
        let tags: Vec<Tag> = facet
          .values_of(record)
          .iter()
          .map(|label| Tag {
            label: label.clone(),
            icon: group.icon_for(label),
          })
          .collect();
        (!tags.is_empty()).then_some(TagRow {
          title: group.title,
          tags,
        })
      })
      .collect();

    Self {
      code: record.code,
      category: record.category(),
      type_label: record.category().label(),
      name: record.name.clone(),
      address_lines,
      tag_rows,
    }
  }
}

/// A website entry. `display` is the bare host for well formed URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebsiteLink {
  pub href: Option<String>,
  pub display: String,
}

impl WebsiteLink {
  fn parse(raw: &str) -> Self {
    match surf::Url::parse(raw) {
      Ok(url) if url.host_str().is_some() => {
        let host = url.host_str().unwrap_or_default();
        Self {
          href: Some(raw.to_string()),
          display: host.strip_prefix("www.").unwrap_or(host).to_string(),
        }
      }
      _ => Self {
        href: None,
        display: raw.to_string(),
      },
    }
  }
}

/// Splits the website field, which may hold several URLs joined by `" - "` or `" ; "`.
#[must_use]
pub fn split_websites(field: &str) -> Vec<WebsiteLink> {
  field
    .split(" - ")
    .flat_map(|part| part.split(" ; "))
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .map(WebsiteLink::parse)
    .collect()
}

/// Contact details, revealed on explicit request only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactDetails {
  pub phone: Option<String>,
  pub email: Option<String>,
  pub websites: Vec<WebsiteLink>,
  pub contact_url: String,
}

impl ContactDetails {
  #[must_use]
  pub fn new(record: &LocationRecord, contact_base_url: &str) -> Self {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    Self {
      phone: non_empty(&record.phone),
      email: non_empty(&record.email),
      websites: split_websites(&record.website),
      contact_url: contact_url(contact_base_url, record),
    }
  }
}

/// Link to the contact form, pre-filled with the record's code and name.
#[must_use]
pub fn contact_url(base: &str, record: &LocationRecord) -> String {
  format!(
    "{base}?id={}&contact={}",
    record.code,
    urlencoding::encode(&record.name)
  )
}
