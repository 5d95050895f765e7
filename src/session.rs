//! One map session: the loaded directory, what the user filtered and selected, and the engine and
//! page it drives.

use crate::config::Config;
use crate::directory::card::{ContactDetails, LocationCard, contact_url};
use crate::directory::{
  Directory, Facet, FilterCriteria, FilterSummary, LocationRecord, RawLocation, ShowFilter,
  VisibilityState, apply_filters, result_count_label,
};
use crate::map::coordinates::{ScreenPoint, WGS84Coordinate};
use crate::map::engine::{MapEngine, Tooltip};
use crate::map::feature_collection::RenderedDataset;
use crate::map::interaction::{ClickOutcome, TooltipSlot, resolve_click, resolve_hover};
use crate::map::markers::marker_images;
use crate::map::style::{LayerId, SOURCE_ID, source_spec};
use crate::search::debounce::SearchDebouncer;
use crate::tracking::Tracker;

/// The page elements around the map.
pub trait DirectoryView {
  fn show_result_count(&mut self, label: &str);

  fn show_legend(&mut self, visibility: &VisibilityState);

  fn show_filter_summary(&mut self, summary: &FilterSummary);

  fn open_card(&mut self, card: &LocationCard);

  fn close_card(&mut self);

  fn show_contact(&mut self, details: &ContactDetails);

  fn open_url(&mut self, url: &str);
}

pub struct Session<E: MapEngine, V: DirectoryView> {
  config: Config,
  engine: E,
  view: V,
  tracker: Tracker,
  directory: Directory,
  visibility: VisibilityState,
  criteria: FilterCriteria,
  dataset: RenderedDataset,
  active: Option<u32>,
  tooltip: TooltipSlot,
  layers_ready: bool,
}

impl<E: MapEngine, V: DirectoryView> Session<E, V> {
  pub fn new(config: Config, mut engine: E, view: V, tracker: Tracker) -> Self {
    engine.fit_bounds(&config.bounds);
    Self {
      config,
      engine,
      view,
      tracker,
      directory: Directory::default(),
      visibility: VisibilityState::default(),
      criteria: FilterCriteria::default(),
      dataset: RenderedDataset::default(),
      active: None,
      tooltip: TooltipSlot::default(),
      layers_ready: false,
    }
  }

  /// Takes the feed result and filters it with the current legend, search and facets. A failed
  /// feed is logged and leaves the map as it was.
  pub fn load(&mut self, feed: anyhow::Result<Vec<RawLocation>>, show: Option<ShowFilter>) {
    let raw = match feed {
      Ok(raw) => raw,
      Err(e) => {
        log::error!("Erreur chargement JSON: {e:#}");
        return;
      }
    };
    self.directory = Directory::load(raw, show, &self.config.bounds);
    self.dataset = apply_filters(self.directory.records(), &self.visibility, &self.criteria);
    if self.layers_ready {
      self.push_dataset();
    } else {
      self.setup_layers();
    }
    self
      .view
      .show_result_count(&result_count_label(self.dataset.len()));
  }

  fn setup_layers(&mut self) {
    match marker_images() {
      Ok(images) => {
        for (key, image) in &images {
          self.engine.add_image(key, image);
        }
      }
      Err(e) => log::error!("Cannot draw markers: {e}"),
    }
    self
      .engine
      .add_source(SOURCE_ID, &source_spec(self.config.cluster), &self.dataset);
    for layer in LayerId::all() {
      self.engine.add_layer(*layer, &layer.spec());
    }
    self.layers_ready = true;
  }

  fn push_dataset(&mut self) {
    if !self.layers_ready {
      return;
    }
    if let Err(e) = self.engine.set_data(SOURCE_ID, &self.dataset) {
      log::warn!("Cannot update map data: {e}");
    }
  }

  /// Recomputes the dataset from the directory and replaces the engine source with it.
  pub fn apply_filters(&mut self) {
    self.dataset = apply_filters(self.directory.records(), &self.visibility, &self.criteria);
    self.push_dataset();
    self
      .view
      .show_result_count(&result_count_label(self.dataset.len()));
  }

  /// Returns `false` when refused because schools are the only visible category.
  pub fn toggle_schools(&mut self) -> bool {
    let changed = self.visibility.toggle_schools();
    if changed {
      self.view.show_legend(&self.visibility);
      self.apply_filters();
    }
    changed
  }

  /// Returns `false` when refused because instructors are the only visible category.
  pub fn toggle_instructors(&mut self) -> bool {
    let changed = self.visibility.toggle_instructors();
    if changed {
      self.view.show_legend(&self.visibility);
      self.apply_filters();
    }
    changed
  }

  /// Applies a (debounced) search input.
  pub fn set_search(&mut self, text: &str) {
    text.clone_into(&mut self.criteria.search);
    self.apply_filters();
  }

  /// A debouncer with the configured delay, delivering to `sender`.
  #[must_use]
  pub fn search_debouncer(
    &self,
    sender: tokio::sync::mpsc::UnboundedSender<String>,
  ) -> SearchDebouncer {
    SearchDebouncer::new(self.config.search_debounce(), sender)
  }

  pub fn set_facet(&mut self, facet: Facet, value: &str, selected: bool) {
    self.criteria.set_selected(facet, value, selected);
    self
      .view
      .show_filter_summary(&FilterSummary::from(&self.criteria));
    self.apply_filters();
  }

  /// Clears search and facets and shows both categories again.
  pub fn reset(&mut self) {
    self.criteria.clear();
    self.visibility = VisibilityState::default();
    self.view.show_legend(&self.visibility);
    self
      .view
      .show_filter_summary(&FilterSummary::from(&self.criteria));
    self.apply_filters();
  }

  pub fn click(&mut self, point: ScreenPoint) {
    match resolve_click(&self.engine, point, self.config.fly_zoom) {
      ClickOutcome::ExpandCluster { center, zoom } => self.engine.ease_to(center, zoom),
      ClickOutcome::ClusterUnresolved => {}
      ClickOutcome::Select {
        code, center, zoom, ..
      } => {
        let Some(record) = self.directory.find_by_code(code) else {
          log::warn!("No location with code {code}");
          return;
        };
        self.view.open_card(&LocationCard::from(record));
        self.active = Some(code);
        self.tracker.track_pin_click(record);
        self.engine.ease_to(center, zoom);
      }
      ClickOutcome::Dismiss => {
        self.close_card();
        self.tooltip.dismiss(&mut self.engine);
      }
    }
  }

  pub fn hover(&mut self, point: ScreenPoint) {
    match resolve_hover(&self.engine, point) {
      Some(tooltip) => self.tooltip.open(&mut self.engine, tooltip),
      None => self.tooltip.dismiss(&mut self.engine),
    }
  }

  /// The pointer left an interactive layer.
  pub fn leave(&mut self) {
    self.tooltip.dismiss(&mut self.engine);
  }

  pub fn close_card(&mut self) {
    self.active = None;
    self.view.close_card();
  }

  /// Reveals the contact details of the selected record.
  pub fn reveal_contact(&mut self) {
    let Some(record) = self.active.and_then(|code| self.directory.find_by_code(code)) else {
      return;
    };
    self.tracker.track_coord_click(record);
    self
      .view
      .show_contact(&ContactDetails::new(record, &self.config.contact_url));
  }

  /// Opens the contact form for the selected record.
  pub fn contact(&mut self) {
    let Some(record) = self.active.and_then(|code| self.directory.find_by_code(code)) else {
      return;
    };
    self
      .view
      .open_url(&contact_url(&self.config.contact_url, record));
  }

  /// Shows where the user is, if the position could be acquired.
  pub fn show_user_location(&mut self, position: Option<WGS84Coordinate>) {
    match position {
      Some(position) => self.engine.show_user_location(position),
      None => log::debug!("No user position"),
    }
  }

  #[must_use]
  pub fn dataset(&self) -> &RenderedDataset {
    &self.dataset
  }

  #[must_use]
  pub fn directory(&self) -> &Directory {
    &self.directory
  }

  #[must_use]
  pub fn visibility(&self) -> &VisibilityState {
    &self.visibility
  }

  #[must_use]
  pub fn criteria(&self) -> &FilterCriteria {
    &self.criteria
  }

  #[must_use]
  pub fn active_record(&self) -> Option<&LocationRecord> {
    self.active.and_then(|code| self.directory.find_by_code(code))
  }

  #[must_use]
  pub fn tooltip(&self) -> Option<&Tooltip> {
    self.tooltip.current()
  }

  #[must_use]
  pub fn engine(&self) -> &E {
    &self.engine
  }

  pub fn engine_mut(&mut self) -> &mut E {
    &mut self.engine
  }

  #[must_use]
  pub fn view(&self) -> &V {
    &self.view
  }
}
