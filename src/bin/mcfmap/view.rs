use itertools::Itertools;
use mcfmap::directory::card::{ContactDetails, LocationCard};
use mcfmap::directory::{Facet, FilterSummary, VisibilityState};
use mcfmap::session::DirectoryView;

/// Prints what a page would display.
pub struct ConsoleView;

fn mark(visible: bool) -> &'static str {
  if visible { "x" } else { " " }
}

impl DirectoryView for ConsoleView {
  fn show_result_count(&mut self, label: &str) {
    println!("{label}");
  }

  fn show_legend(&mut self, visibility: &VisibilityState) {
    println!(
      "[{}] Écoles MCF  [{}] Moniteurs",
      mark(visibility.schools_visible()),
      mark(visibility.instructors_visible())
    );
  }

  fn show_filter_summary(&mut self, summary: &FilterSummary) {
    let groups = Facet::all()
      .iter()
      .map(|facet| format!("{} {}", facet.group().title, summary.group_label(*facet)))
      .join(" | ");
    match summary.badge() {
      Some(total) => println!("{groups} [{total}]"),
      None => println!("{groups}"),
    }
  }

  fn open_card(&mut self, card: &LocationCard) {
    println!("{}: {}", card.type_label, card.name);
    for line in &card.address_lines {
      println!("  {line}");
    }
    for row in &card.tag_rows {
      println!("  {}: {}", row.title, row.tags.iter().map(|t| &t.label).join(", "));
    }
  }

  fn close_card(&mut self) {}

  fn show_contact(&mut self, details: &ContactDetails) {
    for value in details.phone.iter().chain(&details.email) {
      println!("  {value}");
    }
    for site in &details.websites {
      println!("  {}", site.display);
    }
  }

  fn open_url(&mut self, url: &str) {
    println!("{url}");
  }
}
