use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser as CliParser, Subcommand};
use log::{error, info};
use mcfmap::config::Config;
use mcfmap::directory::{
  Directory, Facet, FilterCriteria, ShowFilter, VisibilityState, apply_filters, result_count_label,
};
use mcfmap::feed;
use mcfmap::map::engine::{HeadlessEngine, MapEngine};
use mcfmap::map::markers::marker_images;
use mcfmap::map::style::{LayerId, SOURCE_ID, source_spec};
use mcfmap::session::{DirectoryView, Session};
use mcfmap::tracking::{BestEffortSender, NoParentFrame, SurfSink, Tracker};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

mod view;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Filters the feed and prints the resulting GeoJSON.
  Filter {
    /// Feed file or URL. Defaults to the configured feed.
    feed: Option<String>,

    /// Keep only one category at load time. Values: ecole, moniteur.
    #[arg(long)]
    show: Option<ShowFilter>,

    #[arg(short, long, default_value = "")]
    search: String,

    #[arg(short, long)]
    discipline: Vec<String>,

    #[arg(long)]
    service: Vec<String>,

    #[arg(long)]
    certification: Vec<String>,

    #[arg(long)]
    hide_schools: bool,

    #[arg(long)]
    hide_instructors: bool,
  },
  /// Writes every marker and cluster badge as PNG.
  Markers {
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
  },
  /// Prints the source and layer declarations.
  Style,
  /// Loads the feed and filters it by search terms read line by line from stdin. The lines
  /// `:ecoles` and `:moniteurs` toggle a category, `:reset` clears everything.
  Watch {
    /// Feed file or URL. Defaults to the configured feed.
    feed: Option<String>,

    #[arg(long)]
    show: Option<ShowFilter>,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  env_logger::init();

  let config = Config::new();
  config.init_cfg_file();

  match args.command {
    Command::Filter {
      feed,
      show,
      search,
      discipline,
      service,
      certification,
      hide_schools,
      hide_instructors,
    } => {
      let source = feed.unwrap_or_else(|| config.feed_url.clone());
      let raw = feed::fetch(&source).await?;
      let directory = Directory::load(raw, show, &config.bounds);

      let mut criteria = FilterCriteria {
        search,
        ..FilterCriteria::default()
      };
      for (facet, values) in [
        (Facet::Discipline, discipline),
        (Facet::Service, service),
        (Facet::Certification, certification),
      ] {
        for value in values {
          criteria.set_selected(facet, &value, true);
        }
      }

      let mut visibility = VisibilityState::default();
      if hide_schools && !visibility.toggle_schools() {
        error!("Cannot hide schools");
      }
      if hide_instructors && !visibility.toggle_instructors() {
        error!("Cannot hide instructors as well as schools, keeping instructors");
      }

      let dataset = apply_filters(directory.records(), &visibility, &criteria);
      println!("{}", serde_json::to_string_pretty(&dataset)?);
      eprintln!("{}", result_count_label(dataset.len()));
    }
    Command::Markers { out } => {
      std::fs::create_dir_all(&out).with_context(|| format!("creating {}", out.display()))?;
      for (key, marker) in marker_images()? {
        let path = out.join(format!("{key}.png"));
        let image = image::RgbaImage::from_raw(marker.width, marker.height, marker.data)
          .with_context(|| format!("buffer of {key}"))?;
        image
          .save(&path)
          .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {}", path.display());
      }
    }
    Command::Style => {
      let style = serde_json::json!({
        "sources": { SOURCE_ID: source_spec(config.cluster) },
        "layers": LayerId::all().iter().map(LayerId::spec).collect::<Vec<_>>(),
      });
      println!("{}", serde_json::to_string_pretty(&style)?);
    }
    Command::Watch { feed, show } => watch(config, feed, show).await,
  }

  Ok(())
}

async fn watch(config: Config, feed: Option<String>, show: Option<ShowFilter>) {
  let source = feed.unwrap_or_else(|| config.feed_url.clone());
  let tracker = Tracker::new(
    Box::new(NoParentFrame),
    &config.parent_origin,
    BestEffortSender::to_endpoint(&config.tracking_url, Arc::new(SurfSink::default())),
  );
  let engine = HeadlessEngine::new(config.bounds.center(), config.initial_zoom);
  let mut session = Session::new(config, engine, view::ConsoleView, tracker);
  session.load(feed::fetch(&source).await, show);
  run_lines(&mut session, BufReader::new(tokio::io::stdin())).await;
}

/// Feeds `input` into the session line by line. Once the input ends, the last pending search is
/// still applied.
async fn run_lines<E, V, R>(session: &mut Session<E, V>, input: R)
where
  E: MapEngine,
  V: DirectoryView,
  R: AsyncBufRead + Unpin,
{
  let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
  let mut debouncer = session.search_debouncer(sender);
  let mut lines = input.lines();

  loop {
    tokio::select! {
      line = lines.next_line() => match line {
        Ok(Some(line)) => match line.strip_prefix(':') {
          Some("ecoles") => toggle(session.toggle_schools(), "écoles"),
          Some("moniteurs") => toggle(session.toggle_instructors(), "moniteurs"),
          Some("reset") => {
            debouncer.cancel();
            session.reset();
          }
          Some(other) => error!("Unknown command: {other}"),
          None => debouncer.input(line),
        },
        Ok(None) => break,
        Err(e) => {
          error!("Cannot read input: {e}");
          break;
        }
      },
      Some(term) = receiver.recv() => session.set_search(&term),
    }
  }
  debouncer.flush().await;
  while let Ok(term) = receiver.try_recv() {
    session.set_search(&term);
  }
}

fn toggle(changed: bool, category: &str) {
  if !changed {
    error!("Les {category} sont la seule catégorie affichée");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  use mcfmap::directory::RawLocation;
  use mcfmap::tracking::BeaconSender;

  fn session(debounce_ms: u64) -> Session<HeadlessEngine, view::ConsoleView> {
    let config = Config {
      search_debounce_ms: debounce_ms,
      ..Config::default()
    };
    let engine = HeadlessEngine::new(config.bounds.center(), config.initial_zoom);
    let tracker = Tracker::new(
      Box::new(NoParentFrame),
      &config.parent_origin,
      BestEffortSender::new(
        Box::new(BeaconSender::unavailable()),
        Box::new(BeaconSender::unavailable()),
      ),
    );
    let mut session = Session::new(config, engine, view::ConsoleView, tracker);
    session.load(
      Ok(vec![raw("École Grenoble", true), raw("Paul Durand", false)]),
      None,
    );
    session
  }

  fn raw(name: &str, ecole: bool) -> RawLocation {
    RawLocation {
      name: Some(name.to_string()),
      ecole,
      position: Some("5.72,45.19".to_string()),
      ..RawLocation::default()
    }
  }

  #[tokio::test]
  async fn last_search_is_applied_when_input_ends() {
    let mut session = session(250);
    let input = BufReader::new(&b"gre\n:moniteurs\ngrenoble\n"[..]);
    tokio::time::timeout(Duration::from_secs(5), run_lines(&mut session, input))
      .await
      .unwrap();
    assert_eq!(session.criteria().search, "grenoble");
    assert!(!session.visibility().instructors_visible());
    assert_eq!(session.dataset().len(), 1);
  }

  #[tokio::test]
  async fn finite_input_always_terminates() {
    for _ in 0..50 {
      let mut session = session(0);
      let input = BufReader::new(&b"paul\n"[..]);
      tokio::time::timeout(Duration::from_secs(2), run_lines(&mut session, input))
        .await
        .unwrap();
      assert_eq!(session.criteria().search, "paul");
    }
  }

  #[tokio::test]
  async fn empty_input_returns_at_once() {
    let mut session = session(250);
    tokio::time::timeout(
      Duration::from_millis(100),
      run_lines(&mut session, BufReader::new(&b""[..])),
    )
    .await
    .unwrap();
    assert_eq!(session.dataset().len(), 2);
  }
}
