use std::path::PathBuf;

use dirs::home_dir;
use log::error;

use crate::map::coordinates::GeoBounds;
use crate::map::style::ClusterOptions;

const DEFAULT_FEED_URL: &str = "jsonmap.json";
const DEFAULT_TRACKING_URL: &str = "https://mcf-tracking.workers.dev/track";
const DEFAULT_PARENT_ORIGIN: &str = "https://www.moniteurcycliste.com";
const DEFAULT_CONTACT_URL: &str = "https://www.moniteurcycliste.com/contactcarto";

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
  #[serde(skip)]
  pub config_path: Option<PathBuf>,
  pub bounds: GeoBounds,
  pub initial_zoom: f64,
  /// Minimum zoom when easing to a selected pin.
  pub fly_zoom: f64,
  pub cluster: ClusterOptions,
  pub search_debounce_ms: u64,
  pub feed_url: String,
  pub tracking_url: String,
  pub parent_origin: String,
  pub contact_url: String,
}

/// Values that only the environment can set.
#[derive(Debug, Default)]
struct EnvOverrides {
  config_path: Option<PathBuf>,
  feed_url: Option<String>,
  tracking_url: Option<String>,
  parent_origin: Option<String>,
}

impl Config {
  /// Defaults, then the config file, then the environment.
  #[must_use]
  pub fn new() -> Self {
    let from_env = Self::from_env();
    let mut config = Self::from_file(from_env.config_path.clone()).unwrap_or_default();
    config.config_path = from_env.config_path.clone().or(config.config_path);
    config.merge(from_env)
  }

  fn from_env() -> EnvOverrides {
    EnvOverrides {
      config_path: Self::config_dir(),
      feed_url: std::env::var("MCFMAP_FEED_URL").ok(),
      tracking_url: std::env::var("MCFMAP_TRACKING_URL").ok(),
      parent_origin: std::env::var("MCFMAP_PARENT_ORIGIN").ok(),
    }
  }

  fn config_dir() -> Option<PathBuf> {
    std::env::var("MCFMAP_CONFIG")
      .ok()
      .map(PathBuf::from)
      .or_else(|| home_dir().map(|p| p.join(".config").join("mcfmap")))
  }

  fn merge(mut self, env: EnvOverrides) -> Self {
    if let Some(feed_url) = env.feed_url {
      self.feed_url = feed_url;
    }
    if let Some(tracking_url) = env.tracking_url {
      self.tracking_url = tracking_url;
    }
    if let Some(parent_origin) = env.parent_origin {
      self.parent_origin = parent_origin;
    }
    self
  }

  fn from_file(config_path: Option<PathBuf>) -> Option<Self> {
    let config_path = config_path?.join("config.json");
    Self::parse(&std::fs::read_to_string(&config_path).ok()?)
  }

  fn parse(content: &str) -> Option<Self> {
    serde_json::from_str(content)
      .inspect_err(|e| error!("Failed to read config file: {e}"))
      .ok()
  }

  /// Writes the current settings to `config.json` unless the file already exists.
  pub fn init_cfg_file(&self) {
    let Some(path) = &self.config_path else {
      return;
    };
    if !path.exists() {
      let _ = std::fs::create_dir_all(path).inspect_err(|e| {
        error!("Failed to create config directory: {e}");
      });
    }

    let path = path.join("config.json");
    if !path.exists() {
      if let Ok(config) = serde_json::to_string_pretty(self) {
        let _ = std::fs::write(path, config).inspect_err(|e| {
          error!("Failed to write config file: {e}");
        });
      } else {
        error!("Failed to serialize config");
      }
    }
  }

  #[must_use]
  pub fn search_debounce(&self) -> std::time::Duration {
    std::time::Duration::from_millis(self.search_debounce_ms)
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      config_path: None,
      bounds: GeoBounds::default(),
      initial_zoom: 6.,
      fly_zoom: 12.,
      cluster: ClusterOptions::default(),
      search_debounce_ms: 250,
      feed_url: DEFAULT_FEED_URL.to_string(),
      tracking_url: DEFAULT_TRACKING_URL.to_string(),
      parent_origin: DEFAULT_PARENT_ORIGIN.to_string(),
      contact_url: DEFAULT_CONTACT_URL.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use assert_approx_eq::assert_approx_eq;
  use crate::map::coordinates::METROPOLITAN_FRANCE;

  #[test]
  fn defaults() {
    let config = Config::default();
    assert_eq!(config.bounds, METROPOLITAN_FRANCE);
    assert_eq!(config.cluster, ClusterOptions { max_zoom: 13, radius: 55 });
    assert_eq!(config.search_debounce(), std::time::Duration::from_millis(250));
    assert_eq!(config.parent_origin, "https://www.moniteurcycliste.com");
  }

  #[test]
  fn partial_file_keeps_defaults() {
    let config = Config::parse(r#"{"fly_zoom": 14, "feed_url": "https://example.org/map.json"}"#).unwrap();
    assert_approx_eq!(config.fly_zoom, 14.);
    assert_eq!(config.feed_url, "https://example.org/map.json");
    assert_eq!(config.contact_url, DEFAULT_CONTACT_URL);
  }

  #[test]
  fn broken_file_is_ignored() {
    assert_eq!(Config::parse("{ nope"), None);
  }

  #[test]
  fn environment_wins() {
    let config = Config::default().merge(EnvOverrides {
      tracking_url: Some("https://t.example/track".to_string()),
      ..EnvOverrides::default()
    });
    assert_eq!(config.tracking_url, "https://t.example/track");
    assert_eq!(config.feed_url, DEFAULT_FEED_URL);
  }

  #[test]
  fn writes_default_file_once() {
    let dir = std::env::temp_dir().join(format!("mcfmap-config-{}", std::process::id()));
    let config = Config {
      config_path: Some(dir.clone()),
      ..Config::default()
    };
    config.init_cfg_file();
    let written = std::fs::read_to_string(dir.join("config.json")).unwrap();
    let back = Config::parse(&written).unwrap();
    assert_eq!(back.feed_url, config.feed_url);
    let _ = std::fs::remove_dir_all(dir);
  }
}
