use anyhow::{Context, Result, anyhow};

use crate::directory::RawLocation;

fn is_url(source: &str) -> bool {
  source.starts_with("http://") || source.starts_with("https://")
}

/// Loads the raw feed from a URL or a local file.
///
/// # Errors
/// Fails when the source cannot be read or is not a JSON array of locations.
pub async fn fetch(source: &str) -> Result<Vec<RawLocation>> {
  if is_url(source) {
    surf::get(source)
      .recv_json()
      .await
      .map_err(|e| anyhow!("fetching {source}: {e}"))
  } else {
    let content = tokio::fs::read_to_string(source)
      .await
      .with_context(|| format!("reading {source}"))?;
    parse(&content).with_context(|| format!("parsing {source}"))
  }
}

/// # Errors
/// Fails when `content` is not a JSON array of locations.
pub fn parse(content: &str) -> Result<Vec<RawLocation>> {
  Ok(serde_json::from_str(content)?)
}
