use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between longitude and latitude in the raw feed, e.g. `"5.72,45.18"`.
const POSITION_SEPARATOR: char = ',';

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoordinateError {
  #[error("expected 2 tokens separated by '{POSITION_SEPARATOR}', found {0}")]
  TokenCount(usize),
  #[error("'{0}' is not a number")]
  NotANumber(String),
  #[error("'{0}' is not a finite number")]
  NotFinite(String),
}

/// A WGS84 position as delivered by the feed.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct WGS84Coordinate {
  pub lat: f64,
  pub lon: f64,
}

impl WGS84Coordinate {
  #[must_use]
  pub fn new(lat: f64, lon: f64) -> Self {
    Self { lat, lon }
  }

  /// Exact equality comparison using bit representation
  #[must_use]
  pub fn exact_eq(&self, other: &Self) -> bool {
    self.lat.to_bits() == other.lat.to_bits() && self.lon.to_bits() == other.lon.to_bits()
  }

  /// `GeoJSON` position order.
  #[must_use]
  pub fn lon_lat(&self) -> [f64; 2] {
    [self.lon, self.lat]
  }
}

impl FromStr for WGS84Coordinate {
  type Err = CoordinateError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    parse_coordinates(s)
  }
}

/// Parses a raw `"lng,lat"` position.
///
/// Exactly two tokens are accepted and both must be finite numbers; surrounding whitespace of a
/// token is ignored.
///
/// # Errors
/// Returns a `CoordinateError` describing the first problem found.
pub fn parse_coordinates(raw: &str) -> Result<WGS84Coordinate, CoordinateError> {
  let tokens: Vec<&str> = raw.split(POSITION_SEPARATOR).collect();
  let [lon, lat] = tokens.as_slice() else {
    return Err(CoordinateError::TokenCount(tokens.len()));
  };
  Ok(WGS84Coordinate::new(parse_token(lat)?, parse_token(lon)?))
}

fn parse_token(token: &str) -> Result<f64, CoordinateError> {
  let token = token.trim();
  let value: f64 = token
    .parse()
    .map_err(|_| CoordinateError::NotANumber(token.to_string()))?;
  if value.is_finite() {
    Ok(value)
  } else {
    Err(CoordinateError::NotFinite(token.to_string()))
  }
}

/// A position on the rendered map canvas, in screen pixels.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct ScreenPoint {
  pub x: f32,
  pub y: f32,
}

impl ScreenPoint {
  #[must_use]
  pub fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }

  #[must_use]
  pub fn sq_dist(&self, p: &Self) -> f32 {
    let dx = p.x - self.x;
    let dy = p.y - self.y;
    dx * dx + dy * dy
  }
}
