use serde::{Deserialize, Serialize};

use super::WGS84Coordinate;

/// An axis aligned longitude/latitude rectangle. Containment is inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
  pub min_lon: f64,
  pub max_lon: f64,
  pub min_lat: f64,
  pub max_lat: f64,
}

/// Metropolitan France.
pub const METROPOLITAN_FRANCE: GeoBounds = GeoBounds {
  min_lon: -5.5,
  max_lon: 10.0,
  min_lat: 41.0,
  max_lat: 51.5,
};

impl Default for GeoBounds {
  fn default() -> Self {
    METROPOLITAN_FRANCE
  }
}

impl GeoBounds {
  #[must_use]
  pub fn contains(&self, lon: f64, lat: f64) -> bool {
    (self.min_lon..=self.max_lon).contains(&lon) && (self.min_lat..=self.max_lat).contains(&lat)
  }

  #[must_use]
  pub fn contains_coordinate(&self, coord: &WGS84Coordinate) -> bool {
    self.contains(coord.lon, coord.lat)
  }

  #[must_use]
  pub fn center(&self) -> WGS84Coordinate {
    WGS84Coordinate {
      lat: f64::midpoint(self.min_lat, self.max_lat),
      lon: f64::midpoint(self.min_lon, self.max_lon),
    }
  }

  /// South-west and north-east corners, the order map engines expect for `fitBounds`.
  #[must_use]
  pub fn corners(&self) -> [[f64; 2]; 2] {
    [[self.min_lon, self.min_lat], [self.max_lon, self.max_lat]]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn contains_inner_point() {
    // Grenoble
    assert!(METROPOLITAN_FRANCE.contains(5.72, 45.18));
  }

  #[test]
  fn edges_are_inclusive() {
    let b = METROPOLITAN_FRANCE;
    assert!(b.contains(b.min_lon, b.min_lat));
    assert!(b.contains(b.max_lon, b.max_lat));
    assert!(b.contains(b.min_lon, b.max_lat));
  }

  #[test]
  fn outside_points_are_rejected() {
    // Guadeloupe, Réunion, just past the eastern edge.
    assert!(!METROPOLITAN_FRANCE.contains(-61.55, 16.25));
    assert!(!METROPOLITAN_FRANCE.contains(55.53, -21.11));
    assert!(!METROPOLITAN_FRANCE.contains(10.000_001, 45.0));
  }

  #[test]
  fn center_and_corners() {
    let b = METROPOLITAN_FRANCE;
    assert_eq!(b.center(), WGS84Coordinate::new(46.25, 2.25));
    assert_eq!(b.corners(), [[-5.5, 41.0], [10.0, 51.5]]);
  }
}
