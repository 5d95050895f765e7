use serde::{Deserialize, Serialize};

use super::{
  MarkerError, MarkerImage, Rgb, WHITE, diagonal_gradient, fill_circle, new_pixmap, shadow_color,
  solid_paint, stroke_circle,
};

/// Badge colour. Gold whenever a cluster holds at least one school, whatever the ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterPalette {
  Gold,
  Blue,
}

impl ClusterPalette {
  #[must_use]
  pub fn all() -> &'static [ClusterPalette] {
    &[ClusterPalette::Gold, ClusterPalette::Blue]
  }

  #[must_use]
  pub fn for_school_count(ecole_count: u32) -> Self {
    if ecole_count >= 1 {
      ClusterPalette::Gold
    } else {
      ClusterPalette::Blue
    }
  }

  #[must_use]
  pub fn name(&self) -> &'static str {
    match self {
      ClusterPalette::Gold => "gold",
      ClusterPalette::Blue => "blue",
    }
  }

  /// Image key for this palette at `tier`, e.g. `cluster-gold-md`.
  #[must_use]
  pub fn key(&self, tier: ClusterTier) -> String {
    format!("cluster-{}-{}", self.name(), tier.suffix())
  }

  fn stops(self) -> [(f32, Rgb); 3] {
    match self {
      ClusterPalette::Gold => [
        (0., Rgb(0xFF, 0xD7, 0x00)),
        (0.5, Rgb(0xDA, 0xA5, 0x20)),
        (1., Rgb(0xB8, 0x86, 0x0B)),
      ],
      ClusterPalette::Blue => [
        (0., Rgb(0x33, 0xC1, 0xFF)),
        (0.5, Rgb(0x00, 0xA0, 0xE1)),
        (1., Rgb(0x00, 0x77, 0xB6)),
      ],
    }
  }

  fn border(self) -> (Rgb, f32) {
    match self {
      ClusterPalette::Gold => (Rgb(0x8B, 0x69, 0x14), 1.5),
      ClusterPalette::Blue => (WHITE, 2.5),
    }
  }
}

/// Size class of a cluster badge, chosen by point count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterTier {
  Sm,
  Md,
  Lg,
  Xl,
}

impl ClusterTier {
  #[must_use]
  pub fn all() -> &'static [ClusterTier] {
    &[ClusterTier::Sm, ClusterTier::Md, ClusterTier::Lg, ClusterTier::Xl]
  }

  /// Lowest point count of every tier above `Sm`. A count equal to a threshold belongs to the
  /// larger tier.
  pub const THRESHOLDS: [u32; 3] = [20, 50, 100];

  #[must_use]
  pub fn for_point_count(point_count: u32) -> Self {
    match point_count {
      n if n < Self::THRESHOLDS[0] => ClusterTier::Sm,
      n if n < Self::THRESHOLDS[1] => ClusterTier::Md,
      n if n < Self::THRESHOLDS[2] => ClusterTier::Lg,
      _ => ClusterTier::Xl,
    }
  }

  #[must_use]
  pub fn suffix(&self) -> &'static str {
    match self {
      ClusterTier::Sm => "sm",
      ClusterTier::Md => "md",
      ClusterTier::Lg => "lg",
      ClusterTier::Xl => "xl",
    }
  }

  /// Badge diameter in pixels.
  #[must_use]
  pub fn diameter(&self) -> u32 {
    match self {
      ClusterTier::Sm => 40,
      ClusterTier::Md => 48,
      ClusterTier::Lg => 60,
      ClusterTier::Xl => 76,
    }
  }

  /// Size of the count label.
  #[must_use]
  pub fn text_size(&self) -> u32 {
    match self {
      ClusterTier::Sm => 13,
      ClusterTier::Md => 14,
      ClusterTier::Lg => 16,
      ClusterTier::Xl => 18,
    }
  }
}

/// Draws a round, shadowed, gradient filled badge of the given diameter.
///
/// # Errors
/// Returns `MarkerError::InvalidSize` for a zero diameter.
#[allow(clippy::cast_precision_loss)]
pub fn cluster_badge(palette: ClusterPalette, diameter: u32) -> Result<MarkerImage, MarkerError> {
  let mut pixmap = new_pixmap(diameter, diameter)?;

  let d = diameter as f32;
  let cx = d / 2.;
  let cy = d / 2.;
  let r = d / 2. - 2.;

  fill_circle(&mut pixmap, cx + 1., cy + 1.5, r, &solid_paint(shadow_color()));
  fill_circle(&mut pixmap, cx, cy, r, &diagonal_gradient(cx, cy, r, &palette.stops()));
  let (border, width) = palette.border();
  stroke_circle(&mut pixmap, cx, cy, r, border.color(), width);

  Ok(MarkerImage::from_pixmap(&pixmap))
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[rstest]
  #[case(2, ClusterTier::Sm)]
  #[case(19, ClusterTier::Sm)]
  #[case(20, ClusterTier::Md)]
  #[case(49, ClusterTier::Md)]
  #[case(50, ClusterTier::Lg)]
  #[case(99, ClusterTier::Lg)]
  #[case(100, ClusterTier::Xl)]
  #[case(5000, ClusterTier::Xl)]
  fn tier_thresholds(#[case] point_count: u32, #[case] expected: ClusterTier) {
    assert_eq!(ClusterTier::for_point_count(point_count), expected);
  }

  #[test]
  fn any_school_makes_gold() {
    assert_eq!(ClusterPalette::for_school_count(0), ClusterPalette::Blue);
    assert_eq!(ClusterPalette::for_school_count(1), ClusterPalette::Gold);
    assert_eq!(ClusterPalette::for_school_count(250), ClusterPalette::Gold);
  }

  #[test]
  fn keys() {
    assert_eq!(ClusterPalette::Gold.key(ClusterTier::Sm), "cluster-gold-sm");
    assert_eq!(ClusterPalette::Blue.key(ClusterTier::Xl), "cluster-blue-xl");
  }

  #[test]
  fn badge_dimensions_and_palettes() {
    for tier in ClusterTier::all() {
      let gold = cluster_badge(ClusterPalette::Gold, tier.diameter()).unwrap();
      let blue = cluster_badge(ClusterPalette::Blue, tier.diameter()).unwrap();
      assert_eq!((gold.width, gold.height), (tier.diameter(), tier.diameter()));
      assert_ne!(gold.data, blue.data);
    }
  }

  #[test]
  fn badge_center_is_opaque() {
    let badge = cluster_badge(ClusterPalette::Blue, 40).unwrap();
    assert_eq!(badge.pixel(20, 20).map(|p| p[3]), Some(255));
    assert_eq!(badge.pixel(0, 0).map(|p| p[3]), Some(0));
  }
}
