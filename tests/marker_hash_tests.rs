use std::collections::{HashMap, HashSet};

use mcfmap::map::markers::{
  ClusterPalette, ClusterTier, Glyph, MarkerImage, Pin, cluster_badge, marker_images, marker_pin,
};
use sha2::{Digest, Sha256};

fn digest(image: &MarkerImage) -> String {
  let mut hasher = Sha256::new();
  hasher.update(image.width.to_le_bytes());
  hasher.update(image.height.to_le_bytes());
  hasher.update(&image.data);
  hex::encode(hasher.finalize())
}

#[test]
fn test_school_marker_is_byte_identical_across_calls() {
  let palette = Pin::Ecole.palette();
  let first = marker_pin(palette, Glyph::School, 40).unwrap();
  let second = marker_pin(palette, Glyph::School, 40).unwrap();
  assert_eq!(digest(&first), digest(&second));
  assert_eq!(first.data, second.data);
}

#[test]
fn test_image_set_is_reproducible() {
  let first: HashMap<String, String> = marker_images()
    .unwrap()
    .iter()
    .map(|(key, image)| (key.clone(), digest(image)))
    .collect();
  let second: HashMap<String, String> = marker_images()
    .unwrap()
    .iter()
    .map(|(key, image)| (key.clone(), digest(image)))
    .collect();
  assert_eq!(first, second);
  assert_eq!(first.len(), 10);
}

#[test]
fn test_every_image_is_distinct() {
  let digests: HashSet<String> = marker_images()
    .unwrap()
    .iter()
    .map(|(_, image)| digest(image))
    .collect();
  assert_eq!(digests.len(), 10);
}

#[test]
fn test_badge_keys_cover_palette_and_tier() {
  let keys: HashSet<String> = ClusterTier::all()
    .iter()
    .flat_map(|tier| ClusterPalette::all().iter().map(|palette| palette.key(*tier)))
    .collect();
  assert_eq!(keys.len(), 8);
  for tier in ["sm", "md", "lg", "xl"] {
    assert!(keys.contains(&format!("cluster-gold-{tier}")));
    assert!(keys.contains(&format!("cluster-blue-{tier}")));
  }
}

#[test]
fn test_badge_depends_only_on_inputs() {
  let a = cluster_badge(ClusterPalette::Gold, 60).unwrap();
  let b = cluster_badge(ClusterPalette::Gold, 60).unwrap();
  let c = cluster_badge(ClusterPalette::Gold, 76).unwrap();
  assert_eq!(digest(&a), digest(&b));
  assert_ne!(digest(&a), digest(&c));
}
