//! Rasterized marker pins and cluster badges.
//!
//! Every image is a pure function of its palette, glyph and size: the same inputs always give the
//! same pixels, so the images can be checked by hashing.

mod badge;
mod pin;

pub use badge::{ClusterPalette, ClusterTier, cluster_badge};
pub use pin::{Glyph, Pin, PinPalette, marker_pin};

use thiserror::Error;
use tiny_skia::{
  Color, FillRule, GradientStop, LinearGradient, Paint, PathBuilder, Pixmap, Point, SpreadMode,
  Stroke, Transform,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MarkerError {
  #[error("cannot allocate a {0}x{1} image")]
  InvalidSize(u32, u32),
}

/// An opaque colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
  #[must_use]
  pub fn color(self) -> Color {
    Color::from_rgba8(self.0, self.1, self.2, 255)
  }
}

const WHITE: Rgb = Rgb(255, 255, 255);

/// `rgba(0,0,0,0.18)`
fn shadow_color() -> Color {
  Color::from_rgba8(0, 0, 0, 46)
}

/// A width, height and tightly packed, non-premultiplied RGBA buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerImage {
  pub width: u32,
  pub height: u32,
  pub data: Vec<u8>,
}

impl MarkerImage {
  fn from_pixmap(pixmap: &Pixmap) -> Self {
    let data = pixmap
      .pixels()
      .iter()
      .flat_map(|p| {
        let c = p.demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
      })
      .collect();
    Self {
      width: pixmap.width(),
      height: pixmap.height(),
      data,
    }
  }

  /// RGBA value at `(x, y)`, if inside the image.
  #[cfg(test)]
  pub(crate) fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
    if x >= self.width || y >= self.height {
      return None;
    }
    let idx = (y as usize * self.width as usize + x as usize) * 4;
    self
      .data
      .get(idx..idx + 4)
      .and_then(|p| p.try_into().ok())
  }
}

/// All images the map layers refer to, keyed the way the layers reference them.
///
/// # Errors
/// Fails only if an image cannot be allocated.
pub fn marker_images() -> Result<Vec<(String, MarkerImage)>, MarkerError> {
  let mut images = Vec::with_capacity(2 + 2 * ClusterTier::all().len());
  for pin in Pin::all() {
    images.push((pin.key().to_string(), pin.render()?));
  }
  for tier in ClusterTier::all() {
    for palette in ClusterPalette::all() {
      images.push((palette.key(*tier), cluster_badge(*palette, tier.diameter())?));
    }
  }
  Ok(images)
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap, MarkerError> {
  Pixmap::new(width, height).ok_or(MarkerError::InvalidSize(width, height))
}

fn solid_paint(color: Color) -> Paint<'static> {
  let mut paint = Paint::default();
  paint.set_color(color);
  paint.anti_alias = true;
  paint
}

/// A gradient running from the top-left to the bottom-right of the circle's bounding square.
fn diagonal_gradient(cx: f32, cy: f32, r: f32, stops: &[(f32, Rgb)]) -> Paint<'static> {
  let mut paint = Paint::default();
  paint.anti_alias = true;
  let gradient_stops = stops
    .iter()
    .map(|(pos, rgb)| GradientStop::new(*pos, rgb.color()))
    .collect();
  match LinearGradient::new(
    Point::from_xy(cx - r, cy - r),
    Point::from_xy(cx + r, cy + r),
    gradient_stops,
    SpreadMode::Pad,
    Transform::identity(),
  ) {
    Some(shader) => paint.shader = shader,
    None => {
      if let Some((_, last)) = stops.last() {
        paint.set_color(last.color());
      }
    }
  }
  paint
}

fn fill_circle(pixmap: &mut Pixmap, cx: f32, cy: f32, r: f32, paint: &Paint) {
  if let Some(path) = PathBuilder::from_circle(cx, cy, r) {
    pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
  }
}

fn stroke_circle(pixmap: &mut Pixmap, cx: f32, cy: f32, r: f32, color: Color, width: f32) {
  if let Some(path) = PathBuilder::from_circle(cx, cy, r) {
    let stroke = Stroke {
      width,
      ..Stroke::default()
    };
    pixmap.stroke_path(&path, &solid_paint(color), &stroke, Transform::identity(), None);
  }
}

fn fill_polygon(pixmap: &mut Pixmap, points: &[(f32, f32)], color: Color) {
  let Some(((x0, y0), rest)) = points.split_first() else {
    return;
  };
  let mut pb = PathBuilder::new();
  pb.move_to(*x0, *y0);
  for (x, y) in rest {
    pb.line_to(*x, *y);
  }
  pb.close();
  if let Some(path) = pb.finish() {
    pixmap.fill_path(
      &path,
      &solid_paint(color),
      FillRule::Winding,
      Transform::identity(),
      None,
    );
  }
}

fn fill_rect(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, color: Color) {
  if let Some(rect) = tiny_skia::Rect::from_xywh(x, y, w, h) {
    pixmap.fill_rect(rect, &solid_paint(color), Transform::identity(), None);
  }
}
