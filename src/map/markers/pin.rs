use super::{
  MarkerError, MarkerImage, Rgb, WHITE, diagonal_gradient, fill_circle, fill_polygon, fill_rect,
  new_pixmap, shadow_color, solid_paint, stroke_circle,
};

/// Light and dark variants of a category colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinPalette {
  pub light: Rgb,
  pub dark: Rgb,
}

/// `#D4AF37` / `#B8960C`
pub const ECOLE_PALETTE: PinPalette = PinPalette {
  light: Rgb(0xD4, 0xAF, 0x37),
  dark: Rgb(0xB8, 0x96, 0x0C),
};

/// `#00A0E1` / `#0077B6`
pub const MONITEUR_PALETTE: PinPalette = PinPalette {
  light: Rgb(0x00, 0xA0, 0xE1),
  dark: Rgb(0x00, 0x77, 0xB6),
};

/// What is drawn inside the pin's circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
  Plain,
  School,
}

/// The two category pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pin {
  Ecole,
  Moniteur,
}

impl Pin {
  #[must_use]
  pub fn all() -> &'static [Pin] {
    &[Pin::Ecole, Pin::Moniteur]
  }

  #[must_use]
  pub fn key(&self) -> &'static str {
    match self {
      Pin::Ecole => "icon-ecole",
      Pin::Moniteur => "icon-moniteur",
    }
  }

  #[must_use]
  pub fn palette(&self) -> PinPalette {
    match self {
      Pin::Ecole => ECOLE_PALETTE,
      Pin::Moniteur => MONITEUR_PALETTE,
    }
  }

  #[must_use]
  pub fn glyph(&self) -> Glyph {
    match self {
      Pin::Ecole => Glyph::School,
      Pin::Moniteur => Glyph::Plain,
    }
  }

  /// Width in pixels. Schools get the larger pin.
  #[must_use]
  pub fn size(&self) -> u32 {
    match self {
      Pin::Ecole => 40,
      Pin::Moniteur => 28,
    }
  }

  /// # Errors
  /// See `marker_pin`.
  pub fn render(&self) -> Result<MarkerImage, MarkerError> {
    marker_pin(self.palette(), self.glyph(), self.size())
  }
}

/// Height added below the circle for the tail.
const TAIL_SPACE: u32 = 10;
const TAIL_HALF_WIDTH: f32 = 6.;
const TAIL_LENGTH: f32 = 8.;
const BORDER_WIDTH: f32 = 2.5;

/// Draws a pin `size` pixels wide and `size + 10` high: a shadowed, gradient filled circle with a
/// light border and a downward tail.
///
/// # Errors
/// Returns `MarkerError::InvalidSize` for a zero `size`.
#[allow(clippy::cast_precision_loss)]
pub fn marker_pin(palette: PinPalette, glyph: Glyph, size: u32) -> Result<MarkerImage, MarkerError> {
  let mut pixmap = new_pixmap(size, size + TAIL_SPACE)?;

  let w = size as f32;
  let cx = w / 2.;
  let cy = w / 2.;
  let r = w * 0.42;

  fill_circle(&mut pixmap, cx, cy + 2., r + 1., &solid_paint(shadow_color()));
  let gradient = diagonal_gradient(cx, cy, r, &[(0., palette.light), (1., palette.dark)]);
  fill_circle(&mut pixmap, cx, cy, r, &gradient);
  stroke_circle(&mut pixmap, cx, cy, r, WHITE.color(), BORDER_WIDTH);

  let tail_y = cy + r - 1.;
  fill_polygon(
    &mut pixmap,
    &[
      (cx - TAIL_HALF_WIDTH, tail_y),
      (cx, tail_y + TAIL_LENGTH),
      (cx + TAIL_HALF_WIDTH, tail_y),
    ],
    palette.dark.color(),
  );

  if glyph == Glyph::School {
    draw_school(&mut pixmap, cx, cy, r, palette.dark);
  }

  Ok(MarkerImage::from_pixmap(&pixmap))
}

/// A white building with a roof, a door in `door` colour and two windows.
fn draw_school(pixmap: &mut tiny_skia::Pixmap, cx: f32, cy: f32, r: f32, door: Rgb) {
  let white = WHITE.color();
  let s = r * 0.55;

  let bx = cx - s * 0.65;
  let by = cy - s * 0.15;
  let bw = s * 1.3;
  let bh = s * 0.75;
  fill_rect(pixmap, bx, by, bw, bh, white);

  fill_polygon(
    pixmap,
    &[
      (cx, cy - s * 0.7),
      (bx - s * 0.1, by + 1.),
      (bx + bw + s * 0.1, by + 1.),
    ],
    white,
  );

  fill_rect(pixmap, cx - s * 0.12, by + bh * 0.4, s * 0.24, bh * 0.6, door.color());

  let window = s * 0.17;
  fill_rect(pixmap, bx + s * 0.15, by + bh * 0.2, window, window, door.color());
  fill_rect(
    pixmap,
    bx + bw - s * 0.15 - window,
    by + bh * 0.2,
    window,
    window,
    door.color(),
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pin_dimensions() {
    let ecole = Pin::Ecole.render().unwrap();
    assert_eq!((ecole.width, ecole.height), (40, 50));
    let moniteur = Pin::Moniteur.render().unwrap();
    assert_eq!((moniteur.width, moniteur.height), (28, 38));
  }

  #[test]
  fn pin_is_deterministic() {
    let a = marker_pin(ECOLE_PALETTE, Glyph::School, 40).unwrap();
    let b = marker_pin(ECOLE_PALETTE, Glyph::School, 40).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn glyph_changes_pixels() {
    let plain = marker_pin(ECOLE_PALETTE, Glyph::Plain, 40).unwrap();
    let school = marker_pin(ECOLE_PALETTE, Glyph::School, 40).unwrap();
    assert_ne!(plain.data, school.data);
  }

  #[test]
  fn pin_shape() {
    let image = Pin::Ecole.render().unwrap();
    // Corners stay transparent.
    assert_eq!(image.pixel(0, 0).map(|p| p[3]), Some(0));
    assert_eq!(image.pixel(39, 49).map(|p| p[3]), Some(0));
    // Building body beside the door is white, the door itself takes the dark colour.
    assert_eq!(image.pixel(23, 23), Some([255, 255, 255, 255]));
    let door = image.pixel(20, 23).unwrap();
    for (channel, expected) in door.iter().zip([0xB8_u8, 0x96, 0x0C, 255]) {
      assert!(channel.abs_diff(expected) <= 1, "door pixel {door:?}");
    }
    // Tail just below the circle is opaque.
    let tail = image.pixel(20, 38).unwrap();
    assert_eq!(tail[3], 255);
  }

  #[test]
  fn zero_size_is_rejected() {
    assert!(marker_pin(MONITEUR_PALETTE, Glyph::Plain, 0).is_err());
  }
}
