mod boxes;
mod coords;

/// Geographic bounding boxes.
pub use boxes::*;
/// Coordinates.
pub use coords::*;
