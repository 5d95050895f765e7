/// Contains everything needed to handle coordinates.
pub mod coordinates;
/// The boundary to the rendering engine.
pub mod engine;
/// The `GeoJSON` dataset handed to the engine.
pub mod feature_collection;
/// Click and hover resolution.
pub mod interaction;
pub mod markers;
/// Source and layer declarations.
pub mod style;
