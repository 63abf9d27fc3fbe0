//! Paint model shared between games and presentation backends.

pub mod color;

pub use color::Color;
