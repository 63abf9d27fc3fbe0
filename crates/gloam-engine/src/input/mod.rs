//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose backend types.
//! Backends translate native events into `PlatformEvent`s using these identifiers.

mod state;
mod types;

pub use state::InputState;
pub use types::{KeySymbol, MouseButton, Scancode};
