//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the session controller and
//! user games. It avoids leaking backend internals into user code and provides a
//! consistent per-callback context.

mod ctx;
mod game;

pub use ctx::Context;
pub use game::Game;
