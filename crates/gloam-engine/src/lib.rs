//! Gloam engine crate.
//!
//! Drives a game through its lifecycle: subsystem bring-up, window setup, the
//! fixed-order frame loop, event dispatch and orderly shutdown. The native side
//! lives behind [`platform::Platform`].

pub mod config;
pub mod core;
pub mod error;
pub mod framework;
pub mod input;
pub mod joystick;
pub mod logging;
pub mod paint;
pub mod platform;
pub mod time;
pub mod window;

#[cfg(any(target_os = "windows", target_os = "macos", target_os = "linux"))]
pub mod gpu;

pub use crate::core::{Context, Game};
pub use error::{EngineError, EngineResult};
pub use framework::{Framework, RunOutcome, RunSummary};
