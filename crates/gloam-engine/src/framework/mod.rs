//! Session controller.
//!
//! `Framework::run` brings up native subsystems, configures the window, loads the
//! game and drives the frame loop until the window closes or a callback faults.
//! Teardown always runs before `run` returns.

mod events;
mod fault;
mod guard;
mod run;
mod session;

pub use fault::{Callback, ErrorHandler, FaultKind, GameFault};
pub use guard::SubsystemGuard;
pub use run::{Framework, RunOutcome, RunSummary};
pub use session::SessionState;
