//! Time subsystem.
//!
//! Provides the frame clock driven by the session controller plus the tick sources
//! it can be built on. Intended usage:
//! - one `Clock` per run, created from the platform's `TimeSource`
//! - `initialize()` once before the loop, `step()` once per frame

mod clock;
mod source;
mod stats;

pub use clock::{Clock, MAX_FRAME_DURATION};
pub use source::{InstantSource, ManualTimeSource, TimeSource};
pub use stats::{FrameStats, MAX_DELTA_HISTORY};

use std::time::Duration;

/// Blocks the calling thread for `seconds`.
///
/// This pauses the entire thread: no events are processed and nothing is drawn while
/// sleeping, so avoid it inside `update`/`draw` when responsiveness matters.
/// Non-positive or non-finite durations return immediately.
pub fn sleep(seconds: f64) {
    if seconds.is_nan() || seconds <= 0.0 {
        return;
    }

    if let Ok(duration) = Duration::try_from_secs_f64(seconds) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sleep_ignores_non_positive_and_nan() {
        let start = Instant::now();
        sleep(-5.0);
        sleep(0.0);
        sleep(f64::NAN);
        sleep(f64::INFINITY);
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn sleep_blocks_for_at_least_the_duration() {
        let start = Instant::now();
        sleep(0.01);
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
