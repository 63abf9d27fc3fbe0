use std::fmt;

use super::source::TimeSource;
use super::stats::FrameStats;

/// Upper bound for a single frame delta, in seconds.
///
/// Long stalls (debugger pauses, window drags, minimization) would otherwise feed
/// one huge delta into the simulation.
pub const MAX_FRAME_DURATION: f64 = 1.0 / 15.0;

/// Frame clock driven by the session controller.
///
/// Elapsed time is measured from the moment the clock is created. `initialize()`
/// captures the frame baseline; each `step()` then reports the clamped delta since
/// the previous step.
pub struct Clock {
    source: Box<dyn TimeSource>,
    origin: u64,
    frequency: u64,
    last_step: Option<u64>,
    current_delta: f64,
    stats: FrameStats,
}

impl Clock {
    pub fn new(source: Box<dyn TimeSource>) -> Self {
        let origin = source.counter();
        let frequency = source.frequency();
        Self {
            source,
            origin,
            frequency,
            last_step: None,
            current_delta: 0.0,
            stats: FrameStats::default(),
        }
    }

    /// Captures the tick frequency and the frame baseline, clearing frame statistics.
    pub fn initialize(&mut self) {
        self.frequency = self.source.frequency();
        if self.frequency == 0 {
            log::warn!("time source reports a zero frequency; frame deltas will be 0");
        }
        self.last_step = Some(self.source.counter());
        self.current_delta = 0.0;
        self.stats.reset();
    }

    /// Advances the frame baseline and returns the seconds since the previous step.
    ///
    /// Returns 0 when there is no baseline yet or the frequency is 0, and never more
    /// than [`MAX_FRAME_DURATION`].
    pub fn step(&mut self) -> f64 {
        let now = self.source.counter();

        let dt = match self.last_step {
            Some(last) if self.frequency > 0 => {
                now.saturating_sub(last) as f64 / self.frequency as f64
            }
            _ => 0.0,
        };

        self.last_step = Some(now);
        self.current_delta = dt.min(MAX_FRAME_DURATION);
        self.current_delta
    }

    /// Seconds elapsed since the clock was created.
    pub fn time(&self) -> f64 {
        if self.frequency == 0 {
            return 0.0;
        }
        self.source.counter().saturating_sub(self.origin) as f64 / self.frequency as f64
    }

    /// Delta returned by the latest `step()`.
    pub fn delta(&self) -> f64 {
        self.current_delta
    }

    pub fn fps(&self) -> u32 {
        self.stats.fps()
    }

    pub fn average_delta(&self) -> f64 {
        self.stats.average_delta()
    }

    /// Feeds a frame delta into the FPS counter and the averaged delta window.
    pub fn record_frame(&mut self, dt: f64) {
        self.stats.record(dt);
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("origin", &self.origin)
            .field("frequency", &self.frequency)
            .field("last_step", &self.last_step)
            .field("current_delta", &self.current_delta)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualTimeSource;

    fn manual_clock(frequency: u64) -> (Clock, ManualTimeSource) {
        let source = ManualTimeSource::new(frequency);
        (Clock::new(Box::new(source.clone())), source)
    }

    #[test]
    fn step_before_initialize_is_zero() {
        let (mut clock, source) = manual_clock(1000);
        source.advance(500);
        assert_eq!(clock.step(), 0.0);
    }

    #[test]
    fn first_step_after_initialize_measures_from_baseline() {
        let (mut clock, source) = manual_clock(1000);
        clock.initialize();
        source.advance(16);
        assert!((clock.step() - 0.016).abs() < 1e-9);
        assert!((clock.delta() - 0.016).abs() < 1e-9);
    }

    #[test]
    fn long_stall_is_clamped() {
        let (mut clock, source) = manual_clock(1000);
        clock.initialize();
        source.advance(200);
        assert_eq!(clock.step(), MAX_FRAME_DURATION);

        source.advance(10);
        assert!((clock.step() - 0.010).abs() < 1e-9);
    }

    #[test]
    fn zero_frequency_yields_zero_everywhere() {
        let (mut clock, source) = manual_clock(0);
        clock.initialize();
        source.advance(1_000_000);
        assert_eq!(clock.step(), 0.0);
        assert_eq!(clock.time(), 0.0);
    }

    #[test]
    fn counter_going_backwards_does_not_underflow() {
        let (mut clock, source) = manual_clock(1000);
        source.set_counter(5_000);
        clock.initialize();
        source.set_counter(4_000);
        assert_eq!(clock.step(), 0.0);
    }

    #[test]
    fn time_is_measured_from_creation_not_initialize() {
        let (mut clock, source) = manual_clock(1000);
        source.advance(2_000);
        clock.initialize();
        source.advance(500);
        assert!((clock.time() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn initialize_clears_frame_stats() {
        let (mut clock, _source) = manual_clock(1000);
        clock.record_frame(0.5);
        clock.record_frame(0.6);
        assert_eq!(clock.fps(), 2);
        clock.initialize();
        assert_eq!(clock.fps(), 0);
        assert_eq!(clock.average_delta(), 0.0);
    }
}
