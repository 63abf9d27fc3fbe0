use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic tick counter backing a [`super::Clock`].
pub trait TimeSource {
    /// Current tick count.
    fn counter(&self) -> u64;

    /// Ticks per second. Zero means timing is unavailable.
    fn frequency(&self) -> u64;
}

/// `Instant`-based source with nanosecond ticks.
#[derive(Debug, Copy, Clone)]
pub struct InstantSource {
    origin: Instant,
}

impl InstantSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for InstantSource {
    fn counter(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn frequency(&self) -> u64 {
        1_000_000_000
    }
}

/// Manually driven source.
///
/// Clones share the same counter, so a test can keep one handle and advance time
/// while the clock under test owns another.
#[derive(Debug, Clone)]
pub struct ManualTimeSource {
    counter: Rc<Cell<u64>>,
    frequency: Rc<Cell<u64>>,
}

impl ManualTimeSource {
    pub fn new(frequency: u64) -> Self {
        Self {
            counter: Rc::new(Cell::new(0)),
            frequency: Rc::new(Cell::new(frequency)),
        }
    }

    pub fn advance(&self, ticks: u64) {
        self.counter.set(self.counter.get().saturating_add(ticks));
    }

    /// Advances by `seconds` worth of ticks at the current frequency.
    pub fn advance_secs(&self, seconds: f64) {
        let ticks = (seconds.max(0.0) * self.frequency.get() as f64).round() as u64;
        self.advance(ticks);
    }

    pub fn set_counter(&self, ticks: u64) {
        self.counter.set(ticks);
    }

    pub fn set_frequency(&self, frequency: u64) {
        self.frequency.set(frequency);
    }
}

impl TimeSource for ManualTimeSource {
    fn counter(&self) -> u64 {
        self.counter.get()
    }

    fn frequency(&self) -> u64 {
        self.frequency.get()
    }
}
