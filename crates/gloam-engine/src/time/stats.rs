use std::collections::VecDeque;

/// Number of frame deltas kept for the averaged delta.
pub const MAX_DELTA_HISTORY: usize = 60;

/// Frames-per-second counter and averaged frame delta.
///
/// FPS is published once per accumulated second of frame time, so it reads 0 until
/// the first second has elapsed.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    history: VecDeque<f64>,
    average_delta: f64,
    fps: u32,
    frame_count: u32,
    accumulator: f64,
}

impl FrameStats {
    pub fn record(&mut self, dt: f64) {
        self.frame_count = self.frame_count.saturating_add(1);
        self.accumulator += dt;
        if self.accumulator >= 1.0 {
            self.fps = self.frame_count;
            self.frame_count = 0;
            self.accumulator -= 1.0;
        }

        self.history.push_back(dt);
        while self.history.len() > MAX_DELTA_HISTORY {
            self.history.pop_front();
        }
        self.average_delta = self.history.iter().sum::<f64>() / self.history.len() as f64;
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn average_delta(&self) -> f64 {
        self.average_delta
    }

    /// Number of deltas currently contributing to the average.
    pub fn samples(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_is_published_after_one_second() {
        let mut stats = FrameStats::default();
        for _ in 0..9 {
            stats.record(0.1);
        }
        assert_eq!(stats.fps(), 0);

        stats.record(0.1 + 1e-9);
        assert_eq!(stats.fps(), 10);
    }

    #[test]
    fn average_covers_the_last_sixty_frames() {
        let mut stats = FrameStats::default();
        for _ in 0..MAX_DELTA_HISTORY {
            stats.record(1.0);
        }
        for _ in 0..MAX_DELTA_HISTORY {
            stats.record(0.5);
        }
        assert_eq!(stats.samples(), MAX_DELTA_HISTORY);
        assert!((stats.average_delta() - 0.5).abs() < 1e-12);
    }
}
