//! Fixed-step frame clock driving the animation loop.

use std::time::{Duration, Instant};

/// One step of the [`FrameClock`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// Zero-based index of the frame this tick starts
    pub frame: u64,
    /// Simulated seconds advanced by this frame
    pub dt: f32,
    /// Simulated seconds since the clock started, including this frame
    pub time: f32,
}

/// Fixed-step clock for frame-synchronous updates.
///
/// Simulated time advances by exactly `1 / frame_rate` per tick so that
/// animations are reproducible; wall-clock time between ticks is tracked
/// separately for profiling.
#[derive(Debug)]
pub struct FrameClock {
    dt: f32,
    frame: u64,
    start: Instant,
    last_tick: Instant,
}

impl FrameClock {
    /// Create a clock ticking at `frame_rate` frames per second.
    ///
    /// A zero frame rate is treated as one frame per second.
    pub fn new(frame_rate: u32) -> Self {
        let now = Instant::now();
        Self {
            dt: 1.0 / frame_rate.max(1) as f32,
            frame: 0,
            start: now,
            last_tick: now,
        }
    }

    /// Simulated seconds per frame.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Number of frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds since the clock started.
    pub fn time(&self) -> f32 {
        self.frame as f32 * self.dt
    }

    /// Advance one frame.
    pub fn tick(&mut self) -> FrameTick {
        let frame = self.frame;
        self.frame += 1;
        self.last_tick = Instant::now();
        FrameTick {
            frame,
            dt: self.dt,
            time: self.time(),
        }
    }

    /// Number of frames needed to cover `seconds` of simulated time.
    pub fn frames_for(&self, seconds: f32) -> u64 {
        if seconds <= 0.0 {
            0
        } else {
            (seconds / self.dt).ceil() as u64
        }
    }

    /// Wall-clock time since the clock was created or reset.
    pub fn wall_elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Wall-clock time since the last tick.
    pub fn since_last_tick(&self) -> Duration {
        self.last_tick.elapsed()
    }

    /// Reset frame count and wall-clock measurements.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.frame = 0;
        self.start = now;
        self.last_tick = now;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FRAME_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_advances_fixed_step() {
        let mut clock = FrameClock::new(50);
        let first = clock.tick();
        let second = clock.tick();

        assert_eq!(first.frame, 0);
        assert_eq!(second.frame, 1);
        assert!((first.dt - 0.02).abs() < 1e-7);
        assert!((second.time - 0.04).abs() < 1e-6);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_frames_for_rounds_up() {
        let clock = FrameClock::new(10);
        assert_eq!(clock.frames_for(0.0), 0);
        assert_eq!(clock.frames_for(0.25), 3);
        assert_eq!(clock.frames_for(1.0), 10);
    }

    #[test]
    fn test_zero_frame_rate_is_clamped() {
        let clock = FrameClock::new(0);
        assert_eq!(clock.dt(), 1.0);
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::new(30);
        clock.tick();
        clock.reset();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.time(), 0.0);
    }
}
