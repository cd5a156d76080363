//! Time management utilities

use std::time::{Duration, Instant};

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

/// Fixed-timestep accumulator
///
/// Frame time is fed in with [`FixedTimestep::advance`], which returns how many
/// simulation ticks are due. Whatever is left over in the accumulator is the
/// progress towards the next tick, exposed as [`FixedTimestep::interpolation`].
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick: Duration,
    max_frame_time: Duration,
    accumulator: Duration,
    tick_count: u64,
}

impl FixedTimestep {
    /// Create an accumulator ticking `tick_rate` times per second
    ///
    /// A single frame never contributes more than `max_frame_time`, so a stall
    /// (debugger, window drag) cannot trigger a burst of catch-up ticks.
    pub fn new(tick_rate: u32, max_frame_time: Duration) -> Self {
        let tick = Duration::from_secs_f64(1.0 / f64::from(tick_rate.max(1)));
        Self {
            tick,
            max_frame_time: max_frame_time.max(tick),
            accumulator: Duration::ZERO,
            tick_count: 0,
        }
    }

    /// Tick length in seconds, the `dt` handed to fixed updates
    pub fn tick_seconds(&self) -> f32 {
        self.tick.as_secs_f32()
    }

    /// Total ticks consumed so far
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Add frame time and return the number of ticks that became due
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.accumulator += frame_time.min(self.max_frame_time);

        let mut ticks = 0;
        while self.accumulator >= self.tick {
            self.accumulator -= self.tick;
            ticks += 1;
        }
        self.tick_count += u64::from(ticks);
        ticks
    }

    /// Progress towards the next tick, in [0, 1)
    pub fn interpolation(&self) -> f32 {
        (self.accumulator.as_secs_f64() / self.tick.as_secs_f64()) as f32
    }
}
