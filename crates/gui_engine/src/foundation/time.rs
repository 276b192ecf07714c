//! Frame time tracking
//!
//! The GUI runtime is driven by explicit per-frame deltas rather than wall
//! clock reads, which keeps the caret blink and tooltip timers deterministic.

/// Accumulated frame clock advanced once per update tick
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    total_time: f32,
    delta_time: f32,
    frame_count: u64,
}

impl FrameClock {
    /// Create a new clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one frame
    pub fn advance(&mut self, delta_time: f32) {
        self.delta_time = delta_time;
        self.total_time += delta_time;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time in seconds
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the number of frames advanced so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
