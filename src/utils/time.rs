/// Source of per-frame elapsed time, in seconds.
pub trait FrameClock {
    /// Seconds since the previous call.
    fn next_dt(&mut self) -> f32;
}

/// Deterministic clock returning the same step every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    pub dt: f32,
    pub frame_count: u64,
}

impl FixedStep {
    #[must_use]
    pub fn new(dt: f32) -> Self {
        Self { dt, frame_count: 0 }
    }

    /// Elapsed seconds after `frame_count` steps.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.dt * self.frame_count as f32
    }
}

impl FrameClock for FixedStep {
    fn next_dt(&mut self) -> f32 {
        self.frame_count += 1;
        self.dt
    }
}
