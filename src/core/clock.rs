use std::time::Instant;

/// Millisecond time source for the animation driver
pub trait TimeSource {
    /// Milliseconds since an arbitrary fixed origin
    fn now_millis(&self) -> f64;
}

/// Wall clock - timestamps since creation plus per-frame deltas
#[derive(Debug)]
pub struct Clock {
    origin: Instant,
    last_tick: Instant,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            origin: now,
            last_tick: now,
        }
    }

    /// Get delta time since last tick and advance clock
    /// Returns delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }

    /// Reset the delta reference; the timestamp origin is kept
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for Clock {
    fn now_millis(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}
