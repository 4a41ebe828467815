use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Tick {
    pub frame: u64,
}

/// Frame budget of the render loop at 60 fps.
pub const TICK_MS: u64 = 16;

impl Tick {
    pub fn new() -> Self {
        Tick { frame: 0 }
    }

    pub fn next(&self) -> Self {
        Tick { frame: self.frame + 1 }
    }
}

impl Default for Tick {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic seconds since the clock was created.
/// The kernel only ever sees `f64` seconds so tests can drive time by hand.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self { origin: Instant::now() }
    }

    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}
