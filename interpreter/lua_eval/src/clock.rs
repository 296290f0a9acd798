//! Clock abstraction.
//!
//! Part of the engine's embedder-provided state. The fixed variant makes
//! time-dependent behavior deterministic in tests.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of timestamps for the engine.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    /// The host's system clock.
    System,
    /// A fixed instant, in milliseconds since the epoch.
    Fixed(u64),
}

impl Clock {
    /// Milliseconds since the Unix epoch.
    pub fn now_millis(&self) -> u64 {
        match self {
            Clock::System => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
            Clock::Fixed(millis) => *millis,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System
    }
}
