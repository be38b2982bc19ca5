// Adaptive button polling
//
//   active (settling, gesture pending): 10ms, needed for debounce and
//                                       click timing
//   recently active:                    50ms
//   idle:                               100ms
// Any activity snaps straight back to fast.

use core::fmt;

use embassy_time::Duration;

/// Base poll interval (ms).
pub const BASE_TICK_MS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollRate {
    #[default]
    Fast,
    Normal,
    Slow,
}

impl PollRate {
    pub const fn interval_ms(self) -> u64 {
        match self {
            PollRate::Fast => BASE_TICK_MS,
            PollRate::Normal => BASE_TICK_MS * 5,
            PollRate::Slow => BASE_TICK_MS * 10,
        }
    }
}

impl fmt::Display for PollRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollRate::Fast => write!(f, "Fast({}ms)", self.interval_ms()),
            PollRate::Normal => write!(f, "Normal({}ms)", self.interval_ms()),
            PollRate::Slow => write!(f, "Slow({}ms)", self.interval_ms()),
        }
    }
}

// consecutive idle polls before stepping down
const FAST_TO_NORMAL: u32 = 20; // 200ms
const NORMAL_TO_SLOW: u32 = 20; // 1s

pub struct AdaptivePoller {
    rate: PollRate,
    idle_count: u32,
}

impl Default for AdaptivePoller {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptivePoller {
    pub const fn new() -> Self {
        Self {
            rate: PollRate::Fast,
            idle_count: 0,
        }
    }

    /// Record one poll and return how long to wait before the next.
    pub fn next_interval(&mut self, active: bool) -> Duration {
        if active {
            self.rate = PollRate::Fast;
            self.idle_count = 0;
        } else {
            self.idle_count = self.idle_count.saturating_add(1);
            match self.rate {
                PollRate::Fast if self.idle_count >= FAST_TO_NORMAL => {
                    self.rate = PollRate::Normal;
                    self.idle_count = 0;
                }
                PollRate::Normal if self.idle_count >= NORMAL_TO_SLOW => {
                    self.rate = PollRate::Slow;
                }
                _ => {}
            }
        }
        Duration::from_millis(self.rate.interval_ms())
    }

    pub fn rate(&self) -> PollRate {
        self.rate
    }
}
