//! Mapping from the speed control to step delays.
//!
//! One formula covers every algorithm: `delay_ms = max(50, 550 - 50 * level)`,
//! so level 1 waits 500 ms, level 5 waits 300 ms and level 10 waits 50 ms.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// No two steps are ever closer together than this.
pub const MIN_DELAY_MS: u64 = 50;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 10;

/// A position of the speed control, `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SpeedLevel(u8);

impl SpeedLevel {
    /// Clamp `level` into `1..=10`.
    pub fn new(level: u8) -> Self {
        Self(level.clamp(MIN_LEVEL, MAX_LEVEL))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn delay_ms(self) -> u64 {
        (550 - 50 * u64::from(self.0)).max(MIN_DELAY_MS)
    }

    pub fn delay(self) -> Duration {
        Duration::from_millis(self.delay_ms())
    }
}

impl Default for SpeedLevel {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for SpeedLevel {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            Ok(Self(level))
        } else {
            Err(format!("speed level must be within {}..={}, got {}", MIN_LEVEL, MAX_LEVEL, level))
        }
    }
}

impl From<SpeedLevel> for u8 {
    fn from(level: SpeedLevel) -> u8 {
        level.0
    }
}

/// Raise a requested delay to `floor`, which itself never drops below [`MIN_DELAY_MS`].
pub fn clamp_delay(ms: u64, floor: u64) -> u64 {
    ms.max(floor.max(MIN_DELAY_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_endpoints() {
        assert_eq!(SpeedLevel::new(1).delay_ms(), 500);
        assert_eq!(SpeedLevel::new(5).delay_ms(), 300);
        assert_eq!(SpeedLevel::new(10).delay_ms(), 50);
    }

    #[test]
    fn faster_levels_never_wait_longer() {
        let delays: Vec<u64> = (MIN_LEVEL..=MAX_LEVEL).map(|l| SpeedLevel::new(l).delay_ms()).collect();
        assert!(delays.windows(2).all(|w| w[0] > w[1]));
        assert!(delays.iter().all(|&d| d >= MIN_DELAY_MS));
    }

    #[test]
    fn levels_are_clamped() {
        assert_eq!(SpeedLevel::new(0).get(), 1);
        assert_eq!(SpeedLevel::new(200).get(), 10);
        assert!(SpeedLevel::try_from(11).is_err());
    }

    #[test]
    fn requested_delays_respect_floor() {
        assert_eq!(clamp_delay(0, MIN_DELAY_MS), 50);
        assert_eq!(clamp_delay(120, MIN_DELAY_MS), 120);
        assert_eq!(clamp_delay(60, 100), 100);
        assert_eq!(clamp_delay(0, 10), 50);
    }
}
