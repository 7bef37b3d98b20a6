//! Per-side game clocks.

use chess_core::Color;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of charging elapsed time to a side's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStatus {
    /// Time remains (or the clock is unlimited).
    Running,
    /// The side's flag fell; its remaining time is now zero.
    Flagged,
}

/// Remaining time and increment for both sides.
///
/// `None` remaining means unlimited time for that side; an unlimited clock
/// never flags. The clock does not read wall time itself — the caller
/// computes the elapsed duration between moves and charges it explicitly,
/// which keeps the engine free of hidden time sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    remaining: [Option<Duration>; 2],
    increment: Option<Duration>,
}

impl GameClock {
    /// A clock with unlimited time for both sides.
    pub fn unlimited() -> Self {
        GameClock {
            remaining: [None, None],
            increment: None,
        }
    }

    /// A clock where both sides start with `initial` time and gain
    /// `increment` after each of their moves.
    pub fn with_time_control(initial: Duration, increment: Option<Duration>) -> Self {
        GameClock {
            remaining: [Some(initial), Some(initial)],
            increment,
        }
    }

    /// Returns the remaining time for a side, or `None` if unlimited.
    pub fn remaining(&self, color: Color) -> Option<Duration> {
        self.remaining[color.index()]
    }

    /// Returns the per-move increment, if any.
    pub fn increment(&self) -> Option<Duration> {
        self.increment
    }

    /// Returns true if neither side is on a timed clock.
    pub fn is_unlimited(&self) -> bool {
        self.remaining.iter().all(Option::is_none)
    }

    /// Returns true if charging `elapsed` to this side would drop its
    /// remaining time to zero or below. Pure, so a flag-fall can be detected
    /// before any state changes.
    pub fn flags(&self, color: Color, elapsed: Duration) -> bool {
        match self.remaining[color.index()] {
            Some(remaining) => elapsed >= remaining,
            None => false,
        }
    }

    /// Charges `elapsed` to a side: subtracts it from the remaining time,
    /// then adds the increment. On a flag-fall the remaining time is pinned
    /// at zero and no increment applies.
    pub fn charge(&mut self, color: Color, elapsed: Duration) -> ClockStatus {
        let Some(remaining) = self.remaining[color.index()] else {
            return ClockStatus::Running;
        };
        if elapsed >= remaining {
            self.remaining[color.index()] = Some(Duration::ZERO);
            return ClockStatus::Flagged;
        }
        let mut left = remaining - elapsed;
        if let Some(inc) = self.increment {
            left += inc;
        }
        self.remaining[color.index()] = Some(left);
        ClockStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn unlimited_never_flags() {
        let mut clock = GameClock::unlimited();
        assert!(clock.is_unlimited());
        assert!(!clock.flags(Color::White, Duration::from_secs(1_000_000)));
        assert_eq!(
            clock.charge(Color::White, Duration::from_secs(1_000_000)),
            ClockStatus::Running
        );
        assert_eq!(clock.remaining(Color::White), None);
    }

    #[test]
    fn charge_subtracts_then_increments() {
        let mut clock = GameClock::with_time_control(Duration::from_secs(60), Some(2 * SEC));
        assert_eq!(clock.charge(Color::White, 10 * SEC), ClockStatus::Running);
        assert_eq!(clock.remaining(Color::White), Some(52 * SEC));
        // Black untouched.
        assert_eq!(clock.remaining(Color::Black), Some(60 * SEC));
    }

    #[test]
    fn exact_exhaustion_flags() {
        let mut clock = GameClock::with_time_control(10 * SEC, Some(5 * SEC));
        assert!(clock.flags(Color::Black, 10 * SEC));
        assert_eq!(clock.charge(Color::Black, 10 * SEC), ClockStatus::Flagged);
        // Pinned at zero; the increment does not rescue a fallen flag.
        assert_eq!(clock.remaining(Color::Black), Some(Duration::ZERO));
    }

    #[test]
    fn flags_is_pure() {
        let clock = GameClock::with_time_control(10 * SEC, None);
        assert!(!clock.flags(Color::White, 9 * SEC));
        assert!(clock.flags(Color::White, 11 * SEC));
        assert_eq!(clock.remaining(Color::White), Some(10 * SEC));
    }

    #[test]
    fn serde_roundtrip() {
        let clock = GameClock::with_time_control(Duration::from_secs(300), Some(3 * SEC));
        let json = serde_json::to_string(&clock).unwrap();
        let back: GameClock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, clock);
    }
}
