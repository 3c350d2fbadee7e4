// crates/hive-economics/src/emission.rs
//
// Three-phase emission schedule for the minting reward stream.
//
//   rate
//    ^
//  r1|--------.
//    |         `-.
//    |            `-.
//  r2|               `--------------
//    +--------+-------+-------------> block
//            p1      p2
//
// - Blocks up to and including `phase1_end` emit `phase1_rate` per block.
// - Between `phase1_end` and `phase2_start` the rate decays linearly.
// - From `phase2_start` on the rate is `phase2_rate`.
//
// `accrued(from, to)` integrates the curve over (from, to].

use serde::{Deserialize, Serialize};

use crate::token::{deserialize_units, UNITS_PER_HONEY};
use hive_core::error::HiveError;

/// Default end of the first constant phase.
pub const DEFAULT_PHASE1_END: u64 = 200_000;

/// Default start of the second constant phase.
pub const DEFAULT_PHASE2_START: u64 = 2_000_000;

/// Default phase-1 rate: 10 HONEY per block.
pub const DEFAULT_PHASE1_RATE: u128 = 10 * UNITS_PER_HONEY;

/// Default phase-2 rate: 1 HONEY per block.
pub const DEFAULT_PHASE2_RATE: u128 = UNITS_PER_HONEY;

/// Emission schedule parameters.
///
/// Invariants (enforced by [`EmissionSchedule::new`]):
/// `phase1_end < phase2_start` and `phase2_rate < phase1_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionSchedule {
    /// Last block of the first constant phase.
    pub phase1_end: u64,
    /// First block of the second constant phase.
    pub phase2_start: u64,
    /// Reward units per block during phase 1.
    #[serde(deserialize_with = "deserialize_units")]
    pub phase1_rate: u128,
    /// Reward units per block during phase 2.
    #[serde(deserialize_with = "deserialize_units")]
    pub phase2_rate: u128,
}

impl EmissionSchedule {
    /// Build a validated schedule.
    ///
    /// # Errors
    /// Returns `HiveError::InvalidSchedule` if the phases overlap or the
    /// rate does not decrease.
    pub fn new(
        phase1_end: u64,
        phase2_start: u64,
        phase1_rate: u128,
        phase2_rate: u128,
    ) -> Result<Self, HiveError> {
        let schedule = Self {
            phase1_end,
            phase2_start,
            phase1_rate,
            phase2_rate,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Check the schedule invariants.
    pub fn validate(&self) -> Result<(), HiveError> {
        if self.phase1_end >= self.phase2_start {
            return Err(HiveError::InvalidSchedule(format!(
                "phase1_end ({}) must be before phase2_start ({})",
                self.phase1_end, self.phase2_start
            )));
        }
        if self.phase2_rate >= self.phase1_rate {
            return Err(HiveError::InvalidSchedule(format!(
                "phase2_rate ({}) must be below phase1_rate ({})",
                self.phase2_rate, self.phase1_rate
            )));
        }
        Ok(())
    }

    /// Instantaneous emission rate at `block`.
    ///
    /// Inside the decay phase the interpolated rate is rounded up, so it
    /// never drops below the exact line.
    pub fn rate_at(&self, block: u64) -> u128 {
        if block <= self.phase1_end {
            return self.phase1_rate;
        }
        if block >= self.phase2_start {
            return self.phase2_rate;
        }
        let span = u128::from(self.phase2_start - self.phase1_end);
        let elapsed = u128::from(block - self.phase1_end);
        let rate_drop = self.phase1_rate - self.phase2_rate;
        let drop = (rate_drop.saturating_mul(elapsed) / span).min(rate_drop);
        self.phase1_rate - drop
    }

    /// Total reward emitted over the block range `(from, to]`.
    ///
    /// The three phase integrals are computed independently and summed;
    /// each is zero unless its phase overlaps the range.
    ///
    /// # Errors
    /// Returns `HiveError::InvalidRange` if `from > to` and
    /// `HiveError::ArithmeticOverflow` if the total does not fit in u128.
    pub fn accrued(&self, from: u64, to: u64) -> Result<u128, HiveError> {
        if from > to {
            return Err(HiveError::InvalidRange { from, to });
        }

        let mut total: u128 = 0;

        if self.phase1_end > from {
            let end = to.min(self.phase1_end);
            let blocks = u128::from(end - from);
            total = checked_add(total, checked_mul(blocks, self.phase1_rate)?)?;
        }

        if from < self.phase2_start && self.phase1_end < to {
            let start = from.max(self.phase1_end);
            let end = to.min(self.phase2_start);
            total = checked_add(total, self.decay_area(start, end)?)?;
        }

        if self.phase2_start < to {
            let start = from.max(self.phase2_start);
            let blocks = u128::from(to - start);
            total = checked_add(total, checked_mul(blocks, self.phase2_rate)?)?;
        }

        Ok(total)
    }

    /// Trapezoid under the decay line between `start` and `end`, both inside
    /// `[phase1_end, phase2_start]`.
    ///
    /// With `D = phase2_start - phase1_end`, `a = start - phase1_end`,
    /// `b = end - phase1_end` the area is
    /// `(b - a) * (2 * r1 * D - (r1 - r2) * (a + b)) / (2 * D)`,
    /// evaluated with a single floor division.
    fn decay_area(&self, start: u64, end: u64) -> Result<u128, HiveError> {
        if end <= start {
            return Ok(0);
        }
        let span = u128::from(self.phase2_start - self.phase1_end);
        let a = u128::from(start - self.phase1_end);
        let b = u128::from(end - self.phase1_end);
        let rate_drop = self.phase1_rate - self.phase2_rate;

        let twice_rate_sum = checked_mul(checked_mul(2, self.phase1_rate)?, span)?
            .checked_sub(checked_mul(rate_drop, a + b)?)
            .ok_or(HiveError::ArithmeticOverflow)?;
        let numerator = checked_mul(b - a, twice_rate_sum)?;
        Ok(numerator / (2 * span))
    }
}

impl Default for EmissionSchedule {
    fn default() -> Self {
        Self {
            phase1_end: DEFAULT_PHASE1_END,
            phase2_start: DEFAULT_PHASE2_START,
            phase1_rate: DEFAULT_PHASE1_RATE,
            phase2_rate: DEFAULT_PHASE2_RATE,
        }
    }
}

fn checked_mul(a: u128, b: u128) -> Result<u128, HiveError> {
    a.checked_mul(b).ok_or(HiveError::ArithmeticOverflow)
}

fn checked_add(a: u128, b: u128) -> Result<u128, HiveError> {
    a.checked_add(b).ok_or(HiveError::ArithmeticOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_schedule() -> EmissionSchedule {
        EmissionSchedule::new(100, 200, 10, 2).unwrap()
    }

    /// Integer slope (2 units per block) so every interpolated rate is exact.
    fn integral_slope_schedule() -> EmissionSchedule {
        EmissionSchedule::new(100, 200, 300, 100).unwrap()
    }

    #[test]
    fn test_rejects_overlapping_phases() {
        assert!(matches!(
            EmissionSchedule::new(200, 200, 10, 2),
            Err(HiveError::InvalidSchedule(_))
        ));
        assert!(EmissionSchedule::new(300, 200, 10, 2).is_err());
    }

    #[test]
    fn test_rejects_non_decreasing_rate() {
        assert!(EmissionSchedule::new(100, 200, 2, 2).is_err());
        assert!(EmissionSchedule::new(100, 200, 2, 10).is_err());
    }

    #[test]
    fn test_default_schedule_is_valid() {
        assert!(EmissionSchedule::default().validate().is_ok());
    }

    #[test]
    fn test_rate_at() {
        let s = small_schedule();
        assert_eq!(s.rate_at(0), 10);
        assert_eq!(s.rate_at(100), 10);
        assert_eq!(s.rate_at(150), 6);
        assert_eq!(s.rate_at(200), 2);
        assert_eq!(s.rate_at(10_000), 2);
    }

    #[test]
    fn test_degenerate_range_is_zero() {
        let s = small_schedule();
        for block in [0, 50, 100, 150, 200, 500] {
            assert_eq!(s.accrued(block, block).unwrap(), 0);
        }
    }

    #[test]
    fn test_backwards_range_is_rejected() {
        let s = small_schedule();
        assert_eq!(
            s.accrued(10, 5),
            Err(HiveError::InvalidRange { from: 10, to: 5 })
        );
    }

    #[test]
    fn test_phase1_only() {
        let s = small_schedule();
        assert_eq!(s.accrued(0, 100).unwrap(), 1_000);
        assert_eq!(s.accrued(40, 60).unwrap(), 200);
    }

    #[test]
    fn test_phase1_into_decay() {
        // (100 - 50) * 10 + 50 * (10 + 6) / 2
        let s = small_schedule();
        assert_eq!(s.accrued(50, 150).unwrap(), 900);
    }

    #[test]
    fn test_full_decay_phase() {
        // 100 * (10 + 2) / 2
        let s = small_schedule();
        assert_eq!(s.accrued(100, 200).unwrap(), 600);
    }

    #[test]
    fn test_phase2_only() {
        let s = small_schedule();
        assert_eq!(s.accrued(200, 300).unwrap(), 200);
        assert_eq!(s.accrued(250, 260).unwrap(), 20);
    }

    #[test]
    fn test_range_spanning_all_phases() {
        // 1000 (phase 1) + 600 (decay) + 100 * 2 (phase 2)
        let s = small_schedule();
        assert_eq!(s.accrued(0, 300).unwrap(), 1_800);
    }

    #[test]
    fn test_additivity_across_boundaries() {
        let s = integral_slope_schedule();
        let points = [0u64, 37, 100, 101, 133, 150, 199, 200, 201, 260];
        for (i, &a) in points.iter().enumerate() {
            for (j, &b) in points.iter().enumerate().skip(i) {
                for &c in points.iter().skip(j) {
                    let whole = s.accrued(a, c).unwrap();
                    let split = s.accrued(a, b).unwrap() + s.accrued(b, c).unwrap();
                    assert_eq!(whole, split, "split of ({a}, {c}] at {b}");
                }
            }
        }
    }

    #[test]
    fn test_non_integral_rates_floor_exact_area() {
        // Slope 8/100: the exact area over (100, 101] is 9.96, floored to 9.
        let s = small_schedule();
        assert_eq!(s.accrued(100, 101).unwrap(), 9);
    }

    #[test]
    fn test_overflow_is_reported() {
        let s = EmissionSchedule::new(u64::MAX - 1, u64::MAX, u128::MAX, 0).unwrap();
        assert_eq!(s.accrued(0, 10), Err(HiveError::ArithmeticOverflow));
    }
}
