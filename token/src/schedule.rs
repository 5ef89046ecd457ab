//! The compounding issuance schedule.
//!
//! A schedule is a pure function of time: it knows nothing about balances.
//! The per-period rate compounds by `inflation / divisor` at every full
//! period boundary since deployment; no compounding occurs within a partial
//! period.

use halo_types::{params::largest_pow10_not_above, HubParams, Timestamp};
use serde::{Deserialize, Serialize};

/// Issuance schedule for a single personal token.
///
/// All arithmetic is checked `u128`; `None` means overflow, which callers
/// surface as an explicit error rather than panicking.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssuanceSchedule {
    /// Raw units issued over the first full period.
    pub initial: u128,
    /// Compounding numerator (e.g. 107 for 7% per period).
    pub inflation: u128,
    /// Compounding denominator: largest power of ten not exceeding `inflation`.
    pub divisor: u128,
    /// Length of one compounding period in seconds.
    pub period_secs: u64,
    /// Token creation time; period 0 starts here.
    pub deployed_at: Timestamp,
}

impl IssuanceSchedule {
    /// Build a schedule from the hub parameters and a deployment time.
    ///
    /// # Panics
    /// Panics if `params.period_secs` is zero: every period arithmetic in
    /// this module divides by the period length.
    pub fn new(params: &HubParams, deployed_at: Timestamp) -> Self {
        assert!(params.period_secs > 0, "period_secs must be non-zero");
        Self {
            initial: params.initial_issuance,
            inflation: params.inflation,
            divisor: largest_pow10_not_above(params.inflation),
            period_secs: params.period_secs,
            deployed_at,
        }
    }

    /// Index of the compounding period containing `at` (period 0 starts at
    /// deployment).
    pub fn period_index(&self, at: Timestamp) -> u64 {
        self.deployed_at.elapsed_since(at) / self.period_secs
    }

    /// Seconds elapsed into the period containing `at`.
    pub fn offset_at(&self, at: Timestamp) -> u64 {
        self.deployed_at.elapsed_since(at) % self.period_secs
    }

    /// The per-period issuance rate at period `p`:
    /// `initial * (inflation / divisor) ^ p`, computed iteratively so the
    /// intermediate values never exceed the final rate by more than one
    /// multiplication.
    pub fn rate_at_period(&self, p: u64) -> Option<u128> {
        let mut rate = self.initial;
        for _ in 0..p {
            rate = rate.checked_mul(self.inflation)? / self.divisor;
        }
        Some(rate)
    }

    /// Raw units accrued between `from` (with `offset` seconds already
    /// elapsed into `from`'s period) and `to`.
    ///
    /// Within a period, the amount owed for the slice `[a, b)` is
    /// `rate*b/period - rate*a/period`. Because each slice is the difference
    /// of two truncated cumulative values, splitting an interval across
    /// multiple calls accrues exactly the same total as one call — rounding
    /// never drifts beyond the single final truncation.
    pub fn accrued_between(&self, from: Timestamp, offset: u64, to: Timestamp) -> Option<u128> {
        debug_assert!(offset < self.period_secs, "offset must be within a period");
        let from_s = from.as_secs();
        let to_s = to.as_secs();
        if to_s <= from_s {
            return Some(0);
        }
        let period = self.period_secs as u128;
        let mut rate = self.rate_at_period(self.period_index(from))?;
        let mut owed: u128 = 0;
        let mut cursor = from_s;
        let mut offset = offset;
        while cursor < to_s {
            let span = (self.period_secs - offset).min(to_s - cursor);
            let before = rate.checked_mul(offset as u128)? / period;
            let after = rate.checked_mul((offset + span) as u128)? / period;
            owed = owed.checked_add(after - before)?;
            cursor += span;
            offset += span;
            if offset == self.period_secs {
                offset = 0;
                rate = rate.checked_mul(self.inflation)? / self.divisor;
            }
        }
        Some(owed)
    }
}
