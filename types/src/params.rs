//! Hub parameters — the system-wide issuance and signup configuration.
//!
//! Every personal token created by the hub shares the same issuance schedule
//! parameters; only its deployment time differs.

use serde::{Deserialize, Serialize};

/// One whole token expressed in raw units (fixed-point, 18 decimals).
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// System-wide parameters stored by the hub.
///
/// Issuance is defined by `initial_issuance` (raw units created per full
/// period for a freshly deployed token) and the compounding ratio
/// `inflation / divisor`, where the divisor is the largest power of ten not
/// exceeding `inflation` — e.g. `inflation = 107` compounds at 107/100 = 7%
/// per period.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HubParams {
    /// Raw units issued to a token's owner over the token's first full period.
    pub initial_issuance: u128,

    /// Per-period compounding numerator. The denominator is derived: the
    /// largest power of ten not exceeding this value (see [`HubParams::divisor`]).
    pub inflation: u128,

    /// Length of one compounding period in seconds. Must be non-zero;
    /// token deployment rejects a zero period.
    pub period_secs: u64,

    /// Raw units credited to a user's own token at signup (realized supply).
    pub signup_payout: u128,

    /// The immutable self-trust percentage seeded at signup.
    pub initial_trust_percent: u8,

    /// Ticker symbol shared by all personal tokens.
    pub symbol: String,

    /// Human-readable currency name shared by all personal tokens.
    pub name: String,
}

impl HubParams {
    /// One year in seconds (the default compounding period).
    pub const PERIOD_1_YEAR: u64 = 31_556_952;

    /// Halo defaults — the intended configuration for the live network:
    /// 8 tokens/day of initial issuance, 7% yearly compounding, 50 tokens at
    /// signup, full self-trust.
    pub fn halo_defaults() -> Self {
        Self {
            initial_issuance: 2920 * UNIT, // 8/day * 365 days
            inflation: 107,
            period_secs: Self::PERIOD_1_YEAR,
            signup_payout: 50 * UNIT,
            initial_trust_percent: 100,
            symbol: "HALO".to_string(),
            name: "Halo".to_string(),
        }
    }

    /// The derived compounding denominator: the largest power of ten not
    /// exceeding `inflation`, so the ratio `inflation / divisor` is >= 1.
    pub fn divisor(&self) -> u128 {
        largest_pow10_not_above(self.inflation)
    }
}

/// Default is the Halo live-network configuration.
impl Default for HubParams {
    fn default() -> Self {
        Self::halo_defaults()
    }
}

/// Largest power of ten not exceeding `n` (1 for `n < 10`, including 0).
pub fn largest_pow10_not_above(n: u128) -> u128 {
    let mut d: u128 = 1;
    while d <= n / 10 {
        d *= 10;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisor_is_largest_power_of_ten() {
        assert_eq!(largest_pow10_not_above(0), 1);
        assert_eq!(largest_pow10_not_above(7), 1);
        assert_eq!(largest_pow10_not_above(10), 10);
        assert_eq!(largest_pow10_not_above(107), 100);
        assert_eq!(largest_pow10_not_above(999), 100);
        assert_eq!(largest_pow10_not_above(1000), 1000);
    }

    #[test]
    fn default_params_compound_at_seven_percent() {
        let params = HubParams::halo_defaults();
        assert_eq!(params.inflation, 107);
        assert_eq!(params.divisor(), 100);
    }
}
