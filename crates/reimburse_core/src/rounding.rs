//! Currency rounding policy
//!
//! Leaf values are rounded exactly once, to two decimal places, after the
//! tree walk. Rounding runs on the shortest decimal rendering of the `f64`
//! (what the tree file spells out), not on its binary expansion, so a leaf
//! written as `2.675` is a true midpoint.

use crate::errors::{Result, ScoringError};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places in a currency amount
pub const CURRENCY_DECIMALS: u32 = 2;

/// Tie-breaking convention applied at the currency midpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Banker's rounding: ties go to the even digit
    #[default]
    HalfEven,
    /// Ties go away from zero
    HalfAwayFromZero,
    /// Ties go toward zero
    HalfTowardZero,
}

impl RoundingMode {
    pub const ALL: [RoundingMode; 3] = [
        RoundingMode::HalfEven,
        RoundingMode::HalfAwayFromZero,
        RoundingMode::HalfTowardZero,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            RoundingMode::HalfEven => "half_even",
            RoundingMode::HalfAwayFromZero => "half_away_from_zero",
            RoundingMode::HalfTowardZero => "half_toward_zero",
        }
    }

    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfTowardZero => RoundingStrategy::MidpointTowardZero,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoundingMode {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| {
                ScoringError::Config(format!(
                    "unknown rounding mode `{s}` (expected half_even, half_away_from_zero or half_toward_zero)"
                ))
            })
    }
}

/// Round a value to currency precision under `mode`
pub fn round_currency(value: f64, mode: RoundingMode) -> Result<f64> {
    if !value.is_finite() {
        return Err(ScoringError::UnroundableValue(value));
    }

    // `Display` for f64 is the shortest round-trip form and never uses exponents.
    // Rounding applies to that decimal rendering, not the binary value `from_f64` would see.
    let decimal =
        Decimal::from_str(&value.to_string()).map_err(|_| ScoringError::UnroundableValue(value))?;
    let rounded = decimal.round_dp_with_strategy(CURRENCY_DECIMALS, mode.strategy());

    rounded
        .to_string()
        .parse::<f64>()
        .map_err(|_| ScoringError::UnroundableValue(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_rounded_values_are_unchanged() {
        for mode in RoundingMode::ALL {
            assert_eq!(round_currency(336.31, mode).unwrap(), 336.31);
            assert_eq!(round_currency(1000.0, mode).unwrap(), 1000.0);
            assert_eq!(round_currency(0.0, mode).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_midpoint_conventions() {
        assert_eq!(round_currency(0.125, RoundingMode::HalfEven).unwrap(), 0.12);
        assert_eq!(round_currency(0.135, RoundingMode::HalfEven).unwrap(), 0.14);
        assert_eq!(round_currency(2.675, RoundingMode::HalfEven).unwrap(), 2.68);

        assert_eq!(round_currency(0.125, RoundingMode::HalfAwayFromZero).unwrap(), 0.13);
        assert_eq!(round_currency(-1.005, RoundingMode::HalfAwayFromZero).unwrap(), -1.01);

        assert_eq!(round_currency(0.125, RoundingMode::HalfTowardZero).unwrap(), 0.12);
        assert_eq!(round_currency(-1.005, RoundingMode::HalfTowardZero).unwrap(), -1.0);
    }

    #[test]
    fn test_non_midpoints_round_to_nearest() {
        for mode in RoundingMode::ALL {
            assert_eq!(round_currency(1170.6549, mode).unwrap(), 1170.65);
            assert_eq!(round_currency(1170.6551, mode).unwrap(), 1170.66);
            assert_eq!(round_currency(-3.141, mode).unwrap(), -3.14);
        }
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        assert!(matches!(
            round_currency(f64::NAN, RoundingMode::HalfEven),
            Err(ScoringError::UnroundableValue(_))
        ));
        assert!(round_currency(f64::INFINITY, RoundingMode::HalfEven).is_err());
        assert!(round_currency(1e300, RoundingMode::HalfEven).is_err());
        assert!(round_currency(1e29, RoundingMode::HalfEven).is_err());
        assert_eq!(round_currency(1e28, RoundingMode::HalfEven).unwrap(), 1e28);
    }

    #[test]
    fn test_rounds_decimal_rendering_not_binary_value() {
        // 2.675 and 1.005 are stored just below the midpoint
        assert!(Decimal::from_f64_retain(2.675).unwrap() < Decimal::from_str("2.675").unwrap());
        assert_eq!(round_currency(2.675, RoundingMode::HalfAwayFromZero).unwrap(), 2.68);
        assert_eq!(round_currency(1.005, RoundingMode::HalfAwayFromZero).unwrap(), 1.01);
    }

    #[test]
    fn test_mode_names() {
        for mode in RoundingMode::ALL {
            assert_eq!(mode.to_string().parse::<RoundingMode>().unwrap(), mode);
        }
        assert_eq!(RoundingMode::default(), RoundingMode::HalfEven);
        assert!("bankers".parse::<RoundingMode>().is_err());
        assert_eq!(
            serde_json::to_string(&RoundingMode::HalfAwayFromZero).unwrap(),
            "\"half_away_from_zero\""
        );
    }
}
