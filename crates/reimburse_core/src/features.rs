//! Feature derivation for trip reimbursement scoring
//!
//! Turns the three raw trip inputs into the fixed, named feature vector that
//! decision trees branch on. Derivation is pure and total: ratio features whose
//! denominator is zero are defined as `0.0`.

use crate::errors::{Result, ScoringError};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Named features produced by [`derive_features`], in vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Duration,
    Distance,
    Amount,
    DistancePerDuration,
    AmountPerDuration,
    AmountPerDistance,
    DurationXDistance,
    DurationXAmount,
    DistanceXAmount,
}

impl Feature {
    /// Number of features in a [`FeatureVector`]
    pub const COUNT: usize = 9;

    /// All features in vector order
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Duration,
        Feature::Distance,
        Feature::Amount,
        Feature::DistancePerDuration,
        Feature::AmountPerDuration,
        Feature::AmountPerDistance,
        Feature::DurationXDistance,
        Feature::DurationXAmount,
        Feature::DistanceXAmount,
    ];

    /// Name used by tree descriptions
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Duration => "duration",
            Feature::Distance => "distance",
            Feature::Amount => "amount",
            Feature::DistancePerDuration => "distance_per_duration",
            Feature::AmountPerDuration => "amount_per_duration",
            Feature::AmountPerDistance => "amount_per_distance",
            Feature::DurationXDistance => "duration_x_distance",
            Feature::DurationXAmount => "duration_x_amount",
            Feature::DistanceXAmount => "distance_x_amount",
        }
    }

    /// Resolve a feature by its tree name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|feature| feature.name() == name)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| ScoringError::UnknownFeature(s.to_string()))
    }
}

/// Raw trip inputs supplied by callers
///
/// Field aliases accept the column names used by historical case files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripInput {
    /// Trip length in days
    #[serde(alias = "trip_duration_days")]
    pub duration: f64,
    /// Distance travelled (miles)
    #[serde(alias = "miles_traveled")]
    pub distance: f64,
    /// Total receipts (currency units)
    #[serde(alias = "total_receipts_amount")]
    pub amount: f64,
}

impl TripInput {
    pub fn new(duration: f64, distance: f64, amount: f64) -> Self {
        Self {
            duration,
            distance,
            amount,
        }
    }

    /// Reject inputs that would silently propagate NaN/Infinity or have no
    /// business meaning. Zero is accepted for every field.
    pub fn validate(&self) -> Result<()> {
        check_field("duration", self.duration)?;
        check_field("distance", self.distance)?;
        check_field("amount", self.amount)
    }
}

fn check_field(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ScoringError::InvalidInput {
            field,
            reason: format!("expected a finite number, got {value}"),
        });
    }
    if value < 0.0 {
        return Err(ScoringError::InvalidInput {
            field,
            reason: format!("must not be negative, got {value}"),
        });
    }
    Ok(())
}

/// Derived feature vector, immutable once built
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; Feature::COUNT],
}

impl FeatureVector {
    /// Value of a feature
    #[inline]
    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Value of a feature by tree name
    pub fn lookup(&self, name: &str) -> Result<f64> {
        Feature::from_name(name)
            .map(|feature| self.get(feature))
            .ok_or_else(|| ScoringError::UnknownFeature(name.to_string()))
    }

    /// Features paired with their values, in vector order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().map(move |&feature| (feature, self.get(feature)))
    }

    /// Raw values in vector order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Feature::COUNT))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.name(), &value)?;
        }
        map.end()
    }
}

#[inline]
fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Derive the full feature vector from raw inputs
///
/// Never fails. `duration == 0` zeroes both per-duration ratios and
/// `distance == 0` zeroes `amount_per_distance`.
pub fn derive_features(duration: f64, distance: f64, amount: f64) -> FeatureVector {
    FeatureVector {
        values: [
            duration,
            distance,
            amount,
            guarded_ratio(distance, duration),
            guarded_ratio(amount, duration),
            guarded_ratio(amount, distance),
            duration * distance,
            duration * amount,
            distance * amount,
        ],
    }
}

/// Derive features from a trip record
pub fn extract_features(input: &TripInput) -> FeatureVector {
    derive_features(input.duration, input.distance, input.amount)
}
