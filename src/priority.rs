//! Urgency score per bin.
//!
//! Formula:
//! priority = FILL_WEIGHT * fill/100
//!     + AGE_WEIGHT * min(hours_since_emptied / AGE_SATURATION_HOURS, 1)

use crate::bins::Bin;
use std::time::SystemTime;

pub const FILL_WEIGHT: f64 = 0.7;
pub const AGE_WEIGHT: f64 = 0.3;
/// Hours after which the age term stops growing.
pub const AGE_SATURATION_HOURS: f64 = 24.0;
/// Assumed age of a bin whose last pickup is unknown.
pub const UNKNOWN_AGE_HOURS: f64 = 48.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityWeights {
    pub fill_weight: f64,
    pub age_weight: f64,
    pub age_saturation_hours: f64,
    pub unknown_age_hours: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            fill_weight: FILL_WEIGHT,
            age_weight: AGE_WEIGHT,
            age_saturation_hours: AGE_SATURATION_HOURS,
            unknown_age_hours: UNKNOWN_AGE_HOURS,
        }
    }
}

impl PriorityWeights {
    pub fn score(&self, bin: &Bin, now: SystemTime) -> f64 {
        let fill_term = bin.fill_percent.clamp(0.0, 100.0) / 100.0;
        let age_term = (self.hours_since_emptied(bin, now) / self.age_saturation_hours).min(1.0);
        self.fill_weight * fill_term + self.age_weight * age_term
    }

    /// A pickup timestamped after `now` counts as zero hours.
    pub fn hours_since_emptied(&self, bin: &Bin, now: SystemTime) -> f64 {
        match bin.last_emptied_at {
            Some(emptied_at) => now
                .duration_since(emptied_at)
                .map(|elapsed| elapsed.as_secs_f64() / 3600.0)
                .unwrap_or(0.0),
            None => self.unknown_age_hours,
        }
    }
}

/// Priority under the default policy weights.
pub fn priority(bin: &Bin, now: SystemTime) -> f64 {
    PriorityWeights::default().score(bin, now)
}
