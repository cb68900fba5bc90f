//! Linear calibration between a raw sensor distance and a fill percentage.
//!
//! Formula: fill = (empty - distance) / (empty - full) * 100, clamped to [0, 100].

use crate::error::AppError;

/// Sensor reading (cm) when the bin is empty.
pub const DEFAULT_EMPTY_DISTANCE_CM: f64 = 60.0;
/// Sensor reading (cm) when the bin is full.
pub const DEFAULT_FULL_DISTANCE_CM: f64 = 10.0;
/// Largest accepted gap between a reported fill and the recomputed one.
pub const FILL_TOLERANCE_PERCENT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationModel {
    pub empty_distance_cm: f64,
    pub full_distance_cm: f64,
}

impl Default for CalibrationModel {
    fn default() -> Self {
        Self {
            empty_distance_cm: DEFAULT_EMPTY_DISTANCE_CM,
            full_distance_cm: DEFAULT_FULL_DISTANCE_CM,
        }
    }
}

/// A distance/fill pair that agrees with the calibration model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconciledReading {
    pub distance_cm: f64,
    pub fill_percent: f64,
    /// The sensor's own fill estimate when it disagreed with the model.
    pub rejected_fill: Option<f64>,
}

impl CalibrationModel {
    fn span_cm(&self) -> f64 {
        self.empty_distance_cm - self.full_distance_cm
    }

    /// Out-of-range distances are a normal sensor artifact and clamp silently.
    pub fn distance_to_fill(&self, distance_cm: f64) -> f64 {
        ((self.empty_distance_cm - distance_cm) / self.span_cm() * 100.0).clamp(0.0, 100.0)
    }

    /// Inverse of [`Self::distance_to_fill`], rounded to one decimal place.
    pub fn fill_to_distance(&self, fill_percent: f64) -> f64 {
        let fill = fill_percent.clamp(0.0, 100.0);
        round_to(self.empty_distance_cm - (fill / 100.0) * self.span_cm(), 1)
    }

    pub fn empty_distance(&self) -> f64 {
        self.fill_to_distance(0.0)
    }

    /// Reject readings no sensor can produce. Finite values are always accepted.
    pub fn validate_distance(&self, distance_cm: f64) -> Result<f64, AppError> {
        if distance_cm.is_finite() {
            Ok(distance_cm)
        } else {
            Err(AppError::InvalidReading(distance_cm))
        }
    }

    /// The raw distance is authoritative; the fill is always recomputed from it.
    pub fn reconcile(
        &self,
        distance_cm: f64,
        reported_fill: Option<f64>,
    ) -> Result<ReconciledReading, AppError> {
        let distance_cm = self.validate_distance(distance_cm)?;
        let fill_percent = self.distance_to_fill(distance_cm);
        let rejected_fill = reported_fill
            .filter(|reported| !((reported - fill_percent).abs() <= FILL_TOLERANCE_PERCENT));

        Ok(ReconciledReading {
            distance_cm,
            fill_percent,
            rejected_fill,
        })
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.empty_distance_cm.is_finite()
            && self.full_distance_cm.is_finite()
            && self.full_distance_cm >= 0.0
            && self.empty_distance_cm > self.full_distance_cm
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
