use crate::geo::Coordinate;
use std::time::SystemTime;

pub type BinId = String;

/// Name given to bins first seen through telemetry rather than registration.
pub const UNKNOWN_BIN_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub bin_id: BinId,
    pub name: String,
    pub location: Coordinate,
    pub fill_percent: f64,
    pub distance_cm: f64,
    pub last_seen_at: SystemTime,
    /// `None` means the last pickup is unknown and the bin is treated as stale.
    pub last_emptied_at: Option<SystemTime>,
}

impl Bin {
    /// A bin reported by a sensor before anyone registered it.
    pub fn from_sample(sample: &TelemetrySample) -> Self {
        Self {
            bin_id: sample.bin_id.clone(),
            name: UNKNOWN_BIN_NAME.to_string(),
            location: Coordinate::new(0.0, 0.0),
            fill_percent: sample.fill_percent,
            distance_cm: sample.distance_cm,
            last_seen_at: sample.ts,
            last_emptied_at: None,
        }
    }

    pub fn apply_sample(&mut self, sample: &TelemetrySample) {
        self.fill_percent = sample.fill_percent;
        self.distance_cm = sample.distance_cm;
        self.last_seen_at = sample.ts;
    }
}

/// Immutable telemetry record. Fill and distance are already reconciled.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    pub bin_id: BinId,
    pub distance_cm: f64,
    pub fill_percent: f64,
    pub ts: SystemTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinRegistration {
    pub bin_id: BinId,
    pub name: String,
    pub location: Coordinate,
    /// Distance written for a newly created bin (the calibrated empty reading).
    pub empty_distance_cm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created,
    Updated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn sample(fill_percent: f64, distance_cm: f64, secs: u64) -> TelemetrySample {
        TelemetrySample {
            bin_id: "bin-01".to_string(),
            distance_cm,
            fill_percent,
            ts: UNIX_EPOCH + Duration::from_secs(secs),
        }
    }

    #[test]
    fn from_sample_creates_unknown_bin() {
        let bin = Bin::from_sample(&sample(40.0, 40.0, 10));

        assert_eq!(bin.name, UNKNOWN_BIN_NAME);
        assert_eq!(bin.location, Coordinate::new(0.0, 0.0));
        assert_eq!(bin.fill_percent, 40.0);
        assert_eq!(bin.last_emptied_at, None);
    }

    #[test]
    fn apply_sample_keeps_identity_and_emptied_time() {
        let emptied = UNIX_EPOCH + Duration::from_secs(5);
        let mut bin = Bin {
            bin_id: "bin-01".to_string(),
            name: "Marston Library".to_string(),
            location: Coordinate::new(29.6481, -82.3436),
            fill_percent: 0.0,
            distance_cm: 60.0,
            last_seen_at: UNIX_EPOCH,
            last_emptied_at: Some(emptied),
        };

        bin.apply_sample(&sample(80.0, 20.0, 100));

        assert_eq!(bin.name, "Marston Library");
        assert_eq!(bin.fill_percent, 80.0);
        assert_eq!(bin.distance_cm, 20.0);
        assert_eq!(bin.last_seen_at, UNIX_EPOCH + Duration::from_secs(100));
        assert_eq!(bin.last_emptied_at, Some(emptied));
    }
}
