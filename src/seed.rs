//! Startup seeding of configured bins.
//!
//! Seeds are insert-only: a bin that already exists keeps its live data.

use crate::bins::Bin;
use crate::calibration::CalibrationModel;
use crate::error::AppError;
use crate::geo::Coordinate;
use crate::store::BinStore;
use serde::Deserialize;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
pub struct SeedBin {
    pub bin_id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub fill_percent: f64,
    /// Omit to leave the last pickup unknown.
    pub emptied_hours_ago: Option<f64>,
}

impl SeedBin {
    fn to_bin(&self, calibration: &CalibrationModel, now: SystemTime) -> Result<Bin, AppError> {
        let location = Coordinate::new(self.lat, self.lng).validate()?;
        let fill_percent = self.fill_percent.clamp(0.0, 100.0);
        let last_emptied_at = match self.emptied_hours_ago {
            Some(hours) => {
                let ago = Duration::try_from_secs_f64(hours * 3600.0).map_err(|_| {
                    AppError::InvalidBin(format!("{}: bad emptied_hours_ago", self.bin_id))
                })?;
                Some(now.checked_sub(ago).unwrap_or(SystemTime::UNIX_EPOCH))
            }
            None => None,
        };

        Ok(Bin {
            bin_id: self.bin_id.clone(),
            name: self.name.clone(),
            location,
            fill_percent,
            distance_cm: calibration.fill_to_distance(fill_percent),
            last_seen_at: now,
            last_emptied_at,
        })
    }
}

/// Insert every seed whose id is not yet stored. Returns how many were inserted.
pub fn seed_bins(
    store: &dyn BinStore,
    seeds: &[SeedBin],
    calibration: &CalibrationModel,
    now: SystemTime,
) -> Result<usize, AppError> {
    let mut inserted = 0;
    for seed in seeds {
        let bin = seed.to_bin(calibration, now)?;
        if store.insert_bin_if_absent(bin)? {
            inserted += 1;
        } else {
            debug!(bin_id = %seed.bin_id, "Seed skipped, bin already present");
        }
    }
    info!(total = seeds.len(), inserted, "Seeded bins");
    Ok(inserted)
}
