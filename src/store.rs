//! Bin and telemetry storage.
//!
//! [`BinStore`] is the contract the planning code relies on: whole-snapshot reads,
//! a windowed average, and the handful of writes telemetry and operators perform.
//! [`MemoryStore`] keeps everything in process behind a lock.

use crate::bins::{Bin, BinId, BinRegistration, RegisterOutcome, TelemetrySample};
use crate::error::AppError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::RwLock;
use std::time::SystemTime;

pub trait BinStore: Send + Sync + fmt::Debug {
    /// All bins, ordered by id.
    fn fetch_all_bins(&self) -> Result<Vec<Bin>, AppError>;

    fn fetch_bin(&self, bin_id: &str) -> Result<Option<Bin>, AppError>;

    /// Average `fill_percent` per bin over samples with `ts >= window_start`.
    /// Bins without samples in the window are absent from the map.
    fn fetch_windowed_average_fill(
        &self,
        window_start: SystemTime,
    ) -> Result<HashMap<BinId, f64>, AppError>;

    /// Update (or create) the bin's current reading and append the sample.
    fn record_telemetry(&self, sample: TelemetrySample) -> Result<(), AppError>;

    /// Create the bin, or update only its name and location if it exists.
    fn register_bin(
        &self,
        registration: BinRegistration,
        now: SystemTime,
    ) -> Result<RegisterOutcome, AppError>;

    /// Returns `false` and leaves the stored bin untouched if the id is taken.
    fn insert_bin_if_absent(&self, bin: Bin) -> Result<bool, AppError>;

    fn mark_emptied(
        &self,
        bin_id: &str,
        empty_distance_cm: f64,
        at: SystemTime,
    ) -> Result<Option<Bin>, AppError>;

    /// Returns `false` when the bin did not exist. Samples are kept.
    fn delete_bin(&self, bin_id: &str) -> Result<bool, AppError>;
}

#[derive(Debug, Default)]
struct Inner {
    bins: BTreeMap<BinId, Bin>,
    samples: Vec<TelemetrySample>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_count(&self) -> Result<usize, AppError> {
        let guard = self.inner.read().map_err(|_| AppError::StateLock)?;
        Ok(guard.samples.len())
    }
}

impl BinStore for MemoryStore {
    fn fetch_all_bins(&self) -> Result<Vec<Bin>, AppError> {
        let guard = self.inner.read().map_err(|_| AppError::StateLock)?;
        Ok(guard.bins.values().cloned().collect())
    }

    fn fetch_bin(&self, bin_id: &str) -> Result<Option<Bin>, AppError> {
        let guard = self.inner.read().map_err(|_| AppError::StateLock)?;
        Ok(guard.bins.get(bin_id).cloned())
    }

    fn fetch_windowed_average_fill(
        &self,
        window_start: SystemTime,
    ) -> Result<HashMap<BinId, f64>, AppError> {
        let guard = self.inner.read().map_err(|_| AppError::StateLock)?;
        let mut sums: HashMap<&str, (f64, u32)> = HashMap::new();
        for sample in guard.samples.iter().filter(|s| s.ts >= window_start) {
            let entry = sums.entry(sample.bin_id.as_str()).or_insert((0.0, 0));
            entry.0 += sample.fill_percent;
            entry.1 += 1;
        }

        Ok(sums
            .into_iter()
            .map(|(bin_id, (sum, count))| (bin_id.to_string(), sum / f64::from(count)))
            .collect())
    }

    fn record_telemetry(&self, sample: TelemetrySample) -> Result<(), AppError> {
        let mut guard = self.inner.write().map_err(|_| AppError::StateLock)?;
        guard
            .bins
            .entry(sample.bin_id.clone())
            .and_modify(|bin| bin.apply_sample(&sample))
            .or_insert_with(|| Bin::from_sample(&sample));
        guard.samples.push(sample);
        Ok(())
    }

    fn register_bin(
        &self,
        registration: BinRegistration,
        now: SystemTime,
    ) -> Result<RegisterOutcome, AppError> {
        let mut guard = self.inner.write().map_err(|_| AppError::StateLock)?;
        match guard.bins.get_mut(&registration.bin_id) {
            Some(existing) => {
                existing.name = registration.name;
                existing.location = registration.location;
                Ok(RegisterOutcome::Updated)
            }
            None => {
                let bin = Bin {
                    bin_id: registration.bin_id.clone(),
                    name: registration.name,
                    location: registration.location,
                    fill_percent: 0.0,
                    distance_cm: registration.empty_distance_cm,
                    last_seen_at: now,
                    last_emptied_at: None,
                };
                guard.bins.insert(registration.bin_id, bin);
                Ok(RegisterOutcome::Created)
            }
        }
    }

    fn insert_bin_if_absent(&self, bin: Bin) -> Result<bool, AppError> {
        let mut guard = self.inner.write().map_err(|_| AppError::StateLock)?;
        if guard.bins.contains_key(&bin.bin_id) {
            return Ok(false);
        }
        guard.bins.insert(bin.bin_id.clone(), bin);
        Ok(true)
    }

    fn mark_emptied(
        &self,
        bin_id: &str,
        empty_distance_cm: f64,
        at: SystemTime,
    ) -> Result<Option<Bin>, AppError> {
        let mut guard = self.inner.write().map_err(|_| AppError::StateLock)?;
        Ok(guard.bins.get_mut(bin_id).map(|bin| {
            bin.fill_percent = 0.0;
            bin.distance_cm = empty_distance_cm;
            bin.last_emptied_at = Some(at);
            bin.clone()
        }))
    }

    fn delete_bin(&self, bin_id: &str) -> Result<bool, AppError> {
        let mut guard = self.inner.write().map_err(|_| AppError::StateLock)?;
        Ok(guard.bins.remove(bin_id).is_some())
    }
}
