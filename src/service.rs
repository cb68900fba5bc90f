//! Operations exposed to the HTTP layer.
//!
//! Every call reads a fresh snapshot from the store and runs the pure planning code
//! on it; nothing is locked across a computation.

use crate::bins::{Bin, BinRegistration, RegisterOutcome, TelemetrySample};
use crate::calibration::CalibrationModel;
use crate::error::AppError;
use crate::geo::Coordinate;
use crate::heatmap::{self, HeatmapPoint};
use crate::route::{RouteOptions, RoutePlan, plan_route_with};
use crate::store::BinStore;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct WasteService {
    store: Arc<dyn BinStore>,
    calibration: CalibrationModel,
    route_options: RouteOptions,
}

impl WasteService {
    pub fn new(
        store: Arc<dyn BinStore>,
        calibration: CalibrationModel,
        route_options: RouteOptions,
    ) -> Self {
        Self {
            store,
            calibration,
            route_options,
        }
    }

    pub fn bins(&self) -> Result<Vec<Bin>, AppError> {
        self.store.fetch_all_bins()
    }

    pub fn bin(&self, bin_id: &str) -> Result<Bin, AppError> {
        self.store
            .fetch_bin(bin_id)?
            .ok_or_else(|| AppError::BinNotFound(bin_id.to_string()))
    }

    pub fn compute_route(
        &self,
        start_id: &str,
        end_id: &str,
        now: SystemTime,
    ) -> Result<RoutePlan, AppError> {
        let bins = self.store.fetch_all_bins()?;
        let plan = plan_route_with(&self.route_options, start_id, end_id, &bins, now)?;
        debug!(
            start = start_id,
            end = end_id,
            stops = plan.stops.len(),
            "Route computed"
        );
        Ok(plan)
    }

    pub fn compute_heatmap(
        &self,
        window_minutes: i64,
        now: SystemTime,
    ) -> Result<Vec<HeatmapPoint>, AppError> {
        let window_start = heatmap::window_start(window_minutes, now)?;
        let averages = self.store.fetch_windowed_average_fill(window_start)?;
        let bins = self.store.fetch_all_bins()?;
        debug!(
            window_minutes,
            bins = bins.len(),
            with_samples = averages.len(),
            "Heatmap computed"
        );
        heatmap::heatmap(window_minutes, &bins, &averages)
    }

    /// Store a sensor report. The fill is always derived from the distance.
    pub fn ingest_telemetry(
        &self,
        bin_id: &str,
        distance_cm: f64,
        reported_fill: Option<f64>,
        ts: SystemTime,
    ) -> Result<TelemetrySample, AppError> {
        if bin_id.trim().is_empty() {
            return Err(AppError::InvalidBin("bin_id must not be empty".to_string()));
        }
        let reading = self.calibration.reconcile(distance_cm, reported_fill)?;
        if let Some(rejected) = reading.rejected_fill {
            warn!(
                bin_id,
                distance_cm,
                reported_fill = rejected,
                fill_percent = reading.fill_percent,
                "Reported fill disagrees with calibration, using recomputed value"
            );
        }

        let sample = TelemetrySample {
            bin_id: bin_id.to_string(),
            distance_cm: reading.distance_cm,
            fill_percent: reading.fill_percent,
            ts,
        };
        self.store.record_telemetry(sample.clone())?;
        Ok(sample)
    }

    pub fn mark_emptied(&self, bin_id: &str, now: SystemTime) -> Result<Bin, AppError> {
        let bin = self
            .store
            .mark_emptied(bin_id, self.calibration.empty_distance(), now)?
            .ok_or_else(|| AppError::BinNotFound(bin_id.to_string()))?;
        info!(bin_id, "Bin marked as emptied");
        Ok(bin)
    }

    pub fn register_bin(
        &self,
        bin_id: &str,
        name: &str,
        lat: f64,
        lng: f64,
        now: SystemTime,
    ) -> Result<RegisterOutcome, AppError> {
        let bin_id = bin_id.trim();
        let name = name.trim();
        if bin_id.is_empty() {
            return Err(AppError::InvalidBin("bin_id must not be empty".to_string()));
        }
        if name.is_empty() {
            return Err(AppError::InvalidBin("name must not be empty".to_string()));
        }
        let location = Coordinate::new(lat, lng).validate()?;

        let outcome = self.store.register_bin(
            BinRegistration {
                bin_id: bin_id.to_string(),
                name: name.to_string(),
                location,
                empty_distance_cm: self.calibration.empty_distance(),
            },
            now,
        )?;
        info!(bin_id, outcome = ?outcome, "Bin registered");
        Ok(outcome)
    }

    pub fn delete_bin(&self, bin_id: &str) -> Result<(), AppError> {
        if self.store.delete_bin(bin_id)? {
            info!(bin_id, "Bin deleted");
            Ok(())
        } else {
            Err(AppError::BinNotFound(bin_id.to_string()))
        }
    }
}
