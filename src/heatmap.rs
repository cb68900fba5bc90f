//! Time-windowed fill heatmap.
//!
//! Each bin contributes its average fill over the window, or its current fill when
//! no telemetry arrived inside the window.

use crate::bins::{Bin, BinId};
use crate::calibration::model::round_to;
use crate::error::AppError;
use crate::geo::Coordinate;
use std::collections::HashMap;
use std::time::{Duration, SystemTime};

pub const DEFAULT_WINDOW_MINUTES: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapPoint {
    pub location: Coordinate,
    /// Normalized fill in [0, 1], rounded to three decimals.
    pub weight: f64,
}

/// Start of the aggregation window ending at `now`.
pub fn window_start(window_minutes: i64, now: SystemTime) -> Result<SystemTime, AppError> {
    let minutes = u64::try_from(window_minutes)
        .ok()
        .filter(|minutes| *minutes >= 1)
        .ok_or(AppError::InvalidWindow(window_minutes))?;
    let window = Duration::from_secs(minutes.saturating_mul(60));
    Ok(now.checked_sub(window).unwrap_or(SystemTime::UNIX_EPOCH))
}

pub fn heatmap(
    window_minutes: i64,
    bins: &[Bin],
    averages: &HashMap<BinId, f64>,
) -> Result<Vec<HeatmapPoint>, AppError> {
    if window_minutes < 1 {
        return Err(AppError::InvalidWindow(window_minutes));
    }

    Ok(bins
        .iter()
        .map(|bin| {
            let fill = averages
                .get(&bin.bin_id)
                .copied()
                .unwrap_or(bin.fill_percent);
            HeatmapPoint {
                location: bin.location,
                weight: fill_weight(fill),
            }
        })
        .collect())
}

fn fill_weight(fill_percent: f64) -> f64 {
    if fill_percent.is_nan() {
        return 0.0;
    }
    round_to((fill_percent / 100.0).clamp(0.0, 1.0), 3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn now() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    fn bin(id: &str, fill_percent: f64) -> Bin {
        Bin {
            bin_id: id.to_string(),
            name: id.to_string(),
            location: Coordinate::new(29.65, -82.34),
            fill_percent,
            distance_cm: 0.0,
            last_seen_at: now(),
            last_emptied_at: None,
        }
    }

    #[test]
    fn uses_window_average_when_present() -> Result<(), AppError> {
        let bins = vec![bin("bin-01", 90.0)];
        let averages = HashMap::from([("bin-01".to_string(), 45.5)]);

        let points = heatmap(120, &bins, &averages)?;

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].weight, 0.455);
        assert_eq!(points[0].location, Coordinate::new(29.65, -82.34));
        Ok(())
    }

    #[test]
    fn falls_back_to_current_fill_without_samples() -> Result<(), AppError> {
        let bins = vec![bin("bin-01", 63.0), bin("bin-02", 0.0)];
        let averages = HashMap::new();

        let points = heatmap(30, &bins, &averages)?;

        assert_eq!(points[0].weight, 0.63);
        assert_eq!(points[1].weight, 0.0);
        Ok(())
    }

    #[test]
    fn weight_is_rounded_and_bounded() -> Result<(), AppError> {
        let bins = vec![bin("a", 0.0), bin("b", 0.0), bin("c", 0.0), bin("d", 0.0)];
        let averages = HashMap::from([
            ("a".to_string(), 33.3333),
            ("b".to_string(), 150.0),
            ("c".to_string(), -4.0),
            ("d".to_string(), f64::NAN),
        ]);

        let points = heatmap(60, &bins, &averages)?;

        assert_eq!(points[0].weight, 0.333);
        assert_eq!(points[1].weight, 1.0);
        assert_eq!(points[2].weight, 0.0);
        assert_eq!(points[3].weight, 0.0);
        assert!(points.iter().all(|p| (0.0..=1.0).contains(&p.weight)));
        Ok(())
    }

    #[test]
    fn rejects_non_positive_windows() {
        let bins = vec![bin("bin-01", 50.0)];
        let averages = HashMap::new();

        assert_eq!(
            heatmap(0, &bins, &averages),
            Err(AppError::InvalidWindow(0))
        );
        assert_eq!(
            heatmap(-15, &bins, &averages),
            Err(AppError::InvalidWindow(-15))
        );
        assert_eq!(window_start(0, now()), Err(AppError::InvalidWindow(0)));
        assert_eq!(window_start(-1, now()), Err(AppError::InvalidWindow(-1)));
    }

    #[test]
    fn window_start_counts_back_in_minutes() -> Result<(), AppError> {
        let start = window_start(120, now())?;

        assert_eq!(start, now() - Duration::from_secs(7200));
        assert_eq!(window_start(1, now())?, now() - Duration::from_secs(60));
        Ok(())
    }

    #[test]
    fn empty_bin_list_yields_empty_heatmap() -> Result<(), AppError> {
        assert!(heatmap(120, &[], &HashMap::new())?.is_empty());
        Ok(())
    }
}
