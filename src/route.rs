//! Greedy collection route between a start and an end bin.
//!
//! At each step the planner moves to the unvisited candidate with the highest
//! `priority - distance_penalty_per_km * km`. This is not a TSP solver: it makes at
//! most `max_intermediate_stops` steps and scans every candidate per step.
//! Candidates are scanned in ascending `bin_id` order and only a strictly greater
//! score replaces the current best, so ties go to the lexicographically smallest id.

use crate::bins::{Bin, BinId};
use crate::calibration::model::round_to;
use crate::error::AppError;
use crate::geo::{Coordinate, haversine_km};
use crate::priority::PriorityWeights;
use std::collections::{BTreeMap, HashSet};
use std::time::SystemTime;
use tracing::debug;

/// Priority points lost per kilometer travelled.
pub const DISTANCE_PENALTY_PER_KM: f64 = 0.5;
/// Bins below this fill are not worth a detour.
pub const MIN_FILL_PERCENT: f64 = 10.0;
pub const MAX_INTERMEDIATE_STOPS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteOptions {
    pub distance_penalty_per_km: f64,
    pub min_fill_percent: f64,
    pub max_intermediate_stops: usize,
    pub weights: PriorityWeights,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            distance_penalty_per_km: DISTANCE_PENALTY_PER_KM,
            min_fill_percent: MIN_FILL_PERCENT,
            max_intermediate_stops: MAX_INTERMEDIATE_STOPS,
            weights: PriorityWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub bin_id: BinId,
    pub name: String,
    pub location: Coordinate,
    pub fill_percent: f64,
    /// Priority at planning time, rounded to three decimals.
    pub priority: f64,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub stops: Vec<Stop>,
    pub polyline: Vec<Coordinate>,
}

impl RoutePlan {
    pub fn bin_ids(&self) -> Vec<&str> {
        self.stops.iter().map(|stop| stop.bin_id.as_str()).collect()
    }
}

pub fn plan_route(
    start_id: &str,
    end_id: &str,
    bins: &[Bin],
    now: SystemTime,
) -> Result<RoutePlan, AppError> {
    plan_route_with(&RouteOptions::default(), start_id, end_id, bins, now)
}

pub fn plan_route_with(
    options: &RouteOptions,
    start_id: &str,
    end_id: &str,
    bins: &[Bin],
    now: SystemTime,
) -> Result<RoutePlan, AppError> {
    let by_id: BTreeMap<&str, &Bin> = bins.iter().map(|bin| (bin.bin_id.as_str(), bin)).collect();

    let start = *by_id
        .get(start_id)
        .ok_or_else(|| AppError::StartNotFound(start_id.to_string()))?;
    let end = *by_id
        .get(end_id)
        .ok_or_else(|| AppError::EndNotFound(end_id.to_string()))?;

    // BTreeMap iteration keeps candidates sorted by id.
    let candidates: Vec<&Bin> = by_id
        .values()
        .copied()
        .filter(|bin| bin.bin_id != start_id && bin.bin_id != end_id)
        .filter(|bin| bin.fill_percent >= options.min_fill_percent)
        .collect();

    let mut route = vec![start];
    let mut visited: HashSet<&str> = HashSet::from([start_id]);
    let mut current = start;

    for _ in 0..options.max_intermediate_stops.min(candidates.len()) {
        let mut best: Option<(&Bin, f64)> = None;
        for candidate in candidates.iter().copied() {
            if visited.contains(candidate.bin_id.as_str()) {
                continue;
            }
            let km = haversine_km(current.location, candidate.location);
            let score =
                options.weights.score(candidate, now) - options.distance_penalty_per_km * km;
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        let Some((next, score)) = best else {
            break;
        };
        debug!(bin_id = %next.bin_id, score, "Route step selected");
        visited.insert(next.bin_id.as_str());
        route.push(next);
        current = next;
    }

    if !visited.contains(end_id) {
        route.push(end);
    }

    let stops: Vec<Stop> = route
        .iter()
        .enumerate()
        .map(|(order, bin)| Stop {
            bin_id: bin.bin_id.clone(),
            name: bin.name.clone(),
            location: bin.location,
            fill_percent: bin.fill_percent,
            priority: round_to(options.weights.score(bin, now), 3),
            order,
        })
        .collect();
    let polyline = stops.iter().map(|stop| stop.location).collect();

    Ok(RoutePlan { stops, polyline })
}
