use crate::bins::{Bin, RegisterOutcome};
use crate::heatmap::HeatmapPoint;
use crate::route::RoutePlan;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct BinResponse {
    pub bin_id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub distance_cm: f64,
    pub fill_percent: f64,
    /// Unix seconds of the latest telemetry.
    pub ts: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_emptied_at: Option<f64>,
}

impl From<&Bin> for BinResponse {
    fn from(bin: &Bin) -> Self {
        Self {
            bin_id: bin.bin_id.clone(),
            name: bin.name.clone(),
            lat: bin.location.lat,
            lng: bin.location.lng,
            distance_cm: bin.distance_cm,
            fill_percent: bin.fill_percent,
            ts: unix_seconds(bin.last_seen_at),
            last_emptied_at: bin.last_emptied_at.map(unix_seconds),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Ok,
    Created,
    Updated,
    Deleted,
}

impl From<RegisterOutcome> for ActionStatus {
    fn from(outcome: RegisterOutcome) -> Self {
        match outcome {
            RegisterOutcome::Created => ActionStatus::Created,
            RegisterOutcome::Updated => ActionStatus::Updated,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActionResponse {
    pub status: ActionStatus,
    pub bin_id: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct HeatmapPointResponse {
    pub lat: f64,
    pub lng: f64,
    pub weight: f64,
}

impl From<&HeatmapPoint> for HeatmapPointResponse {
    fn from(point: &HeatmapPoint) -> Self {
        Self {
            lat: point.location.lat,
            lng: point.location.lng,
            weight: point.weight,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RouteStopResponse {
    pub bin_id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub fill_percent: f64,
    pub priority: f64,
    pub order: usize,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RouteResponse {
    pub stops: Vec<RouteStopResponse>,
    /// `[lat, lng]` pairs in stop order.
    pub polyline: Vec<[f64; 2]>,
}

impl From<&RoutePlan> for RouteResponse {
    fn from(plan: &RoutePlan) -> Self {
        Self {
            stops: plan
                .stops
                .iter()
                .map(|stop| RouteStopResponse {
                    bin_id: stop.bin_id.clone(),
                    name: stop.name.clone(),
                    lat: stop.location.lat,
                    lng: stop.location.lng,
                    fill_percent: stop.fill_percent,
                    priority: stop.priority,
                    order: stop.order,
                })
                .collect(),
            polyline: plan
                .polyline
                .iter()
                .map(|point| [point.lat, point.lng])
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub bins: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorResponse {
    pub error_code: ErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    StartNotFound,
    EndNotFound,
    BinNotFound,
    InvalidWindow,
    InvalidReading,
    InvalidCoordinate,
    InvalidTimestamp,
    InvalidBin,
    InternalError,
}

/// Seconds since the Unix epoch; times before the epoch collapse to 0.
pub fn unix_seconds(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::route::Stop;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn bin_response_omits_unknown_emptied_time() {
        let bin = Bin {
            bin_id: "bin-05".to_string(),
            name: "Turlington Hall".to_string(),
            location: Coordinate::new(29.6489, -82.3443),
            fill_percent: 5.0,
            distance_cm: 57.5,
            last_seen_at: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            last_emptied_at: None,
        };

        let value = serde_json::to_value(BinResponse::from(&bin)).expect("serialize bin");
        assert_eq!(
            value,
            json!({
                "bin_id": "bin-05",
                "name": "Turlington Hall",
                "lat": 29.6489,
                "lng": -82.3443,
                "distance_cm": 57.5,
                "fill_percent": 5.0,
                "ts": 1_700_000_000.0
            })
        );
    }

    #[test]
    fn bin_response_includes_emptied_time_when_known() {
        let bin = Bin {
            bin_id: "bin-04".to_string(),
            name: "Ben Hill Griffin Stadium".to_string(),
            location: Coordinate::new(29.65, -82.3486),
            fill_percent: 91.0,
            distance_cm: 14.5,
            last_seen_at: UNIX_EPOCH + Duration::from_millis(1_500),
            last_emptied_at: Some(UNIX_EPOCH + Duration::from_secs(10)),
        };

        let value = serde_json::to_value(BinResponse::from(&bin)).expect("serialize bin");
        assert_eq!(value["ts"], json!(1.5));
        assert_eq!(value["last_emptied_at"], json!(10.0));
    }

    #[test]
    fn route_response_serializes_polyline_as_pairs() {
        let plan = RoutePlan {
            stops: vec![Stop {
                bin_id: "bin-04".to_string(),
                name: "Ben Hill Griffin Stadium".to_string(),
                location: Coordinate::new(29.65, -82.3486),
                fill_percent: 91.0,
                priority: 0.937,
                order: 0,
            }],
            polyline: vec![Coordinate::new(29.65, -82.3486)],
        };

        let value = serde_json::to_value(RouteResponse::from(&plan)).expect("serialize route");
        assert_eq!(
            value,
            json!({
                "stops": [{
                    "bin_id": "bin-04",
                    "name": "Ben Hill Griffin Stadium",
                    "lat": 29.65,
                    "lng": -82.3486,
                    "fill_percent": 91.0,
                    "priority": 0.937,
                    "order": 0
                }],
                "polyline": [[29.65, -82.3486]]
            })
        );
    }

    #[test]
    fn action_response_uses_lowercase_status() {
        let response = ActionResponse {
            status: RegisterOutcome::Updated.into(),
            bin_id: "test-bin-99".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize action response");
        assert_eq!(value, json!({ "status": "updated", "bin_id": "test-bin-99" }));
    }

    #[test]
    fn error_response_uses_screaming_snake_case_code() {
        let response = ErrorResponse {
            error_code: ErrorCode::InvalidWindow,
            error_message: "invalid window: 0 minutes (must be >= 1)".to_string(),
            timestamp: "2026-01-11T12:32:00Z".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize error response");
        assert_eq!(
            value,
            json!({
                "error_code": "INVALID_WINDOW",
                "error_message": "invalid window: 0 minutes (must be >= 1)",
                "timestamp": "2026-01-11T12:32:00Z"
            })
        );
    }

    #[test]
    fn pre_epoch_times_collapse_to_zero() {
        assert_eq!(unix_seconds(UNIX_EPOCH - Duration::from_secs(5)), 0.0);
    }
}
