use serde::Deserialize;

/// Sensor report. `fill_percent` is the sensor's own estimate and is only
/// cross-checked; `ts` defaults to the time of receipt.
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryRequest {
    pub bin_id: String,
    pub distance_cm: f64,
    #[serde(default)]
    pub fill_percent: Option<f64>,
    #[serde(default)]
    pub ts: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegisterRequest {
    pub bin_id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RouteQuery {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct HeatmapQuery {
    pub minutes: Option<i64>,
}
