use crate::heatmap::DEFAULT_WINDOW_MINUTES;
use crate::priority::PriorityWeights;
use crate::route::RouteOptions;
use crate::seed::SeedBin;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_PORT: u16 = 8000;
pub const DEFAULT_LOG_LEVEL: &str = "info";
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub calibration: Option<CalibrationSettings>,
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub routing: Option<RoutingSection>,
    #[serde(default)]
    pub heatmap: Option<HeatmapSection>,
    #[serde(default)]
    pub seed: Option<SeedSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalibrationSettings {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8000)
    pub port: Option<u16>,
}

/// Overrides for the route planner; unset keys keep the built-in policy.
/// The fill threshold and the stop cap are fixed and cannot be set here.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct RoutingSection {
    pub distance_penalty_per_km: Option<f64>,
    pub fill_weight: Option<f64>,
    pub age_weight: Option<f64>,
    pub age_saturation_hours: Option<f64>,
    pub unknown_age_hours: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HeatmapSection {
    /// Window used when a request does not name one (default: 120)
    pub default_window_minutes: Option<i64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedSection {
    #[serde(default)]
    pub bins: Vec<SeedBin>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

fn non_negative(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{key} must be finite and >= 0, got {value}"
        )))
    }
}

impl Config {
    pub fn calibration_path(&self) -> Option<&Path> {
        let path = self.calibration.as_ref()?.path.as_deref()?;
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    }

    /// Returns the log level filter string (default: "info")
    pub fn log_level(&self) -> &str {
        let level = self.logging.level.trim();
        if level.is_empty() { DEFAULT_LOG_LEVEL } else { level }
    }

    /// Returns the server port (default: 8000)
    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    pub fn route_options(&self) -> RouteOptions {
        let defaults = RouteOptions::default();
        let Some(routing) = self.routing.as_ref() else {
            return defaults;
        };
        let weights = PriorityWeights {
            fill_weight: routing.fill_weight.unwrap_or(defaults.weights.fill_weight),
            age_weight: routing.age_weight.unwrap_or(defaults.weights.age_weight),
            age_saturation_hours: routing
                .age_saturation_hours
                .unwrap_or(defaults.weights.age_saturation_hours),
            unknown_age_hours: routing
                .unknown_age_hours
                .unwrap_or(defaults.weights.unknown_age_hours),
        };

        RouteOptions {
            distance_penalty_per_km: routing
                .distance_penalty_per_km
                .unwrap_or(defaults.distance_penalty_per_km),
            weights,
            ..defaults
        }
    }

    /// Keeps priorities in [0, 1] and the heatmap default window usable.
    fn validate(&self) -> Result<(), ConfigError> {
        let options = self.route_options();
        let weights = options.weights;
        non_negative("routing.distance_penalty_per_km", options.distance_penalty_per_km)?;
        non_negative("routing.fill_weight", weights.fill_weight)?;
        non_negative("routing.age_weight", weights.age_weight)?;
        non_negative("routing.unknown_age_hours", weights.unknown_age_hours)?;
        if weights.fill_weight + weights.age_weight > 1.0 + WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::Invalid(format!(
                "routing.fill_weight + routing.age_weight must be <= 1, got {}",
                weights.fill_weight + weights.age_weight
            )));
        }
        if !(weights.age_saturation_hours.is_finite() && weights.age_saturation_hours > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "routing.age_saturation_hours must be > 0, got {}",
                weights.age_saturation_hours
            )));
        }
        let window = self.default_window_minutes();
        if window < 1 {
            return Err(ConfigError::Invalid(format!(
                "heatmap.default_window_minutes must be >= 1, got {window}"
            )));
        }
        Ok(())
    }

    /// Returns the default heatmap window in minutes (default: 120)
    pub fn default_window_minutes(&self) -> i64 {
        self.heatmap
            .as_ref()
            .and_then(|h| h.default_window_minutes)
            .unwrap_or(DEFAULT_WINDOW_MINUTES)
    }

    /// Returns the configured seed bins, or empty slice if not configured.
    pub fn seed_bins(&self) -> &[SeedBin] {
        self.seed
            .as_ref()
            .map(|s| s.bins.as_slice())
            .unwrap_or(&[])
    }
}
