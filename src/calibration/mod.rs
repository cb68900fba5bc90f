use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

pub mod model;

pub use model::{CalibrationModel, ReconciledReading};

/// On-disk calibration, usually `config/calibration.json`.
#[derive(Debug, Deserialize)]
pub struct CalibrationFile {
    pub empty_distance_cm: Option<f64>,
    pub full_distance_cm: Option<f64>,
}

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("failed to read calibration file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse calibration file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid calibration: {0}")]
    Invalid(String),
}

pub fn create_model(file: &CalibrationFile) -> Result<CalibrationModel, CalibrationError> {
    let defaults = CalibrationModel::default();
    let model = CalibrationModel {
        empty_distance_cm: file.empty_distance_cm.unwrap_or(defaults.empty_distance_cm),
        full_distance_cm: file.full_distance_cm.unwrap_or(defaults.full_distance_cm),
    };

    if !model.is_valid() {
        return Err(CalibrationError::Invalid(format!(
            "empty distance ({} cm) must exceed full distance ({} cm)",
            model.empty_distance_cm, model.full_distance_cm
        )));
    }
    Ok(model)
}

pub fn load_calibration_from_path(
    path: impl AsRef<Path>,
) -> Result<CalibrationModel, CalibrationError> {
    let contents = std::fs::read_to_string(path)?;
    let file: CalibrationFile = serde_json::from_str(&contents)?;
    create_model(&file)
}
