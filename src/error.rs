use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AppError {
    #[error("start bin '{0}' not found")]
    StartNotFound(String),
    #[error("end bin '{0}' not found")]
    EndNotFound(String),
    #[error("bin '{0}' not found")]
    BinNotFound(String),
    #[error("invalid window: {0} minutes (must be >= 1)")]
    InvalidWindow(i64),
    #[error("invalid distance reading: {0}")]
    InvalidReading(f64),
    #[error("invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(f64),
    #[error("invalid bin: {0}")]
    InvalidBin(String),
    #[error("state lock poisoned")]
    StateLock,
}
