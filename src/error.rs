use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Calibration deserialization error: {0}")]
    Deserialization(#[from] bincode::Error),

    #[error("Insufficient landmarks: found {found}, need at least {required}")]
    InsufficientLandmarks { found: usize, required: usize },

    #[error("Mask buffer holds {len} labels, which does not match a {width}x{height} mask")]
    MaskSize { width: u32, height: u32, len: usize },

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
