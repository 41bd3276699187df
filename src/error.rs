use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("authorization denied: {0}")]
    Authorization(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unsupported source file: {0}")]
    UnsupportedSource(String),

    #[error("scan failed for target '{target}': {reason}")]
    TargetScan { target: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ScoutError>;
