use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("the Java vendor '{0}' is currently not supported (supported: adoptium)")]
    UnsupportedVendor(String),

    #[error("invalid update request: {0}")]
    InvalidRequest(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("release catalog error: {0}")]
    Catalog(String),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("unexpected archive layout: {0}")]
    Structure(String),

    #[error("build marker error: {0}")]
    Marker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
