use thiserror::Error;

/// Errors raised while loading or validating a doctor catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("doctor at position {index} has an empty id")]
    EmptyId { index: usize },
    #[error("duplicate doctor id: {id}")]
    DuplicateId { id: String },
    #[error("doctor {id} has rating {rate}, expected a value between 0 and 5")]
    RateOutOfRange { id: String, rate: f64 },
    #[error("doctor {id} has unknown specialty '{specialty}'")]
    UnknownSpecialty { id: String, specialty: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
