use medbook_model::CatalogError;
use thiserror::Error;

/// Failures surfaced while rendering a view.
///
/// These end up in the [`Boundary`](crate::Boundary) fallback rather than
/// being handled locally.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),
    #[error("render panicked: {0}")]
    Panicked(String),
    #[error("{0}")]
    Message(String),
}
