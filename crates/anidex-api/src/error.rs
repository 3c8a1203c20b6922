use thiserror::Error;

/// Errors from the remote catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed (status {status}): {message}")]
    Fetch { status: u16, message: String },

    #[error("anime not found: {0}")]
    NotFound(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid field `{field}`: {reason}")]
    Schema { field: &'static str, reason: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
