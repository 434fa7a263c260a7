use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid catalog entry at index {index}: {message}")]
    InvalidEntry { index: usize, message: String },

    #[error("Catalog load failed: {0}")]
    LoadFailed(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
