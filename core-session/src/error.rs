use bridge_traits::BridgeError;
use core_catalog::CatalogError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Host bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
