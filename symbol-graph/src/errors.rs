//! Crate-wide error type for `symbol-graph`.

use thiserror::Error;

pub type GraphResult<T> = Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to serialize graph snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("symbol not found: {0}")]
    SymbolNotFound(String),
}
