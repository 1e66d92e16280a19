use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Llm(#[from] llm_service::Error),

    #[error(transparent)]
    Store(#[from] store::Error),

    #[error("embedding dimension mismatch: got {got}, expected {want}")]
    DimensionMismatch { got: usize, want: usize },
}

pub type EmbedResult<T> = Result<T, Error>;
