use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Embed(#[from] embedding_adapter::Error),
}

pub type RetrieverResult<T> = Result<T, Error>;
