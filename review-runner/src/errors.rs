use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] store::Error),

    #[error(transparent)]
    Llm(#[from] llm_service::Error),

    #[error(transparent)]
    Vcs(#[from] vcs_providers::Error),

    #[error(transparent)]
    Embed(#[from] embedding_adapter::Error),

    #[error(transparent)]
    Retriever(#[from] retriever::Error),
}

pub type RunnerResult<T> = Result<T, Error>;
