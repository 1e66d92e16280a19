use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] store::Error),

    #[error(transparent)]
    Parse(#[from] parser_registry::ParseError),

    #[error(transparent)]
    Embed(#[from] embedding_adapter::Error),

    #[error(transparent)]
    Graph(#[from] symbol_graph::Error),

    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type IndexResult<T> = Result<T, Error>;
