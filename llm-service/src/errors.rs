use thiserror::Error;

pub type LlmResult<T> = Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to parse model output as a structured review: {0}")]
    InvalidReviewOutput(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid provider in config: expected {expected}")]
    WrongProvider { expected: &'static str },

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}: {snippet}")]
    Status { status: u16, url: String, snippet: String },

    #[error("failed to decode response: {0}")]
    Decode(String),
}
