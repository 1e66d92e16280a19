use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("parser init failed for {language}: {reason}")]
    Init { language: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    File { path: String, reason: String },
}
