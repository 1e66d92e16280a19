use thiserror::Error;

pub type StoreResult<T> = Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("row not found: {0}")]
    NotFound(String),
}
