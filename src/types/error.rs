use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum S3migrateError {
    #[error("cancelled")]
    Cancelled,
    #[error("table name must be specified.")]
    EmptyTableName,
    #[error("invalid table name: {0}")]
    InvalidTableName(String),
}
