use thiserror::Error;

#[derive(Error, Debug)]
pub enum SectionerError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StoreError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Query error: {0}")]
    Query(#[from] crate::query::QueryError),
}

pub type Result<T> = std::result::Result<T, SectionerError>;
