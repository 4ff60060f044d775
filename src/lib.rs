use thiserror::Error;

pub type Result<T> = std::result::Result<T, PartsError>;

#[derive(Error, Debug)]
pub enum PartsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod assistant;
pub mod catalog;
pub mod commands;
pub mod completion;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod indexer;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;
