// Error types for datastore operations
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DatastoreError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] duckdb::arrow::error::ArrowError),

    #[error("Datastore not found: {name}")]
    NotFound { name: String },

    #[error("Datastore defined more than once: {name}")]
    Duplicate { name: String },

    #[error("Could not read datastore config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse datastore config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

impl DatastoreError {
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        DatastoreError::NotFound { name: name.into() }
    }
}
