// crates/claimgraph-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

use crate::graph::GraphError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("column '{column}' is missing from the {table} table")]
    MissingColumn { table: &'static str, column: String },

    #[error("column '{column}' row {row}: '{value}' is not a %Y-%m-%d date")]
    InvalidDate {
        column: String,
        row: usize,
        value: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse configuration TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
