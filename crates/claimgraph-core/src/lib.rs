pub mod beneficiary;
pub mod chunking;
pub mod claims;
pub mod columns;
pub mod config;
pub mod error;
pub mod graph;
pub mod loader;
pub mod provider;
pub mod scaling;
pub mod sources;
pub mod staging;

pub use error::{PipelineError, Result};
