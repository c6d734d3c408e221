// crates/claimgraph-core/src/config.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::chunking::DEFAULT_CHUNK_SIZE;
use crate::error::{PipelineError, Result};
use crate::graph::GraphConfig;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub data_dir: PathBuf,
    pub chunk_size: usize,
    pub graph: GraphConfig,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            graph: GraphConfig::default(),
        }
    }
}

impl StageConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StageConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Applies `NEO4J_*` and `CLAIMGRAPH_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup("NEO4J_URI") {
            self.graph.uri = uri;
        }
        if let Some(database) = lookup("NEO4J_DATABASE") {
            self.graph.database = database;
        }
        if let Some(username) = lookup("NEO4J_USERNAME") {
            self.graph.username = username;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            self.graph.password = Some(password);
        }
        if let Some(data_dir) = lookup("CLAIMGRAPH_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }
        if let Some(chunk_size) = lookup("CLAIMGRAPH_CHUNK_SIZE") {
            self.chunk_size = chunk_size.trim().parse().map_err(|_| {
                PipelineError::Config(format!(
                    "CLAIMGRAPH_CHUNK_SIZE must be a positive integer, got '{chunk_size}'"
                ))
            })?;
        }
        self.validate()
    }

    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(PipelineError::Config("chunk_size must be at least 1".into()));
        }
        Ok(())
    }
}
