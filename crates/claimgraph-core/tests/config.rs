use std::collections::HashMap;
use std::path::PathBuf;

use claimgraph_core::chunking::DEFAULT_CHUNK_SIZE;
use claimgraph_core::config::StageConfig;
use claimgraph_core::PipelineError;

#[test]
fn empty_config_uses_defaults() {
    let config = StageConfig::from_toml_str("").expect("config");
    assert_eq!(config, StageConfig::default());
    assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    assert_eq!(config.graph.uri, "http://localhost:7474");
    assert_eq!(config.graph.database, "neo4j");
}

#[test]
fn toml_overrides_defaults() {
    let config = StageConfig::from_toml_str(
        r#"
        data_dir = "/srv/claims"
        chunk_size = 1000

        [graph]
        uri = "http://graph.internal:7474"
        username = "loader"
        "#,
    )
    .expect("config");

    assert_eq!(config.data_dir, PathBuf::from("/srv/claims"));
    assert_eq!(config.chunk_size, 1000);
    assert_eq!(config.graph.uri, "http://graph.internal:7474");
    assert_eq!(config.graph.username, "loader");
    assert_eq!(config.graph.database, "neo4j");
    assert_eq!(config.graph.password, None);
}

#[test]
fn zero_chunk_size_is_rejected() {
    let err = StageConfig::from_toml_str("chunk_size = 0").unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn malformed_toml_is_reported() {
    let err = StageConfig::from_toml_str("chunk_size = \"many\"").unwrap_err();
    assert!(matches!(err, PipelineError::Toml(_)));
}

#[test]
fn environment_overrides_file_values() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("NEO4J_URI", "http://env-graph:7474"),
        ("NEO4J_PASSWORD", "secret"),
        ("CLAIMGRAPH_DATA_DIR", "/data/env"),
        ("CLAIMGRAPH_CHUNK_SIZE", "250"),
    ]);

    let mut config = StageConfig::default();
    config
        .apply_env(|key| env.get(key).map(|v| v.to_string()))
        .expect("overrides apply");

    assert_eq!(config.graph.uri, "http://env-graph:7474");
    assert_eq!(config.graph.password.as_deref(), Some("secret"));
    assert_eq!(config.graph.username, "neo4j");
    assert_eq!(config.data_dir, PathBuf::from("/data/env"));
    assert_eq!(config.chunk_size, 250);
}

#[test]
fn non_numeric_chunk_size_env_is_a_config_error() {
    let mut config = StageConfig::default();
    let err = config
        .apply_env(|key| (key == "CLAIMGRAPH_CHUNK_SIZE").then(|| "lots".to_string()))
        .unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}
