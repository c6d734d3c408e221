use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::chunking::chunks;
use crate::graph::{GraphClient, GraphError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub submitted: usize,
    pub loaded: i64,
    pub cumulative: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub label: String,
    pub total: usize,
    pub batches: Vec<BatchReport>,
}

impl LoadReport {
    pub fn loaded(&self) -> i64 {
        self.batches.last().map_or(0, |batch| batch.cumulative)
    }

    pub fn cumulative_counts(&self) -> Vec<i64> {
        self.batches.iter().map(|batch| batch.cumulative).collect()
    }
}

/// Label and key name are spliced into the statement text, so only plain
/// identifiers are accepted.
pub fn validate_identifier(name: &str) -> Result<(), GraphError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(GraphError::InvalidIdentifier(name.to_string()))
    }
}

pub fn merge_nodes_statement(key_name: &str, label: &str) -> String {
    format!(
        "UNWIND $nodeKeys AS nodeKey \
         MERGE (n:{label} {{{key_name}: nodeKey}}) \
         RETURN count(n) AS nodeLoadedCount"
    )
}

fn key_params<K: Serialize>(batch: &[K]) -> Result<Value, GraphError> {
    let keys = serde_json::to_value(batch)
        .map_err(|err| GraphError::Request(format!("node keys could not be encoded: {err}")))?;
    let mut params = Map::new();
    params.insert("nodeKeys".to_string(), keys);
    Ok(Value::Object(params))
}

/// Merges one `label` node per key, `chunk_size` keys per request. Each request
/// finishes before the next starts; a failure stops the load where it is, and
/// re-running is safe because MERGE skips nodes that already exist.
pub async fn load_nodes_from_keys<C, K>(
    client: &C,
    node_keys: &[K],
    node_key_name: &str,
    node_label: &str,
    chunk_size: usize,
) -> Result<LoadReport, GraphError>
where
    C: GraphClient + ?Sized,
    K: Serialize + Sync,
{
    validate_identifier(node_label)?;
    validate_identifier(node_key_name)?;

    let total = node_keys.len();
    info!(label = node_label, "Loading nodes");
    info!(label = node_label, total, "Staging records");

    let statement = merge_nodes_statement(node_key_name, node_label);
    let mut cumulative: i64 = 0;
    let mut batches = Vec::new();

    for batch in chunks(node_keys, chunk_size) {
        let result = client.run_cypher(&statement, key_params(batch)?).await?;
        let loaded = result.first_i64().ok_or_else(|| {
            GraphError::Response("merge statement did not return a node count".into())
        })?;

        cumulative += loaded;
        info!(label = node_label, loaded = cumulative, total, "Loaded nodes");

        batches.push(BatchReport {
            submitted: batch.len(),
            loaded,
            cumulative,
        });
    }

    Ok(LoadReport {
        label: node_label.to_string(),
        total,
        batches,
    })
}
