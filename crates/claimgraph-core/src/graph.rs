//! Client seam for the property graph store that receives staged node keys.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub database: String,
    pub username: String,
    pub password: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "http://localhost:7474".to_string(),
            database: "neo4j".to_string(),
            username: "neo4j".to_string(),
            password: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("graph store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("statement failed with {code}: {message}")]
    Statement { code: String, message: String },
    #[error("invalid request: {0}")]
    Request(String),
    #[error("unexpected response: {0}")]
    Response(String),
    #[error("'{0}' is not a valid label or property name")]
    InvalidIdentifier(String),
}

/// Tabular result of one query: column names plus rows of JSON cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Integer in the first column of the first row.
    pub fn first_i64(&self) -> Option<i64> {
        self.rows.first()?.first()?.as_i64()
    }
}

#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Runs a parameterised Cypher statement and returns its result table.
    async fn run_cypher(&self, query: &str, params: Value) -> Result<QueryResult, GraphError>;
}

/// Talks to the Neo4j HTTP transactional endpoint, committing every
/// statement in its own transaction.
#[derive(Clone)]
pub struct HttpGraphClient {
    client: reqwest::Client,
    commit_url: String,
    username: String,
    password: Option<String>,
}

impl HttpGraphClient {
    pub fn new(config: &GraphConfig) -> Result<Self, GraphError> {
        if config.uri.is_empty() {
            return Err(GraphError::Configuration("graph uri cannot be empty".into()));
        }
        if config.database.is_empty() {
            return Err(GraphError::Configuration(
                "graph database name cannot be empty".into(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            commit_url: commit_url(&config.uri, &config.database),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

fn commit_url(uri: &str, database: &str) -> String {
    format!("{}/db/{}/tx/commit", uri.trim_end_matches('/'), database)
}

#[derive(Debug, Serialize)]
struct CommitRequest<'a> {
    statements: [Statement<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Statement<'a> {
    statement: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<StatementError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    columns: Vec<String>,
    data: Vec<ResultRow>,
}

#[derive(Debug, Deserialize)]
struct ResultRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct StatementError {
    code: String,
    message: String,
}

fn into_query_result(response: CommitResponse) -> Result<QueryResult, GraphError> {
    if let Some(error) = response.errors.into_iter().next() {
        return Err(GraphError::Statement {
            code: error.code,
            message: error.message,
        });
    }

    let result = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| GraphError::Response("response contained no results".into()))?;

    Ok(QueryResult {
        columns: result.columns,
        rows: result.data.into_iter().map(|row| row.row).collect(),
    })
}

#[async_trait]
impl GraphClient for HttpGraphClient {
    async fn run_cypher(&self, query: &str, params: Value) -> Result<QueryResult, GraphError> {
        let body = CommitRequest {
            statements: [Statement {
                statement: query,
                parameters: &params,
            }],
        };

        let response = self
            .client
            .post(&self.commit_url)
            .basic_auth(&self.username, self.password.as_ref())
            .header(reqwest::header::ACCEPT, "application/json;charset=UTF-8")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CommitResponse = response.json().await?;
        into_query_result(parsed)
    }
}
