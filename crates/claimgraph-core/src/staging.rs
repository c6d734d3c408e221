// crates/claimgraph-core/src/staging.rs

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use polars::prelude::*;
use tracing::info;

use crate::beneficiary::make_beneficiary_frame;
use crate::claims::{derive_claim_features, join_claims_with_beneficiaries, make_in_out_frame};
use crate::error::Result;
use crate::graph::GraphClient;
use crate::loader::{load_nodes_from_keys, LoadReport};
use crate::provider::make_provider_frame;
use crate::sources::require_column;

/// The three derived tables built from one data directory.
#[derive(Debug, Clone)]
pub struct ClaimsDataset {
    pub beneficiaries: DataFrame,
    pub claims: DataFrame,
    pub providers: DataFrame,
}

/// Builds every table once; the beneficiary frame is shared between the
/// beneficiary output and the claim join.
pub fn load_dataset(data_dir: impl AsRef<Path>) -> Result<ClaimsDataset> {
    let data_dir = data_dir.as_ref();
    let beneficiaries = make_beneficiary_frame(data_dir)?;
    let claims = derive_claim_features(&make_in_out_frame(data_dir)?)?;
    let claims = join_claims_with_beneficiaries(&claims, &beneficiaries)?;
    let providers = make_provider_frame(data_dir)?;

    info!(
        beneficiaries = beneficiaries.height(),
        claims = claims.height(),
        providers = providers.height(),
        "Built claims dataset"
    );

    Ok(ClaimsDataset {
        beneficiaries,
        claims,
        providers,
    })
}

const BENEFICIARY_KEY_COLUMNS: &[&str] = &["beneID"];
const CLAIM_KEY_COLUMNS: &[&str] = &["claimID"];
const PROVIDER_KEY_COLUMNS: &[&str] = &["provider"];
const PHYSICIAN_KEY_COLUMNS: &[&str] =
    &["attendingPhysician", "operatingPhysician", "otherPhysician"];

/// Table name, frame and key columns a node set reads from.
type KeySource<'a> = (&'static str, &'a DataFrame, &'static [&'static str]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeSet {
    Beneficiary,
    Claim,
    Provider,
    Physician,
}

impl NodeSet {
    pub const ALL: [NodeSet; 4] = [
        NodeSet::Beneficiary,
        NodeSet::Claim,
        NodeSet::Provider,
        NodeSet::Physician,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NodeSet::Beneficiary => "Beneficiary",
            NodeSet::Claim => "Claim",
            NodeSet::Provider => "Provider",
            NodeSet::Physician => "Physician",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            NodeSet::Beneficiary => "beneID",
            NodeSet::Claim => "claimID",
            NodeSet::Provider => "providerID",
            NodeSet::Physician => "physicianID",
        }
    }

    fn source<'a>(&self, dataset: &'a ClaimsDataset) -> KeySource<'a> {
        match self {
            NodeSet::Beneficiary => (
                "beneficiary",
                &dataset.beneficiaries,
                BENEFICIARY_KEY_COLUMNS,
            ),
            NodeSet::Claim => ("claim", &dataset.claims, CLAIM_KEY_COLUMNS),
            NodeSet::Provider => ("provider", &dataset.providers, PROVIDER_KEY_COLUMNS),
            NodeSet::Physician => ("claim", &dataset.claims, PHYSICIAN_KEY_COLUMNS),
        }
    }

    /// Distinct keys for this node set, in first-seen order.
    pub fn keys(&self, dataset: &ClaimsDataset) -> Result<Vec<String>> {
        let (table, df, columns) = self.source(dataset);
        unique_keys(df, table, columns)
    }
}

impl fmt::Display for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeSet::Beneficiary => "beneficiary",
            NodeSet::Claim => "claim",
            NodeSet::Provider => "provider",
            NodeSet::Physician => "physician",
        })
    }
}

impl FromStr for NodeSet {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        NodeSet::ALL
            .into_iter()
            .find(|set| set.to_string().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown node set '{value}'"))
    }
}

/// Non-null distinct values across `columns`, in first-seen order, read
/// column by column.
pub fn unique_keys(
    df: &DataFrame,
    table: &'static str,
    columns: &[&str],
) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();

    for name in columns {
        let values = require_column(df, table, name)?.cast(&DataType::String)?;
        for value in values.str()?.into_iter().flatten() {
            if seen.insert(value.to_string()) {
                keys.push(value.to_string());
            }
        }
    }

    Ok(keys)
}

/// Loads each requested node set in turn.
pub async fn stage_nodes<C>(
    client: &C,
    dataset: &ClaimsDataset,
    sets: &[NodeSet],
    chunk_size: usize,
) -> Result<Vec<LoadReport>>
where
    C: GraphClient + ?Sized,
{
    let mut reports = Vec::with_capacity(sets.len());
    for set in sets {
        let keys = set.keys(dataset)?;
        let report =
            load_nodes_from_keys(client, &keys, set.key_name(), set.label(), chunk_size).await?;
        reports.push(report);
    }
    Ok(reports)
}
