use std::path::Path;

use polars::prelude::*;

use crate::columns::normalize_column_names;
use crate::error::Result;
use crate::sources::{indicator, read_source_csv, require_column, SourceFiles};

pub fn make_provider_frame(data_dir: impl AsRef<Path>) -> Result<DataFrame> {
    let files = SourceFiles::in_dir(data_dir);
    let raw = read_source_csv(&files.provider)?;
    derive_provider_features(&normalize_column_names(&raw)?)
}

/// Adds `potentialFraudInd`: 1 where `potentialFraud` is `"Yes"`, otherwise 0.
pub fn derive_provider_features(df: &DataFrame) -> Result<DataFrame> {
    let label = require_column(df, "provider", "potentialFraud")?.cast(&DataType::String)?;
    let fraud: Vec<i64> = label
        .str()?
        .into_iter()
        .map(|value| indicator(value == Some("Yes")))
        .collect();

    let mut output = df.clone();
    output.with_column(Series::new("potentialFraudInd".into(), fraud))?;
    Ok(output)
}
