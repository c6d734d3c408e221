// crates/claimgraph-core/src/sources.rs

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::debug;

use crate::error::{PipelineError, Result};

pub const BENEFICIARY_FILE: &str = "Train_Beneficiarydata-1542865627584.csv";
pub const INPATIENT_FILE: &str = "Train_Inpatientdata-1542865627584.csv";
pub const OUTPATIENT_FILE: &str = "Train_Outpatientdata-1542865627584.csv";
pub const PROVIDER_FILE: &str = "Train-1542865627584.csv";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MISSING_TOKENS: [&str; 4] = ["NA", "NaN", "N/A", "null"];

/// Paths of the four source files under one data directory.
#[derive(Debug, Clone)]
pub struct SourceFiles {
    pub beneficiary: PathBuf,
    pub inpatient: PathBuf,
    pub outpatient: PathBuf,
    pub provider: PathBuf,
}

impl SourceFiles {
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            beneficiary: dir.join(BENEFICIARY_FILE),
            inpatient: dir.join(INPATIENT_FILE),
            outpatient: dir.join(OUTPATIENT_FILE),
            provider: dir.join(PROVIDER_FILE),
        }
    }
}

/// Reads a headed CSV file, inferring the schema from every row.
pub fn read_source_csv(path: &Path) -> Result<DataFrame> {
    let content = std::fs::read(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let null_values = NullValues::AllColumns(MISSING_TOKENS.iter().map(|t| (*t).into()).collect());
    let parse_options = CsvParseOptions::default().with_null_values(Some(null_values));

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(parse_options)
        .into_reader_with_file_handle(Cursor::new(content))
        .finish()?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Read source file"
    );
    Ok(df)
}

pub(crate) fn require_column<'a>(
    df: &'a DataFrame,
    table: &'static str,
    name: &str,
) -> Result<&'a Column> {
    df.column(name).map_err(|_| PipelineError::MissingColumn {
        table,
        column: name.to_string(),
    })
}

/// Parses a column of `%Y-%m-%d` strings. Nulls stay `None`; anything else
/// that does not parse is an error.
pub(crate) fn parse_date_column(
    df: &DataFrame,
    table: &'static str,
    name: &str,
) -> Result<Vec<Option<NaiveDate>>> {
    let as_text = require_column(df, table, name)?.cast(&DataType::String)?;
    let values = as_text.str()?;

    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .map(Some)
                .map_err(|_| PipelineError::InvalidDate {
                    column: name.to_string(),
                    row,
                    value: raw.to_string(),
                }),
        })
        .collect()
}

pub(crate) fn date_series(name: &str, values: Vec<Option<NaiveDate>>) -> Series {
    Series::new(name.into(), values)
}

/// Whole days from `start` to `end`, or `None` when either side is missing.
pub(crate) fn days_between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<i64> {
    match (start, end) {
        (Some(start), Some(end)) => Some((end - start).num_days()),
        _ => None,
    }
}

pub(crate) fn indicator(flag: bool) -> i64 {
    i64::from(flag)
}
