// crates/claimgraph-core/src/beneficiary.rs

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

use crate::columns::normalize_column_names;
use crate::error::Result;
use crate::sources::{
    date_series, days_between, indicator, parse_date_column, read_source_csv, require_column,
    SourceFiles,
};

const TABLE: &str = "beneficiary";
const CHRONIC_CONDITION_MARKER: &str = "chronicCond";
const DAYS_PER_YEAR: f64 = 365.0;

/// Reads the beneficiary file under `data_dir` and derives its features.
pub fn make_beneficiary_frame(data_dir: impl AsRef<Path>) -> Result<DataFrame> {
    let files = SourceFiles::in_dir(data_dir);
    let raw = read_source_csv(&files.beneficiary)?;
    derive_beneficiary_features(&normalize_column_names(&raw)?)
}

/// Adds `dobYear`, `isDeceased`, `approxAge` and recodes the chronic-condition
/// and renal-disease indicators to 0/1. Expects normalized column names.
pub fn derive_beneficiary_features(df: &DataFrame) -> Result<DataFrame> {
    let mut output = recode_chronic_conditions(df)?;

    let dob = parse_date_column(df, TABLE, "dOB")?;
    let dod = parse_date_column(df, TABLE, "dOD")?;

    let max_date = dob.iter().chain(dod.iter()).flatten().max().copied();

    let dob_year: Vec<Option<i32>> = dob.iter().map(|d| d.map(|d| d.year())).collect();
    let is_deceased: Vec<i64> = dod.iter().map(|d| indicator(d.is_some())).collect();
    let approx_age: Vec<Option<f64>> = dob
        .iter()
        .zip(dod.iter())
        .map(|(birth, death)| approx_age(*birth, death.or(max_date)))
        .collect();

    let renal = require_column(df, TABLE, "renalDiseaseIndicator")?.cast(&DataType::String)?;
    let renal_indicator: Vec<i64> = renal
        .str()?
        .into_iter()
        .map(|value| indicator(value == Some("Y")))
        .collect();

    output.with_column(date_series("dOB", dob))?;
    output.with_column(date_series("dOD", dod))?;
    output.with_column(Series::new("dobYear".into(), dob_year))?;
    output.with_column(Series::new("isDeceased".into(), is_deceased))?;
    output.with_column(Series::new("approxAge".into(), approx_age))?;
    output.with_column(Series::new("renalDiseaseIndicator".into(), renal_indicator))?;

    Ok(output)
}

/// Age in years between `birth` and `until`, rounded to one decimal place
/// (ties to even).
pub fn approx_age(birth: Option<NaiveDate>, until: Option<NaiveDate>) -> Option<f64> {
    let days = days_between(birth, until)? as f64;
    Some(((days / DAYS_PER_YEAR) * 10.0).round_ties_even() / 10.0)
}

/// The source encodes chronic conditions as 1 = present, 2 = absent. Only
/// numeric values equal to 2 change; each column keeps its dtype and text
/// columns pass through untouched.
fn recode_chronic_conditions(df: &DataFrame) -> Result<DataFrame> {
    let recodes: Vec<Expr> = df
        .get_columns()
        .iter()
        .filter(|column| column.name().contains(CHRONIC_CONDITION_MARKER))
        .filter(|column| column.dtype().is_integer() || column.dtype().is_float())
        .map(|column| {
            let name = column.name().as_str();
            when(col(name).eq(lit(2)))
                .then(lit(0).cast(column.dtype().clone()))
                .otherwise(col(name))
                .alias(name)
        })
        .collect();

    if recodes.is_empty() {
        return Ok(df.clone());
    }

    Ok(df.clone().lazy().with_columns(recodes).collect()?)
}
