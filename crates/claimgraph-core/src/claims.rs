// crates/claimgraph-core/src/claims.rs

use std::path::Path;

use polars::prelude::*;

use crate::beneficiary::make_beneficiary_frame;
use crate::columns::normalize_column_names;
use crate::error::Result;
use crate::sources::{
    date_series, days_between, indicator, parse_date_column, read_source_csv, require_column,
    SourceFiles,
};

const TABLE: &str = "claim";

pub const JOIN_KEY: &str = "beneID";

/// Source column and the presence indicator derived from it.
pub const PHYSICIAN_COLUMNS: [(&str, &str); 3] = [
    ("operatingPhysician", "oprPhysicianInd"),
    ("attendingPhysician", "attPhysicianInd"),
    ("otherPhysician", "otherPhysicianInd"),
];

/// Reads both claim files, tags each row with `inpatient` (1 or 0) and stacks
/// them. Columns present in only one file are null for the other file's rows.
pub fn make_in_out_frame(data_dir: impl AsRef<Path>) -> Result<DataFrame> {
    let files = SourceFiles::in_dir(data_dir);
    let inpatient = normalize_column_names(&read_source_csv(&files.inpatient)?)?;
    let outpatient = normalize_column_names(&read_source_csv(&files.outpatient)?)?;
    stack_in_out(inpatient, outpatient)
}

pub fn stack_in_out(inpatient: DataFrame, outpatient: DataFrame) -> Result<DataFrame> {
    let inpatient = inpatient
        .lazy()
        .with_column(lit(1i64).cast(DataType::Int64).alias("inpatient"));
    let outpatient = outpatient
        .lazy()
        .with_column(lit(0i64).cast(DataType::Int64).alias("inpatient"));

    let stacked = concat_lf_diagonal(
        [inpatient, outpatient],
        UnionArgs {
            to_supertypes: true,
            ..Default::default()
        },
    )?
    .collect()?;

    Ok(stacked)
}

/// Adds claim and admission durations and physician-presence indicators.
/// Expects normalized column names.
pub fn derive_claim_features(df: &DataFrame) -> Result<DataFrame> {
    let mut output = df.clone();

    let claim_start = parse_date_column(df, TABLE, "claimStartDt")?;
    let claim_end = parse_date_column(df, TABLE, "claimEndDt")?;
    let admission = parse_date_column(df, TABLE, "admissionDt")?;
    let discharge = parse_date_column(df, TABLE, "dischargeDt")?;

    let claim_duration: Vec<Option<i64>> = claim_start
        .iter()
        .zip(claim_end.iter())
        .map(|(start, end)| days_between(*start, *end))
        .collect();

    // Outpatient claims have no admission, which counts as zero days admitted.
    let admitted_duration: Vec<i64> = admission
        .iter()
        .zip(discharge.iter())
        .map(|(admit, leave)| days_between(*admit, *leave).unwrap_or(0))
        .collect();

    output.with_column(date_series("claimStartDt", claim_start))?;
    output.with_column(date_series("claimEndDt", claim_end))?;
    output.with_column(Series::new("claimDuration".into(), claim_duration))?;
    output.with_column(date_series("admissionDt", admission))?;
    output.with_column(date_series("dischargeDt", discharge))?;
    output.with_column(Series::new("admittedDuration".into(), admitted_duration))?;

    for (source, target) in PHYSICIAN_COLUMNS {
        let present = require_column(df, TABLE, source)?
            .as_materialized_series()
            .is_not_null();
        let flags: Vec<i64> = present
            .into_iter()
            .map(|value| indicator(value == Some(true)))
            .collect();
        output.with_column(Series::new(target.into(), flags))?;
    }

    Ok(output)
}

/// Inner join on `beneID` in claim row order; claims without a matching
/// beneficiary are dropped.
pub fn join_claims_with_beneficiaries(
    claims: &DataFrame,
    beneficiaries: &DataFrame,
) -> Result<DataFrame> {
    require_column(claims, TABLE, JOIN_KEY)?;
    require_column(beneficiaries, "beneficiary", JOIN_KEY)?;

    let joined = claims
        .clone()
        .lazy()
        .join(
            beneficiaries.clone().lazy(),
            [col(JOIN_KEY)],
            [col(JOIN_KEY)],
            JoinArgs {
                maintain_order: MaintainOrderJoin::Left,
                ..JoinArgs::new(JoinType::Inner)
            },
        )
        .collect()?;

    Ok(joined)
}

/// Builds the beneficiary frame and the stacked claim frame from `data_dir`,
/// derives claim features and joins the two.
pub fn make_claim_frame(data_dir: impl AsRef<Path>) -> Result<DataFrame> {
    let data_dir = data_dir.as_ref();
    let beneficiaries = make_beneficiary_frame(data_dir)?;
    let claims = derive_claim_features(&make_in_out_frame(data_dir)?)?;
    join_claims_with_beneficiaries(&claims, &beneficiaries)
}
