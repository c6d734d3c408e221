use std::path::PathBuf;

use polars::prelude::*;

use claimgraph_core::beneficiary::make_beneficiary_frame;
use claimgraph_core::claims::{
    derive_claim_features, join_claims_with_beneficiaries, make_claim_frame, make_in_out_frame,
};
use claimgraph_core::PipelineError;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

fn row_of(df: &DataFrame, claim_id: &str) -> usize {
    df.column("claimID")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .position(|value| value == Some(claim_id))
        .unwrap_or_else(|| panic!("{claim_id} missing"))
}

#[test]
fn inpatient_and_outpatient_rows_are_stacked() {
    let df = make_in_out_frame(data_dir()).expect("in/out frame");
    assert_eq!(df.height(), 5);
    assert_eq!(df.column("inpatient").unwrap().dtype(), &DataType::Int64);

    let inpatient = df.column("inpatient").unwrap().i64().unwrap();
    assert_eq!(inpatient.get(row_of(&df, "CLM1")), Some(1));
    assert_eq!(inpatient.get(row_of(&df, "CLM3")), Some(0));

    // admission columns only exist in the inpatient file
    let admission = df.column("admissionDt").unwrap();
    assert_eq!(admission.null_count(), 3);
    assert!(df.column("diagnosisGroupCode").is_ok());
    assert!(df.column("clmDiagnosisCode1").is_ok());
}

#[test]
fn claim_durations_and_indicators() {
    let df = derive_claim_features(&make_in_out_frame(data_dir()).unwrap()).expect("claim features");

    let claim_duration = df.column("claimDuration").unwrap().i64().unwrap();
    assert_eq!(claim_duration.get(row_of(&df, "CLM1")), Some(6));
    assert_eq!(claim_duration.get(row_of(&df, "CLM3")), Some(0));
    assert_eq!(claim_duration.get(row_of(&df, "CLM5")), Some(2));

    let admitted = df.column("admittedDuration").unwrap().i64().unwrap();
    assert_eq!(admitted.get(row_of(&df, "CLM2")), Some(2));
    assert_eq!(admitted.get(row_of(&df, "CLM4")), Some(0));
    assert_eq!(admitted.null_count(), 0);

    let att = df.column("attPhysicianInd").unwrap().i64().unwrap();
    let opr = df.column("oprPhysicianInd").unwrap().i64().unwrap();
    let other = df.column("otherPhysicianInd").unwrap().i64().unwrap();

    let clm2 = row_of(&df, "CLM2");
    assert_eq!((att.get(clm2), opr.get(clm2), other.get(clm2)), (Some(1), Some(1), Some(0)));

    let clm3 = row_of(&df, "CLM3");
    assert_eq!((att.get(clm3), opr.get(clm3), other.get(clm3)), (Some(1), Some(0), Some(1)));

    let clm4 = row_of(&df, "CLM4");
    assert_eq!((att.get(clm4), opr.get(clm4), other.get(clm4)), (Some(0), Some(0), Some(0)));
}

#[test]
fn claims_join_exactly_one_beneficiary() {
    let df = make_claim_frame(data_dir()).expect("claim frame");

    // CLM5 belongs to a beneficiary that is not in the beneficiary file
    assert_eq!(df.height(), 4);
    assert!(df
        .column("claimID")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .all(|value| value != Some("CLM5")));

    let age = df.column("approxAge").unwrap().f64().unwrap();
    assert_eq!(age.get(row_of(&df, "CLM1")), Some(66.7));

    let deceased = df.column("isDeceased").unwrap().i64().unwrap();
    assert_eq!(deceased.get(row_of(&df, "CLM2")), Some(1));
}

#[test]
fn joined_claims_keep_claim_order_and_inpatient_flag() {
    let df = make_claim_frame(data_dir()).expect("claim frame");

    let ids: Vec<Option<&str>> = df.column("claimID").unwrap().str().unwrap().into_iter().collect();
    assert_eq!(ids, [Some("CLM1"), Some("CLM2"), Some("CLM3"), Some("CLM4")]);

    assert_eq!(df.column("inpatient").unwrap().dtype(), &DataType::Int64);
    let inpatient: Vec<Option<i64>> =
        df.column("inpatient").unwrap().i64().unwrap().into_iter().collect();
    assert_eq!(inpatient, [Some(1), Some(1), Some(0), Some(0)]);
}

#[test]
fn join_keeps_left_order_when_beneficiaries_are_shuffled() -> Result<(), PipelineError> {
    let claims = df!(
        "claimID" => &["C1", "C2", "C3", "C4"],
        "beneID" => &["B3", "B1", "B3", "B2"],
    )?;
    let beneficiaries = df!(
        "beneID" => &["B2", "B1", "B3"],
        "approxAge" => &[70.0, 65.5, 80.1],
    )?;

    let joined = join_claims_with_beneficiaries(&claims, &beneficiaries)?;
    let ids: Vec<Option<&str>> = joined.column("claimID")?.str()?.into_iter().collect();
    assert_eq!(ids, [Some("C1"), Some("C2"), Some("C3"), Some("C4")]);

    let ages: Vec<Option<f64>> = joined.column("approxAge")?.f64()?.into_iter().collect();
    assert_eq!(ages, [Some(80.1), Some(65.5), Some(80.1), Some(70.0)]);
    Ok(())
}

#[test]
fn join_requires_bene_id_on_both_sides() -> Result<(), PipelineError> {
    let beneficiaries = make_beneficiary_frame(data_dir())?;
    let claims = df!("claimID" => &["CLM1"])?;

    let err = join_claims_with_beneficiaries(&claims, &beneficiaries).unwrap_err();
    assert!(matches!(err, PipelineError::MissingColumn { table: "claim", .. }));
    Ok(())
}

#[test]
fn missing_physician_column_is_reported() -> Result<(), PipelineError> {
    let df = df!(
        "claimID" => &["CLM1"],
        "claimStartDt" => &["2009-01-01"],
        "claimEndDt" => &["2009-01-02"],
        "admissionDt" => &[None::<&str>],
        "dischargeDt" => &[None::<&str>],
        "attendingPhysician" => &["PHY1"],
        "otherPhysician" => &[None::<&str>],
    )?;

    let err = derive_claim_features(&df).unwrap_err();
    assert!(
        matches!(err, PipelineError::MissingColumn { ref column, .. } if column == "operatingPhysician")
    );
    Ok(())
}
