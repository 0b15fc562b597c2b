//! Quarterly event-study estimator tests.

mod common;

use causal_tools::core::{CovarianceType, NaError};
use causal_tools::estimators::{EstimationError, EventStudyEstimator, EventStudyEstimatorBuilder};
use causal_tools::panel::{PanelError, QuarterLabel};
use polars::prelude::*;

fn quarterly_estimator(baseline: &str) -> EventStudyEstimatorBuilder {
    EventStudyEstimator::builder()
        .outcome("price")
        .treatment_column("group")
        .time_column("start_time")
        .treated_value(1)
        .baseline(baseline)
}

fn label(raw: &str) -> QuarterLabel {
    raw.parse().unwrap()
}

/// Controls observed in three quarters, treated units only in the first two.
fn missing_treated_quarter() -> DataFrame {
    df! {
        "price" => [1.0, 1.2, 2.0, 2.1, 3.0, 3.3, 1.6, 1.9, 2.7, 2.6],
        "group" => ["c", "c", "c", "c", "c", "c", "t", "t", "t", "t"],
        "start_time" => [
            "2022-01-15", "2022-02-20", "2022-04-01", "2022-06-30 23:59:59",
            "2022-07-01", "2022-09-10", "2022-03-01", "2022-01-31",
            "2022-05-05", "2022-04-11",
        ],
    }
    .unwrap()
}

// ============================================================================
// Design Layout Tests
// ============================================================================

#[test]
fn test_regressor_layout() {
    let df = common::event_study_panel(4, 0.1, 3);
    let study = quarterly_estimator("20222")
        .controls(["size"])
        .build()
        .unwrap()
        .fit(&df)
        .expect("fit should succeed");

    assert_eq!(
        study.model.param_names(),
        vec![
            "const",
            "size",
            "treatment",
            "quarter_20214",
            "quarter_20221",
            "quarter_20223",
            "quarter_20224",
            "inter_20214",
            "inter_20224",
            "inter_20221",
            "inter_20223",
        ]
    );
}

#[test]
fn test_quarters_in_first_occurrence_order() {
    let df = common::event_study_panel(2, 0.1, 3);
    let study = quarterly_estimator("20222").build().unwrap().fit(&df).unwrap();

    let observed: Vec<String> = study.quarters.iter().map(ToString::to_string).collect();
    assert_eq!(observed, vec!["20222", "20214", "20224", "20221", "20223"]);
    assert_eq!(study.baseline, label("20222"));
    assert_eq!(study.last_quarter(), Some(label("20223")));
    assert_eq!(study.tick_labels(), vec!["20214", "20224", "20221", "20223"]);
}

#[test]
fn test_interaction_columns_are_dummy_times_treatment() {
    let df = common::event_study_panel(2, 0.1, 3);
    let study = quarterly_estimator("20222").build().unwrap().fit(&df).unwrap();

    let names = study.model.regressor_names();
    let col = |name: &str| names.iter().position(|n| n == name).unwrap();
    let design = study.model.design();
    let (treatment, dummy, inter) = (col("treatment"), col("quarter_20224"), col("inter_20224"));

    for i in 0..design.nrows() {
        assert_eq!(design[(i, inter)], design[(i, dummy)] * design[(i, treatment)]);
    }
    // One treated and one control row per quarter per cycle
    let n_inter: f64 = (0..design.nrows()).map(|i| design[(i, inter)]).sum();
    assert_eq!(n_inter, 2.0);
}

// ============================================================================
// Estimation Tests
// ============================================================================

#[test]
fn test_recovers_quarterly_effects() {
    let df = common::event_study_panel(40, 0.1, 11);
    let study = quarterly_estimator("20222")
        .controls(["size"])
        .build()
        .unwrap()
        .fit(&df)
        .expect("fit should succeed");

    for (_, raw, _, effect) in common::QUARTERS {
        if raw == "20222" {
            assert!(study.model.coefficient("inter_20222").is_none());
            continue;
        }
        let estimate = study
            .model
            .coefficient(&format!("inter_{raw}"))
            .unwrap()
            .estimate;
        assert!(
            (estimate - effect).abs() < 0.1,
            "inter_{raw}: {estimate} vs {effect}"
        );
    }
    assert_eq!(study.model.covariance_type(), CovarianceType::HC3);
}

#[test]
fn test_baseline_may_be_last_quarter() {
    let df = common::event_study_panel(3, 0.1, 5);
    let study = quarterly_estimator("20223").build().unwrap().fit(&df).unwrap();

    assert_eq!(study.last_quarter(), Some(study.baseline));
    assert_eq!(study.tick_labels(), vec!["20222", "20214", "20224", "20221"]);
}

#[test]
fn test_quarter_without_treated_rows_is_aliased() {
    let study = EventStudyEstimator::builder()
        .outcome("price")
        .treatment_column("group")
        .time_column("start_time")
        .treated_value("t")
        .baseline("20222")
        .hc3_se(false)
        .build()
        .unwrap()
        .fit(&missing_treated_quarter())
        .expect("fit should succeed");

    assert_eq!(study.model.aliased_regressors(), vec!["inter_20223"]);
    let empty = study.model.coefficient("inter_20223").unwrap();
    assert!(empty.estimate.is_nan());
    assert!(empty.std_error.is_nan());
    assert!(study.model.coefficient("inter_20221").unwrap().estimate.is_finite());
    assert_eq!(study.model.covariance_type(), CovarianceType::NonRobust);
}

// ============================================================================
// Error Handling
// ============================================================================

#[test]
fn test_baseline_not_observed() {
    let df = common::event_study_panel(2, 0.1, 3);
    let err = quarterly_estimator("20231").build().unwrap().fit(&df).unwrap_err();

    match err {
        EstimationError::Panel(PanelError::BaselineNotObserved { baseline, observed }) => {
            assert_eq!(baseline, "20231");
            assert!(observed.contains("20224"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_baseline_label() {
    for raw in ["2022Q2", "20225", "2022"] {
        let err = quarterly_estimator(raw).build().unwrap_err();
        assert!(matches!(
            err,
            EstimationError::Panel(PanelError::InvalidQuarterLabel(_))
        ));
    }
}

#[test]
fn test_missing_value_in_used_column_fails() {
    let df = df! {
        "price" => [Some(1.0), None, Some(2.0), Some(2.5)],
        "group" => [1_i64, 0, 1, 0],
        "start_time" => ["2022-01-01", "2022-02-01", "2022-05-01", "2022-05-02"],
    }
    .unwrap();

    let err = quarterly_estimator("20221").build().unwrap().fit(&df).unwrap_err();
    assert!(matches!(
        err,
        EstimationError::MissingValues(NaError::NaValuesPresent { ref column, row: 1, .. })
            if column == "price"
    ));
}

#[test]
fn test_missing_value_in_unused_column_is_ignored() {
    let mut df = common::event_study_panel(2, 0.1, 3);
    let n = df.height();
    let note: Vec<Option<&str>> = (0..n).map(|i| (i % 3 != 0).then_some("x")).collect();
    df.with_column(Column::new("note".into(), note)).unwrap();

    let study = quarterly_estimator("20222").build().unwrap().fit(&df).unwrap();
    assert_eq!(study.model.n_observations(), n);
}

#[test]
fn test_zoned_time_column_rejected() {
    let mut df = common::event_study_panel(2, 0.1, 3);
    let zone = TimeZone::opt_try_new(Some("Europe/Zurich")).unwrap();
    let millis = df.column("start_time").unwrap().cast(&DataType::Int64).unwrap();
    let zoned = millis
        .i64()
        .unwrap()
        .clone()
        .into_datetime(TimeUnit::Milliseconds, zone)
        .into_series();
    df.with_column(zoned).unwrap();

    let err = quarterly_estimator("20222").build().unwrap().fit(&df).unwrap_err();
    assert!(matches!(
        err,
        EstimationError::Panel(PanelError::UnsupportedTimeType { ref column, .. })
            if column == "start_time"
    ));
}

#[test]
fn test_missing_builder_field() {
    let err = EventStudyEstimator::builder()
        .outcome("price")
        .baseline("20222")
        .build()
        .unwrap_err();
    assert!(matches!(err, EstimationError::MissingField(_)));
}
