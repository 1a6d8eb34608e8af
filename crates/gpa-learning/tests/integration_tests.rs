//! Integration tests for training, persistence and inference.
//!
//! These tests train small forests on in-memory tables and on the student
//! fixture, then exercise the saved artifact the way the CLI does.

use gpa_learning::{FittedPipeline, GpaLearningError, Predictor, TrainingConfig, TrainingPipeline};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

const TARGET: &str = "GPA (0-4 scale)";

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn small_students() -> DataFrame {
    df![
        "Age" => [18i64, 22, 25, 30, 19, 21, 24, 27, 20, 23, 26, 28],
        "Gender" => ["Male", "Female", "Female", "Male", "Female", "Male",
                     "Female", "Male", "Female", "Male", "Other", "Female"],
        "Academic_Year" => ["1st", "2nd", "3rd", "4th", "1st", "2nd",
                            "3rd", "4th", "1st", "2nd", "3rd", "4th"],
        TARGET => [3.0, 3.5, 2.8, 3.9, 3.1, 3.3, 2.9, 3.7, 3.2, 3.4, 2.7, 3.6],
    ]
    .unwrap()
}

fn config(n_estimators: usize) -> TrainingConfig {
    TrainingConfig::builder()
        .n_estimators(n_estimators)
        .build()
        .unwrap()
}

fn train(df: &DataFrame, config: TrainingConfig) -> FittedPipeline {
    TrainingPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .train(df)
        .expect("training should succeed")
}

fn target_range(df: &DataFrame) -> (f64, f64) {
    let gpa = df.column(TARGET).unwrap().f64().unwrap();
    (gpa.min().unwrap(), gpa.max().unwrap())
}

// ============================================================================
// End-to-End
// ============================================================================

#[test]
fn test_train_and_predict_record() {
    let df = small_students();
    let fitted = train(&df, config(25));

    let result = fitted.training_result();
    assert_eq!(result.n_train_rows + result.n_test_rows, 12);
    assert_eq!(result.n_test_rows, 3);
    assert!(result.metrics.mae >= 0.0);
    assert!(result.metrics.rmse >= result.metrics.mae);

    let gpa = fitted
        .predict_record(&json!({"Age": 22, "Gender": "Female", "Academic_Year": "2nd"}))
        .unwrap();
    let (lo, hi) = target_range(&df);
    assert!(gpa.is_finite());
    assert!(gpa >= lo && gpa <= hi, "prediction {} outside [{}, {}]", gpa, lo, hi);
}

#[test]
fn test_unseen_category_still_predicts() {
    let df = small_students();
    let fitted = train(&df, config(25));

    let gpa = fitted
        .predict_record(&json!({"Age": 22, "Gender": "NonBinary", "Academic_Year": "2nd"}))
        .unwrap();
    let (lo, hi) = target_range(&df);
    assert!(gpa >= lo && gpa <= hi);

    let record = gpa_learning::record_to_frame(
        &json!({"Age": 22, "Gender": "NonBinary", "Academic_Year": "2nd"}),
    )
    .unwrap();
    let x = fitted.transform(&record).unwrap();
    let names = fitted.preprocessor().feature_names();
    for (i, name) in names.iter().enumerate() {
        if name.starts_with("Gender=") {
            assert_eq!(x[[0, i]], 0.0, "{} should be zero", name);
        }
    }
}

#[test]
fn test_record_missing_feature_is_schema_mismatch() {
    let fitted = train(&small_students(), config(10));

    let err = fitted
        .predict_record(&json!({"Gender": "Male", "Academic_Year": "1st"}))
        .unwrap_err();

    assert_eq!(err.error_code(), "SCHEMA_MISMATCH");
    assert!(err.is_input_error());
    assert!(err.to_string().contains("Age"));
}

#[test]
fn test_extra_columns_are_ignored() {
    let fitted = train(&small_students(), config(10));

    let plain = fitted
        .predict_record(&json!({"Age": 24, "Gender": "Male", "Academic_Year": "3rd"}))
        .unwrap();
    let extra = fitted
        .predict_record(&json!({
            "Age": 24, "Gender": "Male", "Academic_Year": "3rd", "Favourite_Colour": "Blue"
        }))
        .unwrap();
    assert_eq!(plain, extra);
}

#[test]
fn test_null_values_are_imputed_at_inference() {
    let fitted = train(&small_students(), config(10));

    let gpa = fitted
        .predict_record(&json!({"Age": null, "Gender": null, "Academic_Year": "4th"}))
        .unwrap();
    assert!(gpa.is_finite());
}

#[test]
fn test_four_row_student_scenario() {
    let df = df![
        "Age" => [18i64, 22, 25, 30],
        "Gender" => ["Male", "Female", "Female", "Male"],
        "Academic_Year" => ["1st", "2nd", "3rd", "4th"],
        "GPA" => [3.0, 3.5, 2.8, 3.9],
    ]
    .unwrap();
    let config = TrainingConfig::builder()
        .target_column("GPA")
        .n_estimators(25)
        .build()
        .unwrap();
    let fitted = train(&df, config);

    let result = fitted.training_result();
    assert_eq!((result.n_train_rows, result.n_test_rows), (3, 1));
    let pre = fitted.preprocessor();
    assert_eq!(pre.roles.numeric, vec!["Age"]);
    assert_eq!(pre.roles.categorical, vec!["Gender", "Academic_Year"]);

    let row = json!({"Age": 22, "Gender": "Female", "Academic_Year": "2nd"});
    let width = fitted
        .transform(&gpa_learning::record_to_frame(&row).unwrap())
        .unwrap()
        .ncols();
    assert_eq!(width, pre.n_features_out());
    let gpa = fitted.predict_record(&row).unwrap();
    assert!((2.8..=3.9).contains(&gpa));

    let unseen = json!({"Age": 22, "Gender": "NonBinary", "Academic_Year": "2nd"});
    let x = fitted
        .transform(&gpa_learning::record_to_frame(&unseen).unwrap())
        .unwrap();
    assert_eq!(x.ncols(), width);
    for (i, name) in pre.feature_names().iter().enumerate() {
        if name.starts_with("Gender=") {
            assert_eq!(x[[0, i]], 0.0);
        }
    }
    assert!(fitted.predict_record(&unseen).unwrap().is_finite());

    let err = fitted
        .predict_record(&json!({"Gender": "Female", "Academic_Year": "2nd"}))
        .unwrap_err();
    assert_eq!(err.error_code(), "SCHEMA_MISMATCH");

    // One handle shared by many threads gives the same answer everywhere.
    let predictor = Predictor::new(fitted);
    let answers: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let predictor = predictor.clone();
                let row = row.clone();
                scope.spawn(move || predictor.predict_record(&row).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(answers.iter().all(|&a| a == gpa));
}

// ============================================================================
// Determinism and Invariants
// ============================================================================

#[test]
fn test_training_is_deterministic_across_thread_counts() {
    let df = small_students();
    let single = TrainingConfig::builder().n_estimators(20).n_jobs(1).build().unwrap();
    let parallel = TrainingConfig::builder().n_estimators(20).n_jobs(-1).build().unwrap();

    let a = train(&df, single);
    let b = train(&df, parallel);

    assert_eq!(a.training_result().metrics, b.training_result().metrics);
    assert_eq!(a.predict(&df).unwrap(), b.predict(&df).unwrap());
}

#[test]
fn test_different_seed_changes_split() {
    let df = small_students();
    let seeded = |seed| {
        TrainingConfig::builder()
            .n_estimators(10)
            .random_seed(seed)
            .build()
            .unwrap()
    };
    let a = train(&df, seeded(1));
    let b = train(&df, seeded(2));

    assert_ne!(a.predict(&df).unwrap(), b.predict(&df).unwrap());
}

#[test]
fn test_constant_feature_scales_to_zero() {
    let mut df = small_students();
    df.with_column(Series::new("Campus".into(), vec![1.0f64; 12]))
        .unwrap();
    let fitted = train(&df, config(10));

    let x = fitted.transform(&df).unwrap();
    let names = fitted.preprocessor().feature_names();
    let idx = names.iter().position(|n| n == "Campus").unwrap();
    assert!(x.column(idx).iter().all(|&v| v == 0.0));
}

#[test]
fn test_feature_width_matches_forest() {
    let fitted = train(&small_students(), config(10));

    let width = fitted.preprocessor().n_features_out();
    assert_eq!(fitted.forest().n_features(), width);
    assert_eq!(fitted.training_result().feature_importance.len(), width);

    let total: f64 = fitted.forest().feature_importances().iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn test_strict_categories_reject_unseen_values() {
    let strict = TrainingConfig::builder()
        .n_estimators(10)
        .strict_categories(true)
        .build()
        .unwrap();
    let fitted = train(&small_students(), strict);

    let err = fitted
        .predict_record(&json!({"Age": 22, "Gender": "NonBinary", "Academic_Year": "2nd"}))
        .unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_CATEGORY");
}

#[test]
fn test_missing_target_is_reported() {
    let df = small_students().drop(TARGET).unwrap();
    let err = TrainingPipeline::builder()
        .config(config(5))
        .build()
        .unwrap()
        .train(&df)
        .unwrap_err();
    assert!(matches!(err, GpaLearningError::TargetNotFound(_)));
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_save_load_roundtrip_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/deeper/model.json");
    let df = small_students();
    let fitted = train(&df, config(15));

    fitted.save(&path).unwrap();
    assert!(path.exists());

    let loaded = FittedPipeline::load(&path).unwrap();
    assert_eq!(loaded.feature_columns(), fitted.feature_columns());
    assert_eq!(loaded.info(), fitted.info());

    let before = fitted.predict(&df).unwrap();
    let after = loaded.predict(&df).unwrap();
    for (a, b) in before.iter().zip(&after) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn test_load_missing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let err = FittedPipeline::load(dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.error_code(), "ARTIFACT_NOT_FOUND");
}

#[test]
fn test_foreign_artifact_is_rejected() {
    let bytes = serde_json::to_vec(&json!({"format": "something-else", "format_version": 1}))
        .unwrap();
    let err = FittedPipeline::from_bytes(&bytes).unwrap_err();
    assert_eq!(err.error_code(), "INCOMPATIBLE_ARTIFACT");
}

#[test]
fn test_shared_predictor_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    train(&small_students(), config(5)).save(&path).unwrap();

    let a = Predictor::shared(&path).unwrap();
    let b = Predictor::shared(&path).unwrap();
    assert!(a.ptr_eq(&b));

    Predictor::evict(&path);
    let c = Predictor::shared(&path).unwrap();
    assert!(!a.ptr_eq(&c));

    let gpa = c
        .predict_record(&json!({"Age": 21, "Gender": "Male", "Academic_Year": "2nd"}))
        .unwrap();
    assert!(gpa.is_finite());
}

// ============================================================================
// Fixture
// ============================================================================

#[test]
fn test_train_csv_on_fixture() {
    let pipeline = TrainingPipeline::builder().config(config(30)).build().unwrap();
    let fitted = pipeline
        .train_csv(fixtures_path().join("students.csv"))
        .unwrap();

    let result = fitted.training_result();
    assert_eq!(result.n_test_rows, 12);
    assert_eq!(result.n_train_rows, 48);
    assert!(!result.feature_columns.contains(&"Student_ID".to_string()));
    assert!(!result.feature_columns.contains(&TARGET.to_string()));
    assert!(result.metrics.rmse.is_finite());

    let info = fitted.info();
    assert_eq!(info.categorical_features, vec!["Gender", "Academic_Year"]);
    assert_eq!(info.n_trees, 30);
}

#[test]
fn test_train_csv_missing_file() {
    let pipeline = TrainingPipeline::builder().config(config(5)).build().unwrap();
    let err = pipeline
        .train_csv(fixtures_path().join("missing.csv"))
        .unwrap_err();
    assert_eq!(err.error_code(), "DATASET_NOT_FOUND");
}
