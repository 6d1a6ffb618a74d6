//! Train then predict through the files on disk.

use approx::assert_relative_eq;
use kickstarter_regression::config::TrainConfig;
use kickstarter_regression::dataset::{read_features, read_targets, write_features};
use kickstarter_regression::model::linear::LinearModel;
use kickstarter_regression::{Error, Fitted, InferenceModel, Metrics, Predictor, Trainer};
use std::fmt::Write as _;
use std::path::Path;
use tempfile::TempDir;

const ROWS: usize = 100;

fn target_of(i: usize) -> f64 {
    let x1 = i as f64;
    let x2 = ((i * 37) % 11) as f64;
    let noise = ((i * 7919) % 13) as f64 * 0.1 - 0.6;
    3.0 * x1 - 2.0 * x2 + 5.0 + noise
}

/// A table with two numeric features, a text column and the target.
fn write_dataset(path: &Path) {
    let mut csv = String::from("x1,label,x2,y\n");
    for i in 0..ROWS {
        writeln!(
            csv,
            "{},project {},{},{}",
            i,
            i,
            (i * 37) % 11,
            target_of(i)
        )
        .unwrap();
    }
    std::fs::write(path, csv).unwrap();
}

fn config(dir: &Path) -> TrainConfig {
    let dataset = dir.join("featured.csv");
    write_dataset(&dataset);
    TrainConfig {
        dataset,
        target: "y".into(),
        features: vec!["x1".into(), "x2".into()],
        model_out: dir.join("models/linear_regression_model.sav"),
        x_test_out: dir.join("data/X_test.csv"),
        y_test_out: dir.join("data/y_test.csv"),
        ..TrainConfig::default()
    }
}

#[test]
fn test_train_writes_aligned_test_partition() {
    let dir = TempDir::new().unwrap();
    let cfg = config(dir.path());

    let report = Trainer::run(&cfg).unwrap();
    assert_eq!(report.n_train, 80);
    assert_eq!(report.n_test, 20);
    assert!(cfg.model_out.exists());

    let (names, x_test) = read_features(&cfg.x_test_out).unwrap();
    let (target, y_test) = read_targets(&cfg.y_test_out).unwrap();
    assert_eq!(names, ["x1", "x2"]);
    assert_eq!(target, "y");
    assert_eq!(x_test.nrows(), 20);
    assert_eq!(y_test.len(), 20);

    // x1 is the source row index, so each y_test entry must belong to its X_test row
    for (row, y) in x_test.rows().into_iter().zip(y_test.iter()) {
        let i = row[0] as usize;
        assert_eq!(row[1], ((i * 37) % 11) as f64);
        assert_eq!(*y, target_of(i));
    }
}

#[test]
fn test_same_seed_reproduces_artifacts() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let a = config(first.path());
    let b = config(second.path());

    Trainer::run(&a).unwrap();
    Trainer::run(&b).unwrap();

    for (pa, pb) in [
        (&a.model_out, &b.model_out),
        (&a.x_test_out, &b.x_test_out),
        (&a.y_test_out, &b.y_test_out),
    ] {
        assert_eq!(std::fs::read(pa).unwrap(), std::fs::read(pb).unwrap());
    }
}

#[test]
fn test_different_seed_changes_partition() {
    let dir = TempDir::new().unwrap();
    let cfg = config(dir.path());
    Trainer::run(&cfg).unwrap();
    let (_, first) = read_features(&cfg.x_test_out).unwrap();

    let reseeded = TrainConfig { seed: 7, ..cfg.clone() };
    Trainer::run(&reseeded).unwrap();
    let (_, second) = read_features(&reseeded.x_test_out).unwrap();

    assert_ne!(first, second);
}

#[test]
fn test_predictor_metric_matches_independent_computation() {
    let dir = TempDir::new().unwrap();
    let cfg = config(dir.path());
    Trainer::run(&cfg).unwrap();

    let report = Predictor::from_files(&cfg.model_out, &cfg.x_test_out, &cfg.y_test_out)
        .unwrap()
        .evaluate()
        .unwrap();

    let model = LinearModel::<Fitted>::load_from_file(&cfg.model_out).unwrap();
    let (_, x_test) = read_features(&cfg.x_test_out).unwrap();
    let (_, y_test) = read_targets(&cfg.y_test_out).unwrap();
    let manual: Vec<f64> = x_test
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .zip(model.coefficients())
                .map(|(x, w)| x * w)
                .sum::<f64>()
                + model.intercept()
        })
        .collect();
    let mse = y_test
        .iter()
        .zip(&manual)
        .map(|(y, p)| (y - p).powi(2))
        .sum::<f64>()
        / manual.len() as f64;

    assert_relative_eq!(report.metrics.mse, mse, max_relative = 1e-9);
    assert_relative_eq!(
        report.metrics.r_squared,
        Metrics::r_squared(&y_test.to_vec(), &manual).unwrap(),
        max_relative = 1e-9
    );
    // the noise is bounded by 0.6, so the fit is close to the generating relation
    assert!(report.metrics.rmse < 1.0);
    assert_relative_eq!(model.coefficients()[0], 3.0, max_relative = 1e-2);
}

#[test]
fn test_model_round_trip_predicts_identically() {
    let dir = TempDir::new().unwrap();
    let cfg = config(dir.path());
    Trainer::run(&cfg).unwrap();

    let model = LinearModel::<Fitted>::load_from_file(&cfg.model_out).unwrap();
    let copy = dir.path().join("copy.sav");
    model.save_to_file(&copy).unwrap();
    let reloaded = LinearModel::<Fitted>::load_from_file(&copy).unwrap();

    let (_, x_test) = read_features(&cfg.x_test_out).unwrap();
    assert_eq!(
        model.predict_batch(x_test.view()).unwrap(),
        reloaded.predict_batch(x_test.view()).unwrap()
    );
}

#[test]
fn test_schema_mismatch_is_reported() {
    let dir = TempDir::new().unwrap();
    let cfg = config(dir.path());
    Trainer::run(&cfg).unwrap();

    let (mut names, x_test) = read_features(&cfg.x_test_out).unwrap();
    names.reverse();
    let swapped = dir.path().join("data/X_swapped.csv");
    write_features(&swapped, &names, &x_test).unwrap();

    let err = Predictor::from_files(&cfg.model_out, &swapped, &cfg.y_test_out).unwrap_err();
    match err {
        Error::FeatureMismatch { expected, got } => {
            assert_eq!(expected, ["x1", "x2"]);
            assert_eq!(got, ["x2", "x1"]);
        }
        other => panic!("expected a feature mismatch, got {other}"),
    }
}

#[test]
fn test_missing_dataset_is_not_found() {
    let dir = TempDir::new().unwrap();
    let cfg = TrainConfig {
        dataset: dir.path().join("absent.csv"),
        ..config(dir.path())
    };
    let err = Trainer::run(&cfg).unwrap_err();
    assert!(err.is_not_found());
    assert!(!cfg.model_out.exists());
}
