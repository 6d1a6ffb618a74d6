use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kickstarter_regression::dataset::{train_test_split, InMemoryDataset, SplitConfig};
use kickstarter_regression::model::linear::LinearRegression;
use kickstarter_regression::InferenceModel;
use ndarray::{Array1, Array2, Axis};

const N_FEATURES: usize = 7;

/// Synthetic table shaped like the Kickstarter features: mixed magnitudes, one target.
fn synthetic_dataset(n_samples: usize) -> InMemoryDataset {
    let x = Array2::from_shape_fn((n_samples, N_FEATURES), |(i, j)| {
        let scale = 10f64.powi(j as i32 % 5);
        (((i * (j + 3) * 7919) % 1000) as f64 / 1000.0) * scale
    });
    let weights = Array1::from_shape_fn(N_FEATURES, |j| (j as f64 + 1.0) * 0.5);
    let y = x.dot(&weights) + x.map_axis(Axis(1), |r| r[0].sin());
    let names = (0..N_FEATURES).map(|j| format!("f{j}")).collect();
    InMemoryDataset::new(names, "y", x, y).expect("valid synthetic dataset")
}

fn bench_fit(c: &mut Criterion) {
    for n_samples in [1_000, 10_000, 100_000] {
        let dataset = synthetic_dataset(n_samples);
        c.bench_with_input(BenchmarkId::new("fit", n_samples), &dataset, |b, ds| {
            b.iter(|| {
                let model = LinearRegression::new().fit(black_box(ds));
                black_box(model)
            });
        });
    }
}

fn bench_split(c: &mut Criterion) {
    let dataset = synthetic_dataset(100_000);
    let config = SplitConfig::default();
    c.bench_function("train_test_split_100k", |b| {
        b.iter(|| black_box(train_test_split(black_box(&dataset), &config)))
    });
}

fn bench_predict_batch(c: &mut Criterion) {
    let train = synthetic_dataset(10_000);
    let model = LinearRegression::new().fit(&train).expect("fit");

    for batch_size in [10, 1_000, 100_000] {
        let batch = synthetic_dataset(batch_size);
        c.bench_with_input(
            BenchmarkId::new("predict_batch", batch_size),
            batch.features(),
            |b, x| {
                b.iter(|| black_box(model.predict_batch(black_box(x.view()))));
            },
        );
    }
}

criterion_group!(benches, bench_fit, bench_split, bench_predict_batch);
criterion_main!(benches);
