use criterion::{Criterion, black_box, criterion_group, criterion_main};
use nikrome::checkpoint::CheckpointFilter;
use nikrome::results::RunnerDataset;
use std::time::Duration;

const HEADERS: [&str; 8] = [
    "Nom",
    "Temps",
    "Class/Sx",
    "Class/Cat",
    "Vit.",
    "StEsteve",
    "ChReynard",
    "Sommet",
];

fn create_sample_dataset(runners: usize) -> RunnerDataset {
    let data = (0..runners)
        .map(|i| {
            let gender = if i % 3 == 0 { "F" } else { "M" };
            let passed = i % 5 != 0;
            let time = |minutes: usize| {
                if passed {
                    format!("{:02}:{:02}:00", minutes / 60, minutes % 60)
                } else {
                    "--".to_string()
                }
            };
            vec![
                format!("Runner {}", i),
                time(90 + i % 60),
                format!("{}({})", i + 1, gender),
                format!("{}(SEH)", i / 4 + 1),
                "14.2".to_string(),
                time(30 + i % 20),
                time(60 + i % 40),
                time(90 + i % 60),
            ]
        })
        .collect();

    RunnerDataset::new(HEADERS.iter().map(|h| h.to_string()).collect(), data)
}

fn bench_checkpoint_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("checkpoint_filter");
    let filter = CheckpointFilter::default();

    for runners in [100, 1000, 5000] {
        let dataset = create_sample_dataset(runners);
        group.bench_function(format!("apply_{}_runners", runners), |b| {
            b.iter(|| black_box(filter.apply(&dataset, "ChReynard").unwrap()));
        });
    }

    let dataset = create_sample_dataset(1000);
    group.bench_function("summary_all_checkpoints", |b| {
        b.iter(|| {
            for checkpoint in ["StEsteve", "ChReynard", "Sommet"] {
                black_box(filter.summary(&dataset, checkpoint).unwrap());
            }
        });
    });

    group.finish();
}

fn bench_dataset_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset_parsing");

    let json = serde_json::to_string(&create_sample_dataset(1000)).unwrap();
    group.bench_function("deserialize_and_validate", |b| {
        b.iter(|| {
            let dataset: RunnerDataset = serde_json::from_str(&json).unwrap();
            dataset.validate().unwrap();
            black_box(dataset)
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(100);
    targets = bench_checkpoint_filter, bench_dataset_parsing
}
criterion_main!(benches);
