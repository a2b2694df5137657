use benchviz_core::{
    analysis::analyze,
    config::{AnalysisConfig, ReaderConfig},
    reader::Reader,
    store::MemoryTree,
    suite::aggregate,
};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::path::Path;

// A Criterion-shaped tree: `groups` groups with sizes 10^1..=10^params each.
fn build_tree(groups: usize, params: u32) -> MemoryTree {
    let mut tree = MemoryTree::new();
    for g in 0..groups {
        for exp in 1..=params {
            let size = 10u64.pow(exp);
            let mean = size as f64 * (1_790.0 + g as f64);
            let estimates = format!(
                r#"{{"mean":{{"point_estimate":{},"confidence_interval":{{"lower_bound":{},"upper_bound":{}}}}}}}"#,
                mean,
                mean * 0.99,
                mean * 1.01
            );
            tree.insert(format!("crit/group_{}/{}/new/estimates.json", g, size), estimates);
            tree.insert(format!("crit/group_{}/{}/base/estimates.json", g, size), "{}");
        }
    }
    tree
}

fn bench_scan(c: &mut Criterion) {
    let tree = build_tree(32, 4);
    let config = ReaderConfig::default();
    let reader = Reader::new(&tree, Path::new("crit"), &config);

    c.bench_function("scan_sequential_128", |b| {
        b.iter(|| {
            let scan = reader.scan().expect("root exists");
            black_box(aggregate(scan))
        })
    });

    c.bench_function("scan_parallel_128", |b| {
        b.iter(|| black_box(reader.scan_parallel().expect("root exists")))
    });
}

fn bench_analyze(c: &mut Criterion) {
    let tree = build_tree(32, 4);
    let config = ReaderConfig::default();
    let reader = Reader::new(&tree, Path::new("crit"), &config);
    let suite = aggregate(reader.scan().expect("root exists")).suite;
    let analysis = AnalysisConfig::default();

    c.bench_function("analyze_128", |b| b.iter(|| black_box(analyze(black_box(&suite), &analysis))));
}

criterion_group!(benches, bench_scan, bench_analyze);
criterion_main!(benches);
