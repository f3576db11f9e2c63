use criterion::{Criterion, black_box, criterion_group, criterion_main};
use netview_bench::util;
use netview_view::{ForceDirectedLayout, GridLayout, LayoutAlgorithm, LayoutInput};
use std::sync::mpsc;

fn bench_grid_layout_1000_nodes(c: &mut Criterion) {
    let (network, _) = util::synthetic_network(1000);
    let layout = GridLayout { spacing: 100.0 };

    c.bench_function("grid_layout_1000_nodes", |b| {
        b.iter(|| {
            let (tx, rx) = mpsc::channel();
            layout.apply(
                LayoutInput::from_network(black_box(&network), None),
                Box::new(move |positions| {
                    let _ = tx.send(positions);
                }),
            );
            black_box(rx.recv().unwrap());
        })
    });
}

fn bench_force_directed_200_nodes(c: &mut Criterion) {
    let (network, _) = util::synthetic_network(200);
    let layout = ForceDirectedLayout {
        iterations: 50,
        ..Default::default()
    };
    let input = LayoutInput::from_network(&network, None);

    c.bench_function("force_directed_200_nodes_50_iterations", |b| {
        b.iter(|| black_box(layout.compute(black_box(&input))))
    });
}

criterion_group!(
    benches,
    bench_grid_layout_1000_nodes,
    bench_force_directed_200_nodes
);
criterion_main!(benches);
