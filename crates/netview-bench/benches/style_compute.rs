use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use netview_bench::util;
use netview_style::{MapperSet, VisualStyle, compute_network_values};

fn bench_compute_network_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_network_values");
    for node_count in [1_000, 10_000] {
        let (network, tables) = util::synthetic_network(node_count);
        let style = util::mapped_style();
        let mappers = MapperSet::compile(&style);

        group.bench_with_input(
            BenchmarkId::new("mapped", node_count),
            &node_count,
            |b, _| {
                b.iter(|| {
                    let computed =
                        compute_network_values(black_box(&style), &mappers, &network, &tables);
                    black_box(computed);
                })
            },
        );

        let plain = VisualStyle::new();
        let no_mappers = MapperSet::compile(&plain);
        group.bench_with_input(
            BenchmarkId::new("defaults_only", node_count),
            &node_count,
            |b, _| {
                b.iter(|| {
                    let computed =
                        compute_network_values(black_box(&plain), &no_mappers, &network, &tables);
                    black_box(computed);
                })
            },
        );
    }
    group.finish();
}

fn bench_mapper_compile(c: &mut Criterion) {
    let style = util::mapped_style();
    c.bench_function("mapper_set_compile", |b| {
        b.iter(|| black_box(MapperSet::compile(black_box(&style))))
    });
}

criterion_group!(benches, bench_compute_network_values, bench_mapper_compile);
criterion_main!(benches);
