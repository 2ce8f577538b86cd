#[path = "../util/util.rs"]
mod util;

use util::{random_palette, synthetic_grids};

use std::time::Duration;

use color_schemorator::{
    remap::{remap, remap_par},
    Palette, PixelGrid, Workers,
};
use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};

fn bench(
    c: &mut Criterion,
    group: &str,
    mut f: impl FnMut(&mut Bencher<WallTime>, &(Palette, &PixelGrid)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500));

    for (k, secs) in [(16, 2), (64, 3), (128, 4)] {
        group.measurement_time(Duration::from_secs(secs));
        let palette = random_palette(k, 42);
        for (name, grid) in synthetic_grids() {
            group.bench_with_input(
                BenchmarkId::new(k.to_string(), name),
                &(palette.clone(), grid),
                &mut f,
            );
        }
    }
}

fn remap_single(c: &mut Criterion) {
    bench(c, "remap_single", |b, (palette, grid)| {
        b.iter(|| remap(grid, palette).unwrap())
    })
}

fn remap_par_detected(c: &mut Criterion) {
    bench(c, "remap_par", |b, (palette, grid)| {
        b.iter(|| remap_par(grid, palette, Workers::detect()).unwrap())
    })
}

criterion_group!(benches, remap_single, remap_par_detected);
criterion_main!(benches);
