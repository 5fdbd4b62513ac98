use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use weightedbag::WeightedSampler;

fn gen_pairs(n: usize) -> Vec<(usize, i32)> {
    let mut rng = Pcg32::seed_from_u64(777);
    (0..n).map(|i| (i, rng.random_range(1..1_000))).collect()
}

fn bench_sampler_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler_build");
    for &n in &[2usize, 8, 64, 256, 1024] {
        let pairs = gen_pairs(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("from_pairs_n={n}"), |b| {
            b.iter(|| {
                black_box(WeightedSampler::from_pairs_with_rng(
                    black_box(pairs.clone()),
                    Pcg32::seed_from_u64(1),
                ))
                .unwrap()
            });
        });
        // one rebuild per call, same as any single-weight edit
        group.bench_function(format!("set_weight_at_n={n}"), |b| {
            b.iter_batched_ref(
                || WeightedSampler::from_pairs_with_rng(pairs.clone(), Pcg32::seed_from_u64(1)).unwrap(),
                |s| s.set_weight_at(n / 2, black_box(500)).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_sampler_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler_sample");
    const DRAWS_PER_ITER: usize = 1024;

    for &n in &[2usize, 8, 64, 256, 1024] {
        let mut weighted =
            WeightedSampler::from_pairs_with_rng(gen_pairs(n), Pcg32::seed_from_u64(999)).unwrap();
        let mut uniform = WeightedSampler::from_pairs_with_rng(
            (0..n).map(|i| (i, 5)),
            Pcg32::seed_from_u64(1001),
        )
        .unwrap();
        group.throughput(Throughput::Elements(DRAWS_PER_ITER as u64));

        group.bench_function(format!("weighted_n={n}"), |b| {
            b.iter(|| {
                let mut s = 0usize;
                for _ in 0..DRAWS_PER_ITER {
                    s ^= weighted.sample().copied().unwrap_or_default();
                }
                black_box(s)
            });
        });

        group.bench_function(format!("uniform_n={n}"), |b| {
            b.iter(|| {
                let mut s = 0usize;
                for _ in 0..DRAWS_PER_ITER {
                    s ^= uniform.sample().copied().unwrap_or_default();
                }
                black_box(s)
            });
        });
    }
    group.finish();
}

criterion_group!(sampler, bench_sampler_build, bench_sampler_sample);
criterion_main!(sampler);
