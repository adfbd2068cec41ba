use criterion::{Criterion, black_box, criterion_group, criterion_main};
use verdant_config::default_biomes;
use verdant_terrain::*;

fn sampler() -> HeightBiomeSampler {
    let table = BiomeTable::from_settings(&default_biomes()).expect("default biomes");
    HeightBiomeSampler::new(table, SamplerParams::default())
}

fn bench_noise_sample(c: &mut Criterion) {
    let field = NoiseField::default();
    c.bench_function("noise_sample", |bencher| {
        bencher.iter(|| black_box(field.sample(black_box(123.4), black_box(-56.7), 60.0, SEED_BIAS)))
    });
}

fn bench_surface_sample(c: &mut Criterion) {
    let sampler = sampler();
    c.bench_function("surface_sample", |bencher| {
        bencher.iter(|| black_box(sampler.sample(black_box(123.4), black_box(-56.7))))
    });
}

fn bench_chunk_samples(c: &mut Criterion) {
    let sampler = sampler();
    let footprint = ChunkFootprint {
        resolution: 65,
        spacing: 1.0,
    };
    let coord = ChunkCoord::new(3, -4);
    c.bench_function("chunk_samples_65x65", |bencher| {
        bencher.iter(|| {
            let mut acc = 0.0;
            for j in 0..footprint.resolution {
                for i in 0..footprint.resolution {
                    let (x, z) = footprint.vertex_world(coord, i, j);
                    acc += sampler.sample(x, z).height;
                }
            }
            black_box(acc)
        })
    });
}

fn bench_scatter(c: &mut Criterion) {
    let sampler = sampler();
    let scatter = VegetationScatter::new(
        12345,
        ChunkFootprint {
            resolution: 65,
            spacing: 1.0,
        },
    );
    let mut out = Vec::new();
    c.bench_function("vegetation_scatter_65x65", |bencher| {
        bencher.iter(|| {
            out.clear();
            scatter.scatter(&sampler, black_box(ChunkCoord::new(1, 1)), &mut out);
            black_box(out.len())
        })
    });
}

criterion_group!(
    benches,
    bench_noise_sample,
    bench_surface_sample,
    bench_chunk_samples,
    bench_scatter,
);
criterion_main!(benches);
