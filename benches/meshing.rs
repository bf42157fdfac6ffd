use cgmath::Point3;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use voxel_globe::{
    config::TerrainConfig,
    engine_state::{
        meshing::Mesh,
        voxels::{
            block::block_side::BlockSide,
            chunk::Chunk,
            generation::{ChunkGenerationMethod, TerrainGenerator},
        },
    },
};

fn sample_chunks() -> Vec<(&'static str, Chunk)> {
    let position = Point3::new(0, 0, 0);
    let terrain = TerrainGenerator::new(7, ChunkGenerationMethod::Terrain, TerrainConfig::default());
    let perlin = TerrainGenerator::new(7, ChunkGenerationMethod::Perlin, TerrainConfig::default());

    vec![
        ("terrain", terrain.generate(position)),
        ("perlin", perlin.generate(position)),
        ("checkerboard", Chunk::checkerboard(&position)),
    ]
}

fn benchmark_culling_mesher(c: &mut Criterion) {
    let sides = BlockSide::all();
    for (name, chunk) in sample_chunks() {
        c.bench_function(&format!("culling_mesher/{}", name), |b| {
            b.iter(|| Mesh::culled_sided(black_box(&chunk), 0, &sides))
        });
    }
}

fn benchmark_greedy_mesher(c: &mut Criterion) {
    let sides = BlockSide::all();
    for (name, chunk) in sample_chunks() {
        c.bench_function(&format!("greedy_mesher/{}", name), |b| {
            b.iter(|| Mesh::greedy_sided(black_box(&chunk), 0, &sides))
        });
    }
}

criterion_group!(benches, benchmark_culling_mesher, benchmark_greedy_mesher);
criterion_main!(benches);
