use std::{collections::HashSet, time::Duration};

use cgmath::{Deg, Point3};
use voxel_globe::{
    config::EngineConfig,
    engine_state::{
        meshing::MeshingStrategy,
        streaming::StreamingStats,
        voxels::{block::block_type::BlockType, generation::ChunkGenerationMethod},
        EngineState,
    },
};

const TIMEOUT: Duration = Duration::from_secs(30);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(method: ChunkGenerationMethod, render_distance: i32, vertical: i32) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.world.generation_method = method;
    config.streaming.render_distance = render_distance;
    config.streaming.vertical_render_distance = vertical;
    config.streaming.unload_margin = 0;
    config.meshing.strategy = MeshingStrategy::Culled;
    config.meshing.max_meshed_chunks = 256;
    config.tasks.num_workers = 2;
    config
}

fn centre_of_chunk(x: i32, y: i32, z: i32) -> Point3<f32> {
    Point3::new(x as f32 * 16.0 + 8.0, y as f32 * 16.0 + 8.0, z as f32 * 16.0 + 8.0)
}

#[test]
fn chunks_around_player_are_loaded_and_meshed() {
    init_logger();
    let mut engine = EngineState::new(config(ChunkGenerationMethod::Checkerboard, 2, 1)).unwrap();

    engine.frame(centre_of_chunk(0, 0, 0), Deg(0.0), Deg(0.0));
    assert!(engine.wait_until_idle(TIMEOUT));

    // 13 columns within radius 2, three layers each.
    assert_eq!(engine.world().get().len(), 39);
    assert_eq!(engine.mesh_stats().cached_meshes, 39);
    assert!(engine.get_mesh(Point3::new(0, 0, 0)).is_some());
    assert!(engine.get_mesh(Point3::new(2, 0, 2)).is_none());
}

#[test]
fn visible_chunks_are_sorted_front_to_back() {
    init_logger();
    let mut engine = EngineState::new(config(ChunkGenerationMethod::Checkerboard, 2, 1)).unwrap();

    engine.frame(centre_of_chunk(0, 0, 0), Deg(0.0), Deg(0.0));
    assert!(engine.wait_until_idle(TIMEOUT));
    let stats = engine.frame(centre_of_chunk(0, 0, 0), Deg(0.0), Deg(0.0));

    let visible = engine.visible_chunks();
    assert_eq!(stats.visible_chunks, visible.len());
    assert!(!visible.is_empty());
    assert_eq!(visible[0].position, Point3::new(0, 0, 0));
    assert!(visible
        .windows(2)
        .all(|pair| pair[0].distance_squared <= pair[1].distance_squared));
    // Looking along +X: nothing behind the camera's chunk survives the frustum.
    assert!(visible.iter().all(|chunk| chunk.position.x >= 0));
    assert!(visible.iter().all(|chunk| !chunk.sides.is_empty()));
}

#[test]
fn set_block_remeshes_the_owning_chunk() {
    init_logger();
    let mut engine = EngineState::new(config(ChunkGenerationMethod::Checkerboard, 2, 1)).unwrap();
    engine.frame(centre_of_chunk(0, 0, 0), Deg(0.0), Deg(0.0));
    assert!(engine.wait_until_idle(TIMEOUT));

    let origin = Point3::new(0, 0, 0);
    let faces_before = engine.get_mesh(origin).unwrap().face_count();
    assert_eq!(faces_before, 2048 * 6);

    let affected = engine.set_block(origin, BlockType::AIR).unwrap();
    assert_eq!(affected[0], origin);
    let affected: HashSet<_> = affected.into_iter().collect();
    let expected: HashSet<_> = [
        origin,
        Point3::new(-1, 0, 0),
        Point3::new(0, -1, 0),
        Point3::new(0, 0, -1),
    ]
    .into_iter()
    .collect();
    assert_eq!(affected, expected);

    assert!(engine.wait_until_idle(TIMEOUT));
    assert!(engine.get_block(origin).unwrap().is_air());
    assert_eq!(engine.get_mesh(origin).unwrap().face_count(), faces_before - 6);
}

#[test]
fn moving_away_unloads_old_chunks() {
    init_logger();
    let mut engine = EngineState::new(config(ChunkGenerationMethod::Solid, 1, 0)).unwrap();

    engine.frame(centre_of_chunk(0, 0, 0), Deg(0.0), Deg(0.0));
    assert!(engine.wait_until_idle(TIMEOUT));
    assert_eq!(engine.world().get().len(), 5);

    let stats = engine.frame(centre_of_chunk(10, 0, 0), Deg(0.0), Deg(0.0));
    assert_eq!(stats.player_chunk, Point3::new(10, 0, 0));
    assert_eq!(stats.chunks_unloaded, 5);
    assert!(engine.wait_until_idle(TIMEOUT));

    let loaded = engine.world().get().loaded_positions();
    assert_eq!(loaded.len(), 5);
    assert!(loaded.iter().all(|position| (position.x - 10).abs() <= 1));
    assert!(engine.get_mesh(Point3::new(0, 0, 0)).is_none());
    assert_eq!(engine.mesh_stats().cached_meshes, 5);
}

#[test]
fn terrain_is_deterministic_for_a_seed() {
    init_logger();
    let mut worlds = Vec::new();
    for _ in 0..2 {
        let mut config = config(ChunkGenerationMethod::Terrain, 1, 1);
        config.world.seed = 42;
        let mut engine = EngineState::new(config).unwrap();
        engine.frame(centre_of_chunk(0, 0, 0), Deg(0.0), Deg(0.0));
        assert!(engine.wait_until_idle(TIMEOUT));
        worlds.push(engine);
    }

    for x in -16..32 {
        for y in [-10, 0, 5, 12, 20] {
            let position = Point3::new(x, y, 3);
            assert_eq!(
                worlds[0].get_block(position),
                worlds[1].get_block(position)
            );
        }
    }
}

#[test]
fn enclosed_chunk_has_no_geometry_and_is_not_drawn() {
    init_logger();
    let mut config = config(ChunkGenerationMethod::Solid, 1, 1);
    config.visibility.frustum_culling = false;
    let mut engine = EngineState::new(config).unwrap();

    engine.frame(centre_of_chunk(0, 0, 0), Deg(0.0), Deg(0.0));
    assert!(engine.wait_until_idle(TIMEOUT));

    let origin = Point3::new(0, 0, 0);
    assert!(engine.get_mesh(origin).unwrap().is_empty());
    let visible = engine.visible_chunks();
    assert!(!visible.is_empty());
    assert!(visible.iter().all(|chunk| chunk.position != origin));
}

#[test]
fn streaming_at_the_edge_of_the_world_goes_idle() {
    init_logger();
    let mut config = config(ChunkGenerationMethod::Terrain, 1, 0);
    config.tasks.num_workers = 1;
    let mut engine = EngineState::new(config).unwrap();

    let stats = engine.frame(Point3::new(3.0e9, 8.0, 8.0), Deg(0.0), Deg(0.0));
    assert_eq!(stats.player_chunk, Point3::new(i32::MAX / 16, 0, 0));
    assert!(engine.wait_until_idle(TIMEOUT));

    // The column past the edge is never requested.
    assert_eq!(engine.world().get().len(), 4);
    assert_eq!(engine.streaming_stats(), StreamingStats::default());
}
