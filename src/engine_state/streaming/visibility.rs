//! Per-frame selection of the chunks and sides a renderer should draw.

use std::sync::Arc;

use cgmath::Point3;

use crate::{
    config::EngineConfig,
    engine_state::{
        camera_state::{
            camera::Camera,
            chunk_containing,
            frustum::{chunk_bounds, Frustum},
        },
        meshing::Mesh,
        voxels::block::block_side::BlockSide,
    },
};

/// A chunk that passed culling, with the mesh sides worth drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleChunk {
    pub position: Point3<i32>,
    /// Squared distance in chunks from the camera's chunk
    pub distance_squared: i64,
    pub sides: Vec<BlockSide>,
}

/// Sides of the chunk at `chunk_position` that the camera can see the front
/// of. A −X face can only be seen from a smaller x than the face itself, so
/// FRONT needs the camera below the chunk's max x, and so on per axis.
pub fn sides_facing_camera(chunk_position: Point3<i32>, camera_position: Point3<f32>) -> Vec<BlockSide> {
    let (min, max) = chunk_bounds(chunk_position);
    let mut sides = Vec::with_capacity(6);

    if camera_position.x < max.x {
        sides.push(BlockSide::FRONT);
    }
    if camera_position.x > min.x {
        sides.push(BlockSide::BACK);
    }
    if camera_position.y < max.y {
        sides.push(BlockSide::BOTTOM);
    }
    if camera_position.y > min.y {
        sides.push(BlockSide::TOP);
    }
    if camera_position.z < max.z {
        sides.push(BlockSide::LEFT);
    }
    if camera_position.z > min.z {
        sides.push(BlockSide::RIGHT);
    }

    sides
}

/// Culls meshed chunks by distance, frustum and facing, front to back.
///
/// # Arguments
/// * `candidates` - Meshed chunks and their meshes
/// * `camera` - Camera whose position and view direction are used
/// * `frustum` - Frustum of the camera, used when frustum culling is enabled
/// * `config` - Render distances and visibility switches
pub fn compute_visible_chunks(
    candidates: &[(Point3<i32>, Arc<Mesh>)],
    camera: &Camera,
    frustum: &Frustum,
    config: &EngineConfig,
) -> Vec<VisibleChunk> {
    let camera_chunk = chunk_containing(camera.position);
    let radius = i64::from(config.streaming.render_distance);
    let vertical = i64::from(config.streaming.vertical_render_distance);
    let view_sides = config
        .visibility
        .view_direction_side_culling
        .then(|| BlockSide::get_visible_sides(camera.get_view_vec()));

    let mut visible: Vec<VisibleChunk> = candidates
        .iter()
        .filter_map(|(position, mesh)| {
            let dx = i64::from(position.x) - i64::from(camera_chunk.x);
            let dy = i64::from(position.y) - i64::from(camera_chunk.y);
            let dz = i64::from(position.z) - i64::from(camera_chunk.z);
            if dx.abs() > radius
                || dz.abs() > radius
                || dy.abs() > vertical
                || dx * dx + dz * dz > radius * radius
            {
                return None;
            }

            if config.visibility.frustum_culling && !frustum.contains_chunk(*position) {
                return None;
            }

            let sides: Vec<BlockSide> = sides_facing_camera(*position, camera.position)
                .into_iter()
                .filter(|side| view_sides.as_ref().map_or(true, |view| view.contains(side)))
                .filter(|side| !mesh.side(*side).is_empty())
                .collect();
            if sides.is_empty() {
                return None;
            }

            Some(VisibleChunk {
                position: *position,
                distance_squared: dx * dx + dy * dy + dz * dz,
                sides,
            })
        })
        .collect();

    visible.sort_by_key(|chunk| {
        (
            chunk.distance_squared,
            chunk.position.x,
            chunk.position.y,
            chunk.position.z,
        )
    });
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        camera_state::camera::Projection,
        meshing::{MeshManager, MeshingStrategy},
        voxels::{block::block_type::BlockType, chunk::Chunk},
    };
    use cgmath::Deg;

    fn solid_mesh(position: Point3<i32>) -> Arc<Mesh> {
        let chunk = Chunk::solid(&position, BlockType::STONE);
        Arc::new(MeshManager::build_mesh(
            MeshingStrategy::Greedy,
            &chunk,
            0,
            &BlockSide::all(),
        ))
    }

    fn setup(frustum_culling: bool, side_culling: bool) -> (Camera, Frustum, EngineConfig) {
        let camera = Camera::new(Point3::new(8.0, 8.0, 8.0), Deg(0.0), Deg(0.0));
        let projection = Projection::new(1, 1, Deg(90.0), 0.1, 500.0);
        let frustum = Frustum::from_matrix(projection.calc_matrix() * camera.calc_matrix());
        let mut config = EngineConfig::default();
        config.streaming.render_distance = 3;
        config.streaming.vertical_render_distance = 1;
        config.visibility.frustum_culling = frustum_culling;
        config.visibility.view_direction_side_culling = side_culling;
        (camera, frustum, config)
    }

    #[test]
    fn camera_inside_chunk_sees_every_side() {
        let sides = sides_facing_camera(Point3::new(0, 0, 0), Point3::new(8.0, 8.0, 8.0));
        assert_eq!(sides.len(), 6);
    }

    #[test]
    fn far_side_of_a_chunk_is_hidden() {
        let sides = sides_facing_camera(Point3::new(2, 0, 0), Point3::new(8.0, 8.0, 8.0));
        assert!(sides.contains(&BlockSide::FRONT));
        assert!(!sides.contains(&BlockSide::BACK));
        assert_eq!(sides.len(), 5);
    }

    #[test]
    fn distance_and_frustum_cull_chunks() {
        let (camera, frustum, config) = setup(true, false);
        let candidates: Vec<(Point3<i32>, Arc<Mesh>)> = [
            Point3::new(2, 0, 0),
            Point3::new(-2, 0, 0),
            Point3::new(5, 0, 0),
            Point3::new(1, 3, 0),
            Point3::new(0, 0, 0),
        ]
        .into_iter()
        .map(|position| (position, solid_mesh(position)))
        .collect();

        let visible = compute_visible_chunks(&candidates, &camera, &frustum, &config);
        let positions: Vec<Point3<i32>> = visible.iter().map(|chunk| chunk.position).collect();
        assert_eq!(positions, vec![Point3::new(0, 0, 0), Point3::new(2, 0, 0)]);
        assert_eq!(visible[1].distance_squared, 4);
    }

    #[test]
    fn disabled_frustum_culling_keeps_chunks_behind() {
        let (camera, frustum, config) = setup(false, false);
        let position = Point3::new(-2, 0, 0);
        let visible =
            compute_visible_chunks(&[(position, solid_mesh(position))], &camera, &frustum, &config);
        assert_eq!(visible.len(), 1);
        assert!(!visible[0].sides.contains(&BlockSide::FRONT));
    }

    #[test]
    fn view_direction_removes_back_facing_sides() {
        let (camera, frustum, config) = setup(false, true);
        let position = Point3::new(0, 0, 0);
        let visible =
            compute_visible_chunks(&[(position, solid_mesh(position))], &camera, &frustum, &config);
        assert_eq!(visible[0].sides.len(), 5);
        assert!(!visible[0].sides.contains(&BlockSide::BACK));
    }

    #[test]
    fn empty_meshes_are_never_visible() {
        let (camera, frustum, config) = setup(true, false);
        let position = Point3::new(1, 0, 0);
        let candidates = [(position, Arc::new(Mesh::new()))];
        assert!(compute_visible_chunks(&candidates, &camera, &frustum, &config).is_empty());
    }

    #[test]
    fn chunks_at_the_edge_of_the_block_grid() {
        use crate::engine_state::voxels::chunk::{MAX_CHUNK_COORDINATE, MIN_CHUNK_COORDINATE};

        let (_, frustum, config) = setup(false, false);
        let camera = Camera::new(Point3::new(3.0e9, 8.0, 8.0), Deg(0.0), Deg(0.0));
        let near = Point3::new(MAX_CHUNK_COORDINATE, 0, 0);
        let far = Point3::new(MIN_CHUNK_COORDINATE, 0, i32::MIN);
        let candidates = [(near, solid_mesh(near)), (far, solid_mesh(far))];

        let visible = compute_visible_chunks(&candidates, &camera, &frustum, &config);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].position, near);
        assert_eq!(visible[0].distance_squared, 0);
    }
}
