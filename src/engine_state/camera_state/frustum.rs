//! View frustum planes for chunk culling.

use cgmath::{InnerSpace, Matrix, Matrix4, Point3, Vector3, Vector4};

use crate::engine_state::voxels::chunk::CHUNK_DIMENSION;

/// A plane `normal · p + distance = 0`; points with a positive value are inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub distance: f32,
}

impl Plane {
    fn from_row(row: Vector4<f32>) -> Self {
        let normal = Vector3::new(row.x, row.y, row.z);
        let magnitude = normal.magnitude();
        if magnitude <= f32::EPSILON {
            return Plane {
                normal,
                distance: row.w,
            };
        }
        Plane {
            normal: normal / magnitude,
            distance: row.w / magnitude,
        }
    }

    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.x * point.x + self.normal.y * point.y + self.normal.z * point.z + self.distance
    }
}

/// The six clipping planes of a view-projection matrix, in the order left,
/// right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the planes from an OpenGL-style view-projection matrix.
    pub fn from_matrix(view_proj: Matrix4<f32>) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        Frustum {
            planes: [
                Plane::from_row(r3 + r0),
                Plane::from_row(r3 - r0),
                Plane::from_row(r3 + r1),
                Plane::from_row(r3 - r1),
                Plane::from_row(r3 + r2),
                Plane::from_row(r3 - r2),
            ],
        }
    }

    /// Whether the box may intersect the frustum.
    ///
    /// A box is rejected only when its corner furthest along some plane's
    /// normal is still behind that plane, so boxes straddling a frustum corner
    /// can be reported as visible.
    pub fn contains_aabb(&self, min: Point3<f32>, max: Point3<f32>) -> bool {
        self.planes.iter().all(|plane| {
            let p_vertex = Point3::new(
                if plane.normal.x >= 0.0 { max.x } else { min.x },
                if plane.normal.y >= 0.0 { max.y } else { min.y },
                if plane.normal.z >= 0.0 { max.z } else { min.z },
            );
            plane.signed_distance(p_vertex) >= 0.0
        })
    }

    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(point) >= 0.0)
    }

    /// Tests the world-space box of the chunk at `chunk_position`.
    pub fn contains_chunk(&self, chunk_position: Point3<i32>) -> bool {
        let (min, max) = chunk_bounds(chunk_position);
        self.contains_aabb(min, max)
    }
}

/// World-space bounds of a chunk.
pub fn chunk_bounds(chunk_position: Point3<i32>) -> (Point3<f32>, Point3<f32>) {
    let size = CHUNK_DIMENSION as f32;
    let min = Point3::new(
        chunk_position.x as f32 * size,
        chunk_position.y as f32 * size,
        chunk_position.z as f32 * size,
    );
    (min, Point3::new(min.x + size, min.y + size, min.z + size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::camera_state::camera::{Camera, Projection};
    use cgmath::Deg;

    fn frustum_looking_along_x() -> Frustum {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        let projection = Projection::new(1, 1, Deg(90.0), 0.1, 200.0);
        Frustum::from_matrix(projection.calc_matrix() * camera.calc_matrix())
    }

    #[test]
    fn planes_are_normalized() {
        let frustum = frustum_looking_along_x();
        for plane in frustum.planes.iter() {
            assert!((plane.normal.magnitude() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn points_ahead_are_inside() {
        let frustum = frustum_looking_along_x();
        assert!(frustum.contains_point(Point3::new(10.0, 0.0, 0.0)));
        assert!(!frustum.contains_point(Point3::new(-10.0, 0.0, 0.0)));
        assert!(!frustum.contains_point(Point3::new(300.0, 0.0, 0.0)));
        // 90 degree fov: y = x is the edge.
        assert!(!frustum.contains_point(Point3::new(10.0, 20.0, 0.0)));
    }

    #[test]
    fn chunks_behind_camera_are_culled() {
        let frustum = frustum_looking_along_x();
        assert!(frustum.contains_chunk(Point3::new(2, 0, 0)));
        assert!(!frustum.contains_chunk(Point3::new(-3, 0, 0)));
        assert!(!frustum.contains_chunk(Point3::new(2, 0, 40)));
    }

    #[test]
    fn chunk_containing_camera_is_visible() {
        let frustum = frustum_looking_along_x();
        assert!(frustum.contains_chunk(Point3::new(0, 0, 0)));
        assert!(frustum.contains_chunk(Point3::new(0, -1, -1)));
    }

    #[test]
    fn straddling_box_is_kept() {
        let frustum = frustum_looking_along_x();
        assert!(frustum.contains_aabb(Point3::new(5.0, -100.0, -1.0), Point3::new(6.0, 100.0, 1.0)));
    }
}
