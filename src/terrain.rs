// Terrain queries against the loaded scene geometry. The collider is a plain
// triangle soup with a per-mesh AABB pre-check; fine for viewer-scale scenes
// and the dominant cost center if unit counts ever grow.
use bevy::prelude::*;

use crate::constants::*;
use crate::math_utils::{ray_aabb_intersection, ray_triangle_intersection};

/// Ground and line-of-sight queries the movement engine depends on. A trait
/// seam so a spatial index (or a test mock) can replace the brute-force soup
/// without touching the simulation.
pub trait TerrainQuery {
    /// Terrain surface height at `position` plus unit clearance. Probes
    /// downward from `GROUND_PROBE_HEIGHT` above the query point; returns the
    /// bare clearance offset when nothing is below.
    fn ground_height(&self, position: Vec3) -> f32;

    /// Whether any scene triangle lies along the ray within `max_distance`.
    fn ray_blocked(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> bool;

    /// Where a ray (typically from a screen click) meets the scene, with unit
    /// clearance applied. Falls back to the y=0 plane for rays that miss the
    /// geometry, and to a fixed origin point for rays that miss everything.
    fn ground_point_from_ray(&self, origin: Vec3, direction: Vec3) -> Vec3;
}

/// World-space triangles of one scene mesh. Transforms are applied once at
/// build time; the scene is static so queries never re-transform.
pub struct MeshCollider {
    pub aabb_min: Vec3,
    pub aabb_max: Vec3,
    pub triangles: Vec<[Vec3; 3]>,
}

impl MeshCollider {
    pub fn from_triangles(triangles: Vec<[Vec3; 3]>) -> Self {
        let mut aabb_min = Vec3::splat(f32::INFINITY);
        let mut aabb_max = Vec3::splat(f32::NEG_INFINITY);
        for tri in &triangles {
            for v in tri {
                aabb_min = aabb_min.min(*v);
                aabb_max = aabb_max.max(*v);
            }
        }
        Self {
            aabb_min,
            aabb_max,
            triangles,
        }
    }
}

/// Collision geometry for the whole loaded scene.
#[derive(Resource, Default)]
pub struct SceneCollider {
    pub meshes: Vec<MeshCollider>,
    pub triangle_count: usize,
    pub vertex_count: usize,
}

impl SceneCollider {
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn push_mesh(&mut self, collider: MeshCollider, vertices: usize) {
        self.triangle_count += collider.triangles.len();
        self.vertex_count += vertices;
        self.meshes.push(collider);
    }

    /// Nearest triangle hit along the ray, over every mesh that the ray's
    /// AABB test does not reject.
    fn closest_hit(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        let mut best: Option<(f32, Vec3)> = None;
        for mesh in &self.meshes {
            if ray_aabb_intersection(origin, direction, mesh.aabb_min, mesh.aabb_max).is_none() {
                continue;
            }
            for tri in &mesh.triangles {
                if let Some((t, point)) =
                    ray_triangle_intersection(origin, direction, tri[0], tri[1], tri[2])
                {
                    if best.is_none_or(|(best_t, _)| t < best_t) {
                        best = Some((t, point));
                    }
                }
            }
        }
        best
    }
}

impl TerrainQuery for SceneCollider {
    fn ground_height(&self, position: Vec3) -> f32 {
        let origin = position + Vec3::Y * GROUND_PROBE_HEIGHT;
        match self.closest_hit(origin, Vec3::NEG_Y) {
            Some((_, hit)) => hit.y + UNIT_HEIGHT_OFFSET,
            None => UNIT_HEIGHT_OFFSET,
        }
    }

    fn ray_blocked(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> bool {
        for mesh in &self.meshes {
            match ray_aabb_intersection(origin, direction, mesh.aabb_min, mesh.aabb_max) {
                Some(t) if t <= max_distance => {}
                _ => continue,
            }
            for tri in &mesh.triangles {
                if let Some((t, _)) =
                    ray_triangle_intersection(origin, direction, tri[0], tri[1], tri[2])
                {
                    if t <= max_distance {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn ground_point_from_ray(&self, origin: Vec3, direction: Vec3) -> Vec3 {
        if let Some((_, hit)) = self.closest_hit(origin, direction) {
            return Vec3::new(hit.x, hit.y + UNIT_HEIGHT_OFFSET, hit.z);
        }

        // No geometry along the ray: intersect the ground plane instead
        if direction.y.abs() > 1e-4 {
            let t = -origin.y / direction.y;
            if t > 0.0 {
                let point = origin + direction * t;
                return Vec3::new(point.x, UNIT_HEIGHT_OFFSET, point.z);
            }
        }

        Vec3::new(0.0, UNIT_HEIGHT_OFFSET, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles forming a square platform at the given height.
    fn platform(height: f32, half_extent: f32) -> MeshCollider {
        let e = half_extent;
        MeshCollider::from_triangles(vec![
            [
                Vec3::new(-e, height, -e),
                Vec3::new(e, height, -e),
                Vec3::new(e, height, e),
            ],
            [
                Vec3::new(-e, height, -e),
                Vec3::new(e, height, e),
                Vec3::new(-e, height, e),
            ],
        ])
    }

    /// A vertical wall square in the plane x = `x`, spanning y,z in [-e, e].
    fn wall_at_x(x: f32, e: f32) -> MeshCollider {
        MeshCollider::from_triangles(vec![
            [
                Vec3::new(x, -e, -e),
                Vec3::new(x, e, -e),
                Vec3::new(x, e, e),
            ],
            [
                Vec3::new(x, -e, -e),
                Vec3::new(x, e, e),
                Vec3::new(x, -e, e),
            ],
        ])
    }

    fn collider_with(meshes: Vec<MeshCollider>) -> SceneCollider {
        let mut collider = SceneCollider::default();
        for mesh in meshes {
            collider.push_mesh(mesh, 0);
        }
        collider
    }

    #[test]
    fn ground_height_on_platform() {
        let collider = collider_with(vec![platform(2.0, 5.0)]);
        let h = collider.ground_height(Vec3::new(1.0, 2.5, 1.0));
        assert!((h - (2.0 + UNIT_HEIGHT_OFFSET)).abs() < 1e-5);
    }

    #[test]
    fn ground_height_off_platform_uses_default() {
        let collider = collider_with(vec![platform(2.0, 5.0)]);
        let h = collider.ground_height(Vec3::new(20.0, 0.0, 0.0));
        assert!((h - UNIT_HEIGHT_OFFSET).abs() < 1e-6);
    }

    #[test]
    fn ground_height_picks_nearest_surface_below_probe() {
        // Lower platform at 0, upper at 3; probe from unit standing at y=3.5
        // starts above both and must land on the upper one.
        let collider = collider_with(vec![platform(0.0, 5.0), platform(3.0, 5.0)]);
        let h = collider.ground_height(Vec3::new(0.0, 3.5, 0.0));
        assert!((h - (3.0 + UNIT_HEIGHT_OFFSET)).abs() < 1e-5);
    }

    #[test]
    fn ray_blocked_respects_max_distance() {
        let collider = collider_with(vec![wall_at_x(2.0, 4.0)]);
        let origin = Vec3::ZERO;
        assert!(!collider.ray_blocked(origin, Vec3::X, 1.5));
        assert!(collider.ray_blocked(origin, Vec3::X, 3.0));
    }

    #[test]
    fn ray_blocked_ignores_opposite_direction() {
        let collider = collider_with(vec![wall_at_x(2.0, 4.0)]);
        assert!(!collider.ray_blocked(Vec3::ZERO, Vec3::NEG_X, 10.0));
    }

    #[test]
    fn ground_point_from_ray_hits_geometry() {
        let collider = collider_with(vec![platform(2.0, 5.0)]);
        let point =
            collider.ground_point_from_ray(Vec3::new(1.0, 10.0, 1.0), Vec3::NEG_Y);
        assert!(point.abs_diff_eq(
            Vec3::new(1.0, 2.0 + UNIT_HEIGHT_OFFSET, 1.0),
            1e-4
        ));
    }

    #[test]
    fn ground_point_from_ray_falls_back_to_plane() {
        let collider = SceneCollider::default();
        let origin = Vec3::new(0.0, 10.0, 0.0);
        let direction = Vec3::new(1.0, -1.0, 0.0).normalize();
        let point = collider.ground_point_from_ray(origin, direction);
        assert!(point.abs_diff_eq(Vec3::new(10.0, UNIT_HEIGHT_OFFSET, 0.0), 1e-4));
    }

    #[test]
    fn ground_point_from_horizontal_ray_uses_default() {
        let collider = SceneCollider::default();
        let point = collider.ground_point_from_ray(Vec3::new(0.0, 5.0, 0.0), Vec3::X);
        assert!(point.abs_diff_eq(Vec3::new(0.0, UNIT_HEIGHT_OFFSET, 0.0), 1e-6));
    }

    #[test]
    fn mesh_collider_aabb_covers_triangles() {
        let mesh = platform(2.0, 5.0);
        assert!(mesh.aabb_min.abs_diff_eq(Vec3::new(-5.0, 2.0, -5.0), 1e-6));
        assert!(mesh.aabb_max.abs_diff_eq(Vec3::new(5.0, 2.0, 5.0), 1e-6));
    }

    #[test]
    fn collider_counts_accumulate() {
        let mut collider = SceneCollider::default();
        collider.push_mesh(platform(0.0, 1.0), 4);
        collider.push_mesh(wall_at_x(1.0, 1.0), 4);
        assert_eq!(collider.triangle_count, 4);
        assert_eq!(collider.vertex_count, 8);
    }
}
