use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

/// Ray-triangle intersection test (Moller-Trumbore)
/// Returns Some((distance, hit_point)) if the ray intersects the triangle, None otherwise
pub fn ray_triangle_intersection(
    ray_origin: Vec3,
    ray_direction: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<(f32, Vec3)> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let p = ray_direction.cross(edge2);
    let det = edge1.dot(p);

    // Ray parallel to triangle plane
    if det.abs() < 1e-7 {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray_origin - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray_direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    if t > 1e-6 {
        Some((t, ray_origin + ray_direction * t))
    } else {
        None
    }
}

/// Ray-AABB intersection test (slab method)
/// Returns the entry distance along the ray (0.0 when the origin is inside the box)
pub fn ray_aabb_intersection(
    ray_origin: Vec3,
    ray_direction: Vec3,
    box_min: Vec3,
    box_max: Vec3,
) -> Option<f32> {
    let mut t_min = 0.0f32;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray_origin[axis];
        let dir = ray_direction[axis];

        if dir.abs() < 1e-8 {
            // Ray parallel to this slab, reject unless origin lies within it
            if origin < box_min[axis] || origin > box_max[axis] {
                return None;
            }
        } else {
            let inv = 1.0 / dir;
            let mut t0 = (box_min[axis] - origin) * inv;
            let mut t1 = (box_max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
    }

    Some(t_min)
}

/// Wrap an angle into (-PI, PI] so rotation deltas take the shorter path
pub fn wrap_angle(mut angle: f32) -> f32 {
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    const V0: Vec3 = Vec3::new(-1.0, 0.0, -1.0);
    const V1: Vec3 = Vec3::new(1.0, 0.0, -1.0);
    const V2: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    #[test]
    fn ray_hits_triangle_from_above() {
        let hit = ray_triangle_intersection(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, V0, V1, V2);
        let (t, point) = hit.expect("ray should hit");
        assert!((t - 5.0).abs() < 1e-5);
        assert!(point.abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn ray_misses_outside_triangle() {
        let hit = ray_triangle_intersection(Vec3::new(3.0, 5.0, 3.0), Vec3::NEG_Y, V0, V1, V2);
        assert!(hit.is_none());
    }

    #[test]
    fn ray_ignores_triangle_behind_origin() {
        let hit = ray_triangle_intersection(Vec3::new(0.0, -5.0, 0.0), Vec3::NEG_Y, V0, V1, V2);
        assert!(hit.is_none());
    }

    #[test]
    fn ray_parallel_to_triangle_misses() {
        let hit = ray_triangle_intersection(Vec3::new(0.0, 1.0, 0.0), Vec3::X, V0, V1, V2);
        assert!(hit.is_none());
    }

    #[test]
    fn aabb_entry_distance() {
        let t = ray_aabb_intersection(
            Vec3::new(-5.0, 0.5, 0.5),
            Vec3::X,
            Vec3::ZERO,
            Vec3::ONE,
        );
        assert!((t.expect("should hit") - 5.0).abs() < 1e-5);
    }

    #[test]
    fn aabb_origin_inside_returns_zero() {
        let t = ray_aabb_intersection(Vec3::splat(0.5), Vec3::X, Vec3::ZERO, Vec3::ONE);
        assert_eq!(t, Some(0.0));
    }

    #[test]
    fn aabb_miss() {
        let t = ray_aabb_intersection(Vec3::new(-5.0, 2.0, 0.5), Vec3::X, Vec3::ZERO, Vec3::ONE);
        assert!(t.is_none());
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-6);
        assert!((wrap_angle(-3.0 * PI) - PI).abs() < 1e-6);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-6);
    }
}
