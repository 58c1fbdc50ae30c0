// Per-frame unit movement: wander/command state machine, terrain following
// and local avoidance against scene geometry and sibling units.
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::constants::*;
use crate::math_utils::wrap_angle;
use crate::terrain::{SceneCollider, TerrainQuery};
use crate::types::{CommandMarker, DisplayToggles, UnitPool};

/// Advance every active unit by `dt` seconds.
///
/// Units update in slot order and each sees the already-moved positions of
/// lower-indexed siblings. That asymmetry is intentional: it matches the
/// original sequential sweep and keeps pairs of converging units from
/// mirror-deflecting into each other forever.
pub fn update_units<T: TerrainQuery, R: Rng>(
    pool: &mut UnitPool,
    terrain: &T,
    rng: &mut R,
    dt: f32,
) {
    for index in 0..pool.slot_count() {
        let Some(unit) = pool.unit_at(index) else {
            continue;
        };
        if !unit.active {
            continue;
        }
        let mut unit = *unit;

        let goal = if unit.has_command {
            if unit.position.distance(unit.command_target) < UNIT_ARRIVAL_DISTANCE {
                unit.has_command = false;
                unit.move_timer = 0.0;
            }
            unit.command_target
        } else {
            unit.move_timer = (unit.move_timer - dt).max(0.0);
            if unit.move_timer <= 0.0 {
                let heading = rng.gen_range(0.0..TAU);
                let distance = rng.gen_range(WANDER_MIN_DISTANCE..WANDER_MAX_DISTANCE);
                unit.wander_target = unit.position
                    + Vec3::new(heading.cos() * distance, 0.0, heading.sin() * distance);
                unit.move_timer = rng.gen_range(WANDER_TIMER_MIN..WANDER_TIMER_MAX);
            }
            unit.wander_target
        };

        let to_goal = goal - unit.position;
        let distance = to_goal.length();
        if distance > GOAL_EPSILON {
            let direction = to_goal / distance;

            let terrain_blocked =
                terrain.ray_blocked(unit.position, direction, UNIT_AVOIDANCE_DISTANCE);
            let sibling_blocked = (0..pool.slot_count()).any(|other| {
                other != index
                    && pool.unit_at(other).is_some_and(|o| {
                        o.active
                            && o.position.distance(unit.position)
                                < unit.size * SIBLING_BLOCK_FACTOR
                    })
            });

            if terrain_blocked || sibling_blocked {
                let deflection = rng.gen_range(-FRAC_PI_2..FRAC_PI_2);
                let avoid_heading = direction.z.atan2(direction.x) + deflection;
                let avoid_dir = Vec3::new(avoid_heading.cos(), 0.0, avoid_heading.sin());

                if unit.has_command {
                    // Detour at half speed; the command target stays intact so
                    // the unit resumes course once clear.
                    unit.position += avoid_dir * UNIT_SPEED * dt * 0.5;
                } else {
                    unit.wander_target = unit.position + avoid_dir * AVOID_RETARGET_DISTANCE;
                    unit.move_timer = AVOID_RETARGET_TIMER;
                }
            } else {
                unit.position += direction * UNIT_SPEED * dt;
                let target_rotation = direction.z.atan2(direction.x);
                unit.rotation +=
                    wrap_angle(target_rotation - unit.rotation) * UNIT_TURN_SPEED * dt;
            }
        }

        unit.position.y = terrain.ground_height(unit.position);

        if let Some(slot) = pool.unit_at_mut(index) {
            *slot = unit;
        }
    }
}

/// Frame driver: ticks the command marker and, unless the unit display/sim
/// toggle is off, runs the movement sweep against the scene collider.
pub fn update_unit_simulation(
    time: Res<Time>,
    mut pool: ResMut<UnitPool>,
    collider: Res<SceneCollider>,
    mut marker: ResMut<CommandMarker>,
    toggles: Res<DisplayToggles>,
) {
    let dt = time.delta_secs();
    marker.tick(dt);
    if !toggles.units {
        return;
    }
    let mut rng = rand::thread_rng();
    update_units(&mut pool, &*collider, &mut rng, dt);
}
