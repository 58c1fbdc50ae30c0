// Selection and command protocol: box selection in screen space, right-click
// move commands with a grid formation, control-group hotkeys and unit
// population controls.
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use rand::Rng;
use std::f32::consts::TAU;

use crate::camera::{CameraFocusEvent, ViewMode};
use crate::constants::*;
use crate::terrain::{SceneCollider, TerrainQuery};
use crate::types::{CommandMarker, ControlGroups, SceneBounds, UnitId, UnitPool};

/// Screen-space drag state for the isometric box selection.
#[derive(Resource, Default)]
pub struct BoxSelection {
    pub dragging: bool,
    pub start: Vec2,
    pub current: Vec2,
}

const GROUP_KEYS: [(KeyCode, u8); 9] = [
    (KeyCode::Digit1, 1),
    (KeyCode::Digit2, 2),
    (KeyCode::Digit3, 3),
    (KeyCode::Digit4, 4),
    (KeyCode::Digit5, 5),
    (KeyCode::Digit6, 6),
    (KeyCode::Digit7, 7),
    (KeyCode::Digit8, 8),
    (KeyCode::Digit9, 9),
];

/// Replace the current selection with every active unit whose projected
/// screen position falls inside the rectangle spanned by `rect_start` and
/// `rect_end` (any corner order). Units the projection rejects (behind the
/// camera) are never selected.
pub fn select_units_in_box(
    pool: &mut UnitPool,
    rect_start: Vec2,
    rect_end: Vec2,
    project: impl Fn(Vec3) -> Option<Vec2>,
) {
    pool.deselect_all();

    let min = rect_start.min(rect_end);
    let max = rect_start.max(rect_end);

    for index in 0..pool.slot_count() {
        let Some(unit) = pool.unit_at(index) else {
            continue;
        };
        if !unit.active {
            continue;
        }
        if let Some(screen) = project(unit.position) {
            if screen.x >= min.x && screen.x <= max.x && screen.y >= min.y && screen.y <= max.y {
                if let Some(unit) = pool.unit_at_mut(index) {
                    unit.selected = true;
                }
            }
        }
    }
}

/// Issue a move command to the current selection. Units are laid out on a
/// grid around `target` in store order, each slot's height resolved against
/// the terrain; the command marker is re-armed at the raw target. Empty
/// selection is a no-op.
pub fn command_units<T: TerrainQuery>(
    pool: &mut UnitPool,
    marker: &mut CommandMarker,
    terrain: &T,
    target: Vec3,
) {
    let selected: Vec<UnitId> = pool
        .iter_active()
        .filter(|(_, unit)| unit.selected)
        .map(|(id, _)| id)
        .collect();
    if selected.is_empty() {
        return;
    }

    let count = selected.len();
    let cols = ((count as f32).sqrt() as usize).max(1);
    let spacing = UNIT_SIZE * FORMATION_SPACING_FACTOR;
    let rows = count / cols;

    for (slot, &id) in selected.iter().enumerate() {
        let row = slot / cols;
        let col = slot % cols;
        let offset = Vec3::new(
            (col as f32 - cols as f32 / 2.0) * spacing,
            0.0,
            (row as f32 - rows as f32 / 2.0) * spacing,
        );
        let mut destination = target + offset;
        destination.y = terrain.ground_height(destination);

        if let Some(unit) = pool.get_mut(id) {
            unit.command_target = destination;
            unit.has_command = true;
            unit.move_timer = 0.0;
        }
    }

    marker.arm(target);
}

/// Left-drag box selection, isometric mode only. Selection resolves on
/// release; a zero-size drag degenerates to a point pick.
pub fn box_selection_input(
    mouse: Res<ButtonInput<MouseButton>>,
    view_mode: Res<ViewMode>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut selection: ResMut<BoxSelection>,
    mut pool: ResMut<UnitPool>,
) {
    if *view_mode != ViewMode::Isometric {
        selection.dragging = false;
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };

    if mouse.just_pressed(MouseButton::Left) {
        selection.dragging = true;
        selection.start = cursor;
        selection.current = cursor;
    } else if selection.dragging {
        selection.current = cursor;
    }

    if mouse.just_released(MouseButton::Left) && selection.dragging {
        selection.dragging = false;
        let Ok((camera, camera_transform)) = cameras.single() else {
            return;
        };
        select_units_in_box(&mut pool, selection.start, selection.current, |world| {
            camera.world_to_viewport(camera_transform, world).ok()
        });
        info!("Box select: {} unit(s)", pool.selected_count());
    }
}

/// Right-click issues a move command to the clicked ground point, in either
/// camera mode.
pub fn move_command_input(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    collider: Res<SceneCollider>,
    mut pool: ResMut<UnitPool>,
    mut marker: ResMut<CommandMarker>,
) {
    if !mouse.just_pressed(MouseButton::Right) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };

    let selected = pool.selected_count();
    if selected == 0 {
        return;
    }
    let target = collider.ground_point_from_ray(ray.origin, *ray.direction);
    command_units(&mut pool, &mut marker, &*collider, target);
    info!(
        "Move command: {} unit(s) -> ({:.1}, {:.1}, {:.1})",
        selected, target.x, target.y, target.z
    );
}

/// Ctrl+1-9 assigns the selection to a control group; 1-9 reselects it and
/// centers the active camera on the group centroid.
pub fn control_group_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut pool: ResMut<UnitPool>,
    mut groups: ResMut<ControlGroups>,
    mut focus_events: EventWriter<CameraFocusEvent>,
) {
    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);

    for (key, number) in GROUP_KEYS {
        if !keyboard.just_pressed(key) {
            continue;
        }
        if ctrl {
            groups.assign(number, &mut pool);
            info!(
                "Group {} assigned ({} unit(s))",
                number,
                pool.selected_count()
            );
        } else if let Some(centroid) = groups.select(number, &mut pool) {
            focus_events.write(CameraFocusEvent { target: centroid });
            info!(
                "Group {} selected ({} unit(s))",
                number,
                pool.selected_count()
            );
        }
    }
}

/// Space spawns a batch of units around the scene center, C clears all units,
/// Delete removes the current selection.
pub fn unit_population_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    bounds: Res<SceneBounds>,
    mut pool: ResMut<UnitPool>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        let mut rng = rand::thread_rng();
        let radius = bounds.spawn_radius().max(2.0);
        let mut spawned = 0;
        for _ in 0..SPAWN_BATCH_SIZE {
            let angle = rng.gen_range(0.0..TAU);
            let distance = rng.gen_range(1.0..radius);
            let position = Vec3::new(
                bounds.center.x + angle.cos() * distance,
                bounds.center.y + UNIT_HEIGHT_OFFSET,
                bounds.center.z + angle.sin() * distance,
            );
            let rotation = rng.gen_range(0.0..TAU);
            if pool.spawn(position, rotation).is_some() {
                spawned += 1;
            }
        }
        info!("Spawned {} unit(s) ({} active)", spawned, pool.active_count());
    }

    if keyboard.just_pressed(KeyCode::KeyC) {
        pool.clear();
        info!("Cleared all units");
    }

    if keyboard.just_pressed(KeyCode::Delete) {
        let selected: Vec<UnitId> = pool
            .iter_active()
            .filter(|(_, unit)| unit.selected)
            .map(|(id, _)| id)
            .collect();
        let removed = selected.len();
        for id in selected {
            pool.deactivate(id);
        }
        if removed > 0 {
            info!("Deleted {} unit(s)", removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatTerrain {
        height: f32,
    }

    impl TerrainQuery for FlatTerrain {
        fn ground_height(&self, _position: Vec3) -> f32 {
            self.height
        }

        fn ray_blocked(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> bool {
            false
        }

        fn ground_point_from_ray(&self, _origin: Vec3, _direction: Vec3) -> Vec3 {
            Vec3::new(0.0, self.height, 0.0)
        }
    }

    /// Top-down orthographic stand-in: world xz scaled onto the screen.
    fn top_down(world: Vec3) -> Option<Vec2> {
        Some(Vec2::new(world.x * 100.0, world.z * 100.0))
    }

    #[test]
    fn box_select_picks_exactly_the_contained_units() {
        let mut pool = UnitPool::default();
        let a = pool.spawn(Vec3::new(1.0, 0.0, 1.0), 0.0).unwrap();
        let b = pool.spawn(Vec3::new(2.0, 0.0, 2.0), 0.0).unwrap();
        let c = pool.spawn(Vec3::new(4.0, 0.0, 4.0), 0.0).unwrap();

        select_units_in_box(&mut pool, Vec2::new(50.0, 50.0), Vec2::new(250.0, 250.0), top_down);

        assert!(pool.get(a).unwrap().selected);
        assert!(pool.get(b).unwrap().selected);
        assert!(!pool.get(c).unwrap().selected);
    }

    #[test]
    fn box_select_normalizes_corner_order() {
        let mut pool = UnitPool::default();
        let a = pool.spawn(Vec3::new(1.0, 0.0, 1.0), 0.0).unwrap();

        select_units_in_box(&mut pool, Vec2::new(250.0, 250.0), Vec2::new(50.0, 50.0), top_down);

        assert!(pool.get(a).unwrap().selected);
    }

    #[test]
    fn box_select_replaces_previous_selection() {
        let mut pool = UnitPool::default();
        let far = pool.spawn(Vec3::new(9.0, 0.0, 9.0), 0.0).unwrap();
        pool.get_mut(far).unwrap().selected = true;
        let near = pool.spawn(Vec3::new(1.0, 0.0, 1.0), 0.0).unwrap();

        select_units_in_box(&mut pool, Vec2::new(50.0, 50.0), Vec2::new(150.0, 150.0), top_down);

        assert!(!pool.get(far).unwrap().selected);
        assert!(pool.get(near).unwrap().selected);
    }

    #[test]
    fn box_select_skips_unprojectable_units() {
        let mut pool = UnitPool::default();
        let a = pool.spawn(Vec3::new(1.0, 0.0, 1.0), 0.0).unwrap();

        select_units_in_box(&mut pool, Vec2::ZERO, Vec2::new(500.0, 500.0), |_| None);

        assert!(!pool.get(a).unwrap().selected);
    }

    #[test]
    fn four_units_form_a_two_by_two_grid() {
        let mut pool = UnitPool::default();
        let mut marker = CommandMarker::default();
        let terrain = FlatTerrain { height: 1.5 };

        let ids: Vec<UnitId> = (0..4)
            .map(|i| pool.spawn(Vec3::new(i as f32 * 10.0, 0.0, 0.0), 0.0).unwrap())
            .collect();
        for &id in &ids {
            pool.get_mut(id).unwrap().selected = true;
        }

        let target = Vec3::new(5.0, 0.0, 5.0);
        command_units(&mut pool, &mut marker, &terrain, target);

        let spacing = UNIT_SIZE * FORMATION_SPACING_FACTOR;
        let mut destinations = Vec::new();
        for (slot, &id) in ids.iter().enumerate() {
            let unit = pool.get(id).unwrap();
            assert!(unit.has_command);
            assert_eq!(unit.move_timer, 0.0);
            assert_eq!(unit.command_target.y, 1.5);

            let row = (slot / 2) as f32;
            let col = (slot % 2) as f32;
            let expected = Vec3::new(
                target.x + (col - 1.0) * spacing,
                1.5,
                target.z + (row - 1.0) * spacing,
            );
            assert!(
                unit.command_target.abs_diff_eq(expected, 1e-5),
                "slot {slot}: {:?} != {expected:?}",
                unit.command_target
            );
            destinations.push(unit.command_target);
        }

        // All four formation slots are distinct
        for i in 0..destinations.len() {
            for j in (i + 1)..destinations.len() {
                assert!(destinations[i].distance(destinations[j]) > spacing * 0.5);
            }
        }

        assert!(marker.active);
        assert_eq!(marker.position, target);
    }

    #[test]
    fn command_with_empty_selection_is_a_noop() {
        let mut pool = UnitPool::default();
        let mut marker = CommandMarker::default();
        let id = pool.spawn(Vec3::ZERO, 0.0).unwrap();

        command_units(&mut pool, &mut marker, &FlatTerrain { height: 0.0 }, Vec3::ONE);

        assert!(!pool.get(id).unwrap().has_command);
        assert!(!marker.active);
    }

    #[test]
    fn single_unit_goes_near_the_target() {
        let mut pool = UnitPool::default();
        let mut marker = CommandMarker::default();
        let id = pool.spawn(Vec3::ZERO, 0.0).unwrap();
        pool.get_mut(id).unwrap().selected = true;

        let target = Vec3::new(3.0, 0.0, -2.0);
        command_units(&mut pool, &mut marker, &FlatTerrain { height: 0.2 }, target);

        let unit = pool.get(id).unwrap();
        // cols = 1: single slot offset is (-s/2, 0, -s/2) off the raw target
        let spacing = UNIT_SIZE * FORMATION_SPACING_FACTOR;
        let expected = Vec3::new(target.x - spacing / 2.0, 0.2, target.z - spacing / 2.0);
        assert!(unit.command_target.abs_diff_eq(expected, 1e-5));
        assert_eq!(marker.position, target);
    }
}
