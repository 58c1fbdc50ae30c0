// Screen-space UI: the info overlay, per-mode key help, the drag-selection
// rectangle and per-unit group number badges.
use bevy::prelude::*;

use crate::camera::{IsoCamera, OrbitCamera, ViewMode};
use crate::constants::*;
use crate::scene::ViewerArgs;
use crate::selection::BoxSelection;
use crate::terrain::SceneCollider;
use crate::types::{ControlGroups, DisplayToggles, UnitId, UnitPool};

#[derive(Component)]
pub struct InfoText;

#[derive(Component)]
pub struct HelpText;

#[derive(Component)]
pub struct SelectionRect;

/// Screen badge showing a unit's control group number.
#[derive(Component)]
pub struct GroupBadge(pub UnitId);

pub fn setup_ui(mut commands: Commands) {
    commands.spawn((
        InfoText,
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            left: Val::Px(8.0),
            ..default()
        },
    ));

    commands.spawn((
        HelpText,
        Text::new(""),
        TextFont {
            font_size: 12.0,
            ..default()
        },
        TextColor(Color::srgb(0.8, 0.8, 0.8)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(8.0),
            left: Val::Px(8.0),
            ..default()
        },
    ));

    commands.spawn((
        SelectionRect,
        Node {
            position_type: PositionType::Absolute,
            ..default()
        },
        BackgroundColor(Color::srgba(0.2, 1.0, 0.2, 0.12)),
        Visibility::Hidden,
    ));
}

/// I/G/X/U display toggles (U also pauses the simulation).
pub fn display_toggle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut toggles: ResMut<DisplayToggles>,
) {
    if keyboard.just_pressed(KeyCode::KeyI) {
        toggles.info = !toggles.info;
    }
    if keyboard.just_pressed(KeyCode::KeyG) {
        toggles.grid = !toggles.grid;
    }
    if keyboard.just_pressed(KeyCode::KeyX) {
        toggles.axes = !toggles.axes;
    }
    if keyboard.just_pressed(KeyCode::KeyU) {
        toggles.units = !toggles.units;
        info!(
            "Units {}",
            if toggles.units { "enabled" } else { "disabled" }
        );
    }
}

pub fn update_info_text(
    view_mode: Res<ViewMode>,
    toggles: Res<DisplayToggles>,
    args: Res<ViewerArgs>,
    collider: Res<SceneCollider>,
    pool: Res<UnitPool>,
    groups: Res<ControlGroups>,
    cameras: Query<(&OrbitCamera, &IsoCamera), With<Camera3d>>,
    mut query: Query<(&mut Text, &mut Visibility), With<InfoText>>,
) {
    let Ok((mut text, mut visibility)) = query.single_mut() else {
        return;
    };
    if !toggles.info {
        *visibility = Visibility::Hidden;
        return;
    }
    *visibility = Visibility::Inherited;

    let camera_line = match cameras.single() {
        Ok((orbit, iso)) => match *view_mode {
            ViewMode::Orbit => format!("Distance: {:.1}", orbit.distance),
            ViewMode::Isometric => format!("Height: {:.1}", iso.height),
        },
        Err(_) => String::new(),
    };

    let occupied = groups.occupied_numbers(&pool);
    let groups_line = if occupied.is_empty() {
        "-".to_string()
    } else {
        occupied
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    };

    text.0 = format!(
        "Model: {}\nMode: {}\n{}\nMeshes: {}  Triangles: {}  Vertices: {}\nUnits: {}/{}  Selected: {}\nGroups: {}",
        args.model,
        view_mode.label(),
        camera_line,
        collider.meshes.len(),
        collider.triangle_count,
        collider.vertex_count,
        pool.active_count(),
        MAX_UNITS,
        pool.selected_count(),
        groups_line,
    );
}

pub fn update_help_text(
    view_mode: Res<ViewMode>,
    mut query: Query<&mut Text, With<HelpText>>,
) {
    if !view_mode.is_changed() {
        return;
    }
    let Ok(mut text) = query.single_mut() else {
        return;
    };
    text.0 = match *view_mode {
        ViewMode::Orbit => "TAB: iso view | LMB drag: rotate | MMB: pan | Wheel: zoom | R: reset\n\
            RMB: move command | SPACE: spawn | C: clear | DEL: delete | I/G/X/U: toggles"
            .to_string(),
        ViewMode::Isometric => "TAB: orbit view | LMB drag: select | WASD/edges/MMB: pan | Wheel: zoom | R: reset\n\
            RMB: move command | CTRL+1-9: set group | 1-9: select group | SPACE: spawn | C: clear"
            .to_string(),
    };
}

/// Shows the drag rectangle while a box selection is in progress.
pub fn update_selection_rect(
    selection: Res<BoxSelection>,
    mut query: Query<(&mut Node, &mut Visibility), With<SelectionRect>>,
) {
    let Ok((mut node, mut visibility)) = query.single_mut() else {
        return;
    };
    if !selection.dragging {
        *visibility = Visibility::Hidden;
        return;
    }
    *visibility = Visibility::Inherited;

    let min = selection.start.min(selection.current);
    let max = selection.start.max(selection.current);
    node.left = Val::Px(min.x);
    node.top = Val::Px(min.y);
    node.width = Val::Px(max.x - min.x);
    node.height = Val::Px(max.y - min.y);
}

/// One floating text badge per grouped unit, tracking its screen position.
pub fn sync_group_badges(
    mut commands: Commands,
    pool: Res<UnitPool>,
    toggles: Res<DisplayToggles>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut badges: Query<(Entity, &GroupBadge, &mut Text, &mut Node, &mut Visibility)>,
) {
    let camera = cameras.single().ok();
    let mut represented: Vec<UnitId> = Vec::new();

    for (entity, badge, mut text, mut node, mut visibility) in &mut badges {
        let alive = pool.get(badge.0).filter(|unit| unit.group_id != 0);
        let Some(unit) = alive else {
            commands.entity(entity).despawn();
            continue;
        };
        represented.push(badge.0);

        if !toggles.units {
            *visibility = Visibility::Hidden;
            continue;
        }

        let screen = camera.and_then(|(cam, transform)| {
            cam.world_to_viewport(transform, unit.position + Vec3::Y * unit.size * 2.0)
                .ok()
        });
        match screen {
            Some(pos) => {
                *visibility = Visibility::Inherited;
                node.left = Val::Px(pos.x);
                node.top = Val::Px(pos.y);
                let label = unit.group_id.to_string();
                if text.0 != label {
                    text.0 = label;
                }
            }
            None => *visibility = Visibility::Hidden,
        }
    }

    for (id, unit) in pool.iter_active() {
        if unit.group_id == 0 || represented.contains(&id) {
            continue;
        }
        commands.spawn((
            GroupBadge(id),
            Text::new(unit.group_id.to_string()),
            TextFont {
                font_size: 12.0,
                ..default()
            },
            TextColor(Color::srgb(1.0, 1.0, 0.3)),
            Node {
                position_type: PositionType::Absolute,
                ..default()
            },
        ));
    }
}
