// Render-side mirror of the unit pool plus the gizmo overlays (grid, axes,
// selection and command indicators, command marker).
use bevy::color::palettes::css;
use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use crate::constants::*;
use crate::types::{CommandMarker, DisplayToggles, UnitId, UnitPool};

#[derive(Resource)]
pub struct UnitAssets {
    pub mesh: Handle<Mesh>,
    pub idle: Handle<StandardMaterial>,
    pub selected: Handle<StandardMaterial>,
    pub commanded: Handle<StandardMaterial>,
}

/// Marker component tying a render entity to its pool slot.
#[derive(Component)]
pub struct UnitVisual(pub UnitId);

pub fn setup_unit_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(UnitAssets {
        mesh: meshes.add(Cuboid::from_length(UNIT_SIZE)),
        idle: materials.add(StandardMaterial {
            base_color: Color::WHITE,
            ..default()
        }),
        selected: materials.add(StandardMaterial {
            base_color: css::LIME.into(),
            ..default()
        }),
        commanded: materials.add(StandardMaterial {
            base_color: css::DEEP_SKY_BLUE.into(),
            ..default()
        }),
    });
}

/// Keeps one cube entity per live unit: spawns visuals for new units,
/// despawns visuals whose handle no longer resolves, and syncs transform and
/// state color every frame.
pub fn sync_unit_visuals(
    mut commands: Commands,
    pool: Res<UnitPool>,
    toggles: Res<DisplayToggles>,
    assets: Res<UnitAssets>,
    mut visuals: Query<(
        Entity,
        &UnitVisual,
        &mut Transform,
        &mut Visibility,
        &mut MeshMaterial3d<StandardMaterial>,
    )>,
) {
    let mut represented: Vec<UnitId> = Vec::with_capacity(pool.active_count());

    for (entity, visual, mut transform, mut visibility, mut material) in &mut visuals {
        let Some(unit) = pool.get(visual.0) else {
            commands.entity(entity).despawn();
            continue;
        };
        represented.push(visual.0);

        transform.translation = unit.position;
        transform.rotation = Quat::from_rotation_y(-unit.rotation);
        *visibility = if toggles.units {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };

        let wanted = if unit.selected && unit.has_command {
            &assets.commanded
        } else if unit.selected {
            &assets.selected
        } else {
            &assets.idle
        };
        if material.0 != *wanted {
            material.0 = wanted.clone();
        }
    }

    for (id, unit) in pool.iter_active() {
        if represented.contains(&id) {
            continue;
        }
        commands.spawn((
            UnitVisual(id),
            Mesh3d(assets.mesh.clone()),
            MeshMaterial3d(assets.idle.clone()),
            Transform::from_translation(unit.position),
        ));
    }
}

/// Reference grid and world axes.
pub fn draw_world_overlays(mut gizmos: Gizmos, toggles: Res<DisplayToggles>) {
    if toggles.grid {
        let half = 15;
        let extent = half as f32;
        let color = Color::srgba(0.5, 0.5, 0.5, 0.4);
        for i in -half..=half {
            let offset = i as f32;
            gizmos.line(
                Vec3::new(-extent, 0.0, offset),
                Vec3::new(extent, 0.0, offset),
                color,
            );
            gizmos.line(
                Vec3::new(offset, 0.0, -extent),
                Vec3::new(offset, 0.0, extent),
                color,
            );
        }
    }

    if toggles.axes {
        gizmos.line(Vec3::ZERO, Vec3::X * 5.0, css::RED);
        gizmos.line(Vec3::ZERO, Vec3::Y * 5.0, css::GREEN);
        gizmos.line(Vec3::ZERO, Vec3::Z * 5.0, css::BLUE);
    }
}

/// Per-unit indicators: selection boxes, heading lines, command-target lines.
pub fn draw_unit_overlays(mut gizmos: Gizmos, pool: Res<UnitPool>, toggles: Res<DisplayToggles>) {
    if !toggles.units {
        return;
    }

    for (_, unit) in pool.iter_active() {
        let heading = Vec3::new(unit.rotation.cos(), 0.0, unit.rotation.sin());
        gizmos.line(
            unit.position,
            unit.position + heading * unit.size * 2.0,
            css::ORANGE,
        );

        if unit.selected {
            gizmos.cuboid(
                Transform::from_translation(unit.position)
                    .with_scale(Vec3::splat(unit.size * 1.6)),
                css::YELLOW,
            );
            if unit.has_command {
                gizmos.line(
                    unit.position,
                    unit.command_target,
                    css::LIME.with_alpha(0.3),
                );
            }
        }
    }
}

/// Expanding ground ring and fading beam at the last commanded point.
pub fn draw_command_marker(mut gizmos: Gizmos, marker: Res<CommandMarker>) {
    if !marker.active {
        return;
    }

    let alpha = (marker.timer / COMMAND_MARKER_LIFETIME).clamp(0.0, 1.0);
    let scale = 1.0 + (1.0 - alpha) * 2.0;
    let color = css::LIME.with_alpha(alpha);

    gizmos.circle(
        Isometry3d::new(marker.position, Quat::from_rotation_x(-FRAC_PI_2)),
        0.5 * scale,
        color,
    );
    gizmos.line(
        marker.position,
        marker.position + Vec3::Y * 2.0 * alpha,
        color,
    );
}
