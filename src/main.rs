// 3D model viewer with an RTS-style unit simulation layered on top: load a
// glTF scene, inspect it with orbit/isometric cameras, and spawn, select,
// group and command ground-following units across the scene geometry.
use bevy::prelude::*;
use clap::Parser;

mod camera;
mod constants;
mod math_utils;
mod movement;
mod scene;
mod selection;
mod terrain;
mod types;
mod ui;
mod visuals;

use camera::{CameraFocusEvent, IsoCamera, OrbitCamera, ViewMode};
use constants::*;
use selection::BoxSelection;
use terrain::SceneCollider;
use types::{CommandMarker, ControlGroups, DisplayToggles, SceneBounds, UnitPool};

fn main() {
    let args = scene::ViewerArgs::parse();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Model Viewer".into(),
                resolution: (WINDOW_WIDTH, WINDOW_HEIGHT).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(args)
        .init_resource::<UnitPool>()
        .init_resource::<ControlGroups>()
        .init_resource::<CommandMarker>()
        .init_resource::<SceneCollider>()
        .init_resource::<SceneBounds>()
        .init_resource::<ViewMode>()
        .init_resource::<DisplayToggles>()
        .init_resource::<BoxSelection>()
        .add_event::<CameraFocusEvent>()
        .add_systems(
            Startup,
            (setup, scene::load_scene, visuals::setup_unit_assets, ui::setup_ui),
        )
        .add_systems(
            Update,
            (
                // Scene bring-up
                (scene::watch_scene_load, scene::build_scene_collider),
                // Input
                (
                    camera::toggle_view_mode,
                    ui::display_toggle_input,
                    selection::box_selection_input,
                    selection::move_command_input,
                    selection::control_group_input,
                    selection::unit_population_input,
                ),
                // Simulation
                movement::update_unit_simulation,
                // Cameras follow input and focus requests
                (
                    camera::apply_camera_focus,
                    camera::orbit_camera_control,
                    camera::iso_camera_control,
                ),
                // Render-side sync and overlays
                (
                    visuals::sync_unit_visuals,
                    visuals::draw_world_overlays,
                    visuals::draw_unit_overlays,
                    visuals::draw_command_marker,
                    ui::update_info_text,
                    ui::update_help_text,
                    ui::update_selection_rect,
                    ui::sync_group_badges,
                ),
            )
                .chain(),
        )
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(10.0, 8.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCamera::default(),
        IsoCamera::default(),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(12.0, 20.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 250.0,
        ..default()
    });
}
