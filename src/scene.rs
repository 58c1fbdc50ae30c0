// Scene loading and collision extraction: spawns the glTF scene from the CLI
// argument, aborts on load failure, and once the meshes are in builds the
// world-space triangle collider plus the aggregate scene bounds.
use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, VertexAttributeValues};
use clap::Parser;

use crate::camera::{IsoCamera, OrbitCamera};
use crate::constants::*;
use crate::terrain::{MeshCollider, SceneCollider};
use crate::types::SceneBounds;

/// 3D model viewer with RTS-style unit simulation.
#[derive(Parser, Resource)]
#[command(name = "bevy-scene-units", version)]
pub struct ViewerArgs {
    /// Path to the glTF/GLB scene to load (relative to the assets directory)
    #[arg(default_value = "ibm-pc.glb")]
    pub model: String,
}

#[derive(Resource)]
pub struct SceneHandle {
    pub scene: Handle<Scene>,
}

pub fn load_scene(mut commands: Commands, args: Res<ViewerArgs>, asset_server: Res<AssetServer>) {
    info!("Loading scene: {}", args.model);
    let scene: Handle<Scene> =
        asset_server.load(GltfAssetLabel::Scene(0).from_asset(args.model.clone()));
    commands.spawn(SceneRoot(scene.clone()));
    commands.insert_resource(SceneHandle { scene });
}

/// Aborts the app when the scene asset fails to load; a viewer without a
/// scene has nothing to show.
pub fn watch_scene_load(
    handle: Res<SceneHandle>,
    asset_server: Res<AssetServer>,
    mut exit: EventWriter<AppExit>,
) {
    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle.scene.id()) {
        error!("Failed to load scene: {err}");
        exit.write(AppExit::error());
    }
}

/// One-shot collider build. Waits until the scene and its dependencies are
/// fully loaded and the spawned mesh entities carry their final global
/// transforms (one extra frame after they appear), then bakes every mesh
/// into world-space triangles.
pub fn build_scene_collider(
    handle: Res<SceneHandle>,
    asset_server: Res<AssetServer>,
    meshes: Res<Assets<Mesh>>,
    mesh_query: Query<(&Mesh3d, &GlobalTransform)>,
    mut seen_meshes: Local<bool>,
    mut collider: ResMut<SceneCollider>,
    mut bounds: ResMut<SceneBounds>,
    mut cameras: Query<(&mut OrbitCamera, &mut IsoCamera), With<Camera3d>>,
) {
    if !collider.is_empty() || bounds.ready {
        return;
    }
    if !asset_server.is_loaded_with_dependencies(&handle.scene) {
        return;
    }
    if mesh_query.is_empty() {
        return;
    }
    // Global transforms propagate the frame after the scene spawns; skip the
    // first frame the meshes show up
    if !*seen_meshes {
        *seen_meshes = true;
        return;
    }

    let mut scene_min = Vec3::splat(f32::INFINITY);
    let mut scene_max = Vec3::splat(f32::NEG_INFINITY);

    for (mesh3d, global_transform) in &mesh_query {
        let Some(mesh) = meshes.get(&mesh3d.0) else {
            continue;
        };
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            continue;
        };

        let vertices: Vec<Vec3> = positions
            .iter()
            .map(|p| global_transform.transform_point(Vec3::from_array(*p)))
            .collect();

        let mut triangles = Vec::new();
        match mesh.indices() {
            Some(Indices::U16(indices)) => {
                for tri in indices.chunks_exact(3) {
                    triangles.push([
                        vertices[tri[0] as usize],
                        vertices[tri[1] as usize],
                        vertices[tri[2] as usize],
                    ]);
                }
            }
            Some(Indices::U32(indices)) => {
                for tri in indices.chunks_exact(3) {
                    triangles.push([
                        vertices[tri[0] as usize],
                        vertices[tri[1] as usize],
                        vertices[tri[2] as usize],
                    ]);
                }
            }
            None => {
                for tri in vertices.chunks_exact(3) {
                    triangles.push([tri[0], tri[1], tri[2]]);
                }
            }
        }
        if triangles.is_empty() {
            continue;
        }

        let mesh_collider = MeshCollider::from_triangles(triangles);
        scene_min = scene_min.min(mesh_collider.aabb_min);
        scene_max = scene_max.max(mesh_collider.aabb_max);
        collider.push_mesh(mesh_collider, vertices.len());
    }

    if collider.is_empty() {
        return;
    }

    bounds.center = (scene_min + scene_max) * 0.5;
    bounds.max_dimension = (scene_max - scene_min).max_element().max(1.0);
    bounds.ready = true;

    info!(
        "Scene collider built: {} mesh(es), {} triangles, {} vertices, bounds center ({:.1}, {:.1}, {:.1}), max dimension {:.1}",
        collider.meshes.len(),
        collider.triangle_count,
        collider.vertex_count,
        bounds.center.x,
        bounds.center.y,
        bounds.center.z,
        bounds.max_dimension
    );

    // Center both cameras on the loaded scene
    if let Ok((mut orbit, mut iso)) = cameras.single_mut() {
        orbit.target = bounds.center;
        orbit.distance =
            (bounds.max_dimension * 2.0).clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
        iso.target = bounds.center;
        iso.target_goal = bounds.center;
        iso.height = (bounds.max_dimension * 1.5).clamp(ISO_MIN_HEIGHT, ISO_MAX_HEIGHT);
    }
}
