// Camera controllers: a free orbit camera for model inspection and a fixed
// angle isometric camera for commanding units. Both controllers live on the
// single Camera3d entity; ViewMode decides which one drives the transform.
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::f32::consts::FRAC_PI_2;

use crate::constants::*;
use crate::types::SceneBounds;

#[derive(Resource, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum ViewMode {
    #[default]
    Orbit,
    Isometric,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Orbit => "ORBIT",
            ViewMode::Isometric => "ISOMETRIC",
        }
    }
}

/// Request to center the active camera on a world point (control-group
/// selection).
#[derive(Event)]
pub struct CameraFocusEvent {
    pub target: Vec3,
}

#[derive(Component)]
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            distance: 10.0,
            yaw: 0.8,
            pitch: 0.5,
            target: Vec3::ZERO,
        }
    }
}

impl OrbitCamera {
    fn eye(&self) -> Vec3 {
        self.target
            + Vec3::new(
                self.distance * self.pitch.cos() * self.yaw.sin(),
                self.distance * self.pitch.sin(),
                self.distance * self.pitch.cos() * self.yaw.cos(),
            )
    }
}

#[derive(Component)]
pub struct IsoCamera {
    /// Smoothed look-at point.
    pub target: Vec3,
    /// Where the target is heading (pan input, focus events).
    pub target_goal: Vec3,
    pub height: f32,
}

impl Default for IsoCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            target_goal: Vec3::ZERO,
            height: 15.0,
        }
    }
}

impl IsoCamera {
    fn eye(&self) -> Vec3 {
        self.target + Vec3::new(0.0, self.height, self.height * ISO_FORWARD_FACTOR)
    }
}

/// Tab switches between the two camera modes.
pub fn toggle_view_mode(keyboard: Res<ButtonInput<KeyCode>>, mut view_mode: ResMut<ViewMode>) {
    if keyboard.just_pressed(KeyCode::Tab) {
        *view_mode = match *view_mode {
            ViewMode::Orbit => ViewMode::Isometric,
            ViewMode::Isometric => ViewMode::Orbit,
        };
        info!("View mode: {}", view_mode.label());
    }
}

/// Orbit control: left-drag rotates, wheel zooms, middle-drag pans the
/// target, R recenters on the scene.
pub fn orbit_camera_control(
    view_mode: Res<ViewMode>,
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    bounds: Res<SceneBounds>,
    mut query: Query<(&mut OrbitCamera, &mut Transform), With<Camera3d>>,
) {
    if *view_mode != ViewMode::Orbit {
        motion.clear();
        wheel.clear();
        return;
    }
    let Ok((mut orbit, mut transform)) = query.single_mut() else {
        return;
    };

    let mut delta = Vec2::ZERO;
    for event in motion.read() {
        delta += event.delta;
    }

    if mouse.pressed(MouseButton::Left) {
        orbit.yaw -= delta.x * ORBIT_MOUSE_SENSITIVITY;
        orbit.pitch = (orbit.pitch + delta.y * ORBIT_MOUSE_SENSITIVITY)
            .clamp(-(FRAC_PI_2 - 0.1), FRAC_PI_2 - 0.1);
    } else if mouse.pressed(MouseButton::Middle) {
        let rotation = Quat::from_euler(EulerRot::YXZ, orbit.yaw, -orbit.pitch, 0.0);
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;
        let pan = (right * -delta.x + up * delta.y) * orbit.distance * 0.001;
        orbit.target += pan;
    }

    for event in wheel.read() {
        orbit.distance = (orbit.distance * (1.0 - event.y * ORBIT_ZOOM_SPEED))
            .clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        orbit.target = bounds.center;
        orbit.yaw = 0.8;
        orbit.pitch = 0.5;
        orbit.distance = (bounds.max_dimension * 2.0)
            .clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
    }

    let eye = orbit.eye();
    *transform = Transform::from_translation(eye).looking_at(orbit.target, Vec3::Y);
}

/// Isometric control: WASD/edge-scroll/middle-drag pans, wheel adjusts
/// height, R recenters. The look-at point eases toward its goal.
pub fn iso_camera_control(
    time: Res<Time>,
    view_mode: Res<ViewMode>,
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    bounds: Res<SceneBounds>,
    mut query: Query<(&mut IsoCamera, &mut Transform), With<Camera3d>>,
) {
    if *view_mode != ViewMode::Isometric {
        motion.clear();
        wheel.clear();
        return;
    }
    let Ok((mut iso, mut transform)) = query.single_mut() else {
        return;
    };

    let dt = time.delta_secs();
    let mut pan = Vec2::ZERO;

    if keyboard.pressed(KeyCode::KeyW) {
        pan.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        pan.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        pan.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        pan.x += 1.0;
    }

    if let Ok(window) = windows.single() {
        if let Some(cursor) = window.cursor_position() {
            if cursor.x < ISO_EDGE_SCROLL_ZONE {
                pan.x -= 1.0;
            }
            if cursor.x > window.width() - ISO_EDGE_SCROLL_ZONE {
                pan.x += 1.0;
            }
            if cursor.y < ISO_EDGE_SCROLL_ZONE {
                pan.y -= 1.0;
            }
            if cursor.y > window.height() - ISO_EDGE_SCROLL_ZONE {
                pan.y += 1.0;
            }
        }
    }

    if pan != Vec2::ZERO {
        let pan = pan.normalize() * ISO_PAN_SPEED * dt;
        iso.target_goal += Vec3::new(pan.x, 0.0, pan.y);
    }

    let mut drag = Vec2::ZERO;
    for event in motion.read() {
        drag += event.delta;
    }
    if mouse.pressed(MouseButton::Middle) && drag != Vec2::ZERO {
        // Drag the world under the cursor; scale with height so the pan feels
        // constant on screen
        let scale = iso.height * 0.002;
        iso.target_goal += Vec3::new(-drag.x * scale, 0.0, -drag.y * scale);
    }

    for event in wheel.read() {
        iso.height = (iso.height - event.y * ISO_ZOOM_SPEED).clamp(ISO_MIN_HEIGHT, ISO_MAX_HEIGHT);
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        iso.target_goal = bounds.center;
        iso.height = (bounds.max_dimension * 1.5).clamp(ISO_MIN_HEIGHT, ISO_MAX_HEIGHT);
    }

    let goal = iso.target_goal;
    iso.target = iso.target.lerp(goal, ISO_SMOOTHING);

    let eye = iso.eye();
    *transform = Transform::from_translation(eye).looking_at(iso.target, Vec3::Y);
}

/// Centers whichever camera is active on the focus point (group selection).
pub fn apply_camera_focus(
    mut events: EventReader<CameraFocusEvent>,
    view_mode: Res<ViewMode>,
    mut query: Query<(&mut OrbitCamera, &mut IsoCamera), With<Camera3d>>,
) {
    let Ok((mut orbit, mut iso)) = query.single_mut() else {
        events.clear();
        return;
    };
    for event in events.read() {
        match *view_mode {
            ViewMode::Orbit => orbit.target = event.target,
            ViewMode::Isometric => iso.target_goal = event.target,
        }
    }
}
