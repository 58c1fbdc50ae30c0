// Tunables for the viewer, cameras and the unit simulation

// Window settings
pub const WINDOW_WIDTH: f32 = 800.0;
pub const WINDOW_HEIGHT: f32 = 600.0;

// Orbit camera settings
pub const ORBIT_MOUSE_SENSITIVITY: f32 = 0.003;
pub const ORBIT_ZOOM_SPEED: f32 = 0.1;
pub const ORBIT_MIN_DISTANCE: f32 = 1.0;
pub const ORBIT_MAX_DISTANCE: f32 = 100.0;

// Isometric camera settings
pub const ISO_PAN_SPEED: f32 = 10.0;
pub const ISO_EDGE_SCROLL_ZONE: f32 = 20.0; // Pixels from window edge
pub const ISO_MIN_HEIGHT: f32 = 5.0;
pub const ISO_MAX_HEIGHT: f32 = 50.0;
pub const ISO_ZOOM_SPEED: f32 = 2.0;
pub const ISO_SMOOTHING: f32 = 0.15;
/// Forward offset of the camera eye relative to its height (gives the fixed
/// isometric-style viewing angle).
pub const ISO_FORWARD_FACTOR: f32 = 0.8;

// Unit settings
pub const MAX_UNITS: usize = 100;
pub const UNIT_SIZE: f32 = 0.3;
pub const UNIT_SPEED: f32 = 2.0;
pub const UNIT_TURN_SPEED: f32 = 3.0; // Radians per second toward movement direction
pub const UNIT_AVOIDANCE_DISTANCE: f32 = 1.5;
pub const UNIT_HEIGHT_OFFSET: f32 = 0.2; // Clearance above the terrain surface
pub const UNIT_ARRIVAL_DISTANCE: f32 = 0.5;
/// Below this distance to the goal a unit stands still instead of jittering.
pub const GOAL_EPSILON: f32 = 0.1;
/// A sibling unit closer than `size * SIBLING_BLOCK_FACTOR` counts as an obstacle.
pub const SIBLING_BLOCK_FACTOR: f32 = 3.0;

// Wander behavior
pub const WANDER_MIN_DISTANCE: f32 = 2.0;
pub const WANDER_MAX_DISTANCE: f32 = 8.0;
pub const WANDER_TIMER_MIN: f32 = 2.0;
pub const WANDER_TIMER_MAX: f32 = 5.0;
/// How far ahead a wandering unit retargets when its path is blocked.
pub const AVOID_RETARGET_DISTANCE: f32 = 3.0;
/// Shortened wander timer after an avoidance retarget (forces a fresh decision soon).
pub const AVOID_RETARGET_TIMER: f32 = 1.0;

// Move command formation
pub const FORMATION_SPACING_FACTOR: f32 = 2.5; // Multiplied by UNIT_SIZE

// Terrain queries
/// Height above the query position from which the downward ground probe is cast.
pub const GROUND_PROBE_HEIGHT: f32 = 10.0;

// Command marker
pub const COMMAND_MARKER_LIFETIME: f32 = 1.0;

// Spawning
pub const SPAWN_BATCH_SIZE: usize = 5;
