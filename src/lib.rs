//! Tilt Golf - a tilt-controlled miniature golf core
//!
//! Core modules:
//! - `sensor`: Magnetometer capability, calibration with preview/commit
//! - `sim`: Deterministic simulation (signal conditioning, rigid bodies, hazards, levels)
//! - `game`: Per-frame controller driving sensor -> force -> step -> evaluate
//! - `progress`: In-memory level unlocks and best times
//! - `settings`: Orientation flags and bus configuration

pub mod game;
pub mod progress;
pub mod sensor;
pub mod settings;
pub mod sim;

pub use game::{Game, GameEvent, GamePhase};
pub use progress::LevelProgress;
pub use settings::{Orientation, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const TIME_STEP: f32 = 1.0 / 60.0;

    /// World extents (meters)
    pub const WORLD_WIDTH: f32 = 30.0;
    pub const WORLD_HEIGHT: f32 = 15.0;
    /// Boundary wall half-thickness
    pub const WALL_HALF_THICKNESS: f32 = 0.5;
    /// Gap between the inner wall face and the ball start / hole
    pub const START_MARGIN: f32 = 1.5;
    pub const HOLE_RADIUS: f32 = 1.0;
    /// Ball center must be closer than `hole_radius * WIN_RADIUS_FACTOR`
    pub const WIN_RADIUS_FACTOR: f32 = 0.5;

    /// Ball body
    pub const BALL_RADIUS: f32 = 0.5;
    pub const BALL_DENSITY: f32 = 1.0;
    pub const BALL_FRICTION: f32 = 0.3;
    pub const BALL_RESTITUTION: f32 = 0.6;
    /// Rolling resistance on the felt
    pub const BALL_LINEAR_DAMPING: f32 = 1.0;
    pub const BALL_ANGULAR_DAMPING: f32 = 0.8;

    /// Wall bodies absorb rather than bounce
    pub const WALL_FRICTION: f32 = 0.6;
    pub const WALL_RESTITUTION: f32 = 0.0;

    /// Calibration sampling window
    pub const CALIBRATION_SAMPLES: u32 = 20;
    pub const CALIBRATION_SAMPLE_DELAY_MS: u32 = 10;

    /// Raw sensor units -> force (newtons)
    pub const FORCE_SENSITIVITY: f32 = 0.05;
    /// Scaled components below this are zeroed
    pub const FORCE_DEADZONE: f32 = 0.5;
    /// Low-pass smoothing factor, in (0, 1]
    pub const SMOOTHING_ALPHA: f32 = 0.2;

    /// Renderer scale: 15 pixels = 1 meter
    pub const PIXELS_PER_METER: f32 = 15.0;

    /// Number of hand-authored levels
    pub const LEVEL_COUNT: u32 = 6;
}

/// Convert a world-space point (meters) to screen pixels
#[inline]
pub fn to_pixels(pos: Vec2) -> Vec2 {
    pos * consts::PIXELS_PER_METER
}

/// Simulation ticks to seconds
#[inline]
pub fn ticks_to_secs(ticks: u64) -> f32 {
    ticks as f32 * consts::TIME_STEP
}
