//! Level layouts
//!
//! `get_level` is a pure mapping from level id to geometry. Moving water is
//! split into an immutable template (`MovingWaterDef`, part of the level) and
//! a runtime mirror (`MovingWater`) that the world advances every step.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::consts::*;

/// Axis-aligned rectangle (center + half extents), meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Rect {
    pub const fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Point containment, edges inclusive
    pub fn contains_point(&self, point: Vec2) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }
}

/// Oscillating water template: slides vertically around `base`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingWaterDef {
    pub base: Vec2,
    pub half_extents: Vec2,
    pub amplitude: f32,
    /// Radians per second
    pub speed: f32,
    /// Initial phase (radians)
    pub phase: f32,
    /// +1 or -1
    pub direction: f32,
}

impl MovingWaterDef {
    pub fn position_at(&self, phase: f32) -> Vec2 {
        self.base + Vec2::Y * (self.amplitude * phase.sin() * self.direction)
    }
}

/// Per-session state of one moving water region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingWater {
    pub def: MovingWaterDef,
    pub phase: f32,
    pub position: Vec2,
}

impl MovingWater {
    pub fn new(def: MovingWaterDef) -> Self {
        Self {
            def,
            phase: def.phase,
            position: def.position_at(def.phase),
        }
    }

    /// Advance the oscillation by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.phase = (self.phase + self.def.speed * dt) % std::f32::consts::TAU;
        self.position = self.def.position_at(self.phase);
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.def.half_extents)
    }
}

/// Complete description of one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub id: u32,
    pub width: f32,
    pub height: f32,
    pub ball_start: Vec2,
    pub hole_pos: Vec2,
    pub hole_radius: f32,
    pub walls: Vec<Rect>,
    pub water: Vec<Rect>,
    pub moving_water: Vec<MovingWaterDef>,
}

impl LevelConfig {
    /// Runtime mirrors for this level's moving water, at their initial phase
    pub fn spawn_moving_water(&self) -> Vec<MovingWater> {
        self.moving_water.iter().copied().map(MovingWater::new).collect()
    }
}

/// Inner playfield edges (inside the boundary walls)
const INNER_LEFT: f32 = 2.0 * WALL_HALF_THICKNESS;
const INNER_TOP: f32 = 2.0 * WALL_HALF_THICKNESS;
const INNER_RIGHT: f32 = WORLD_WIDTH - 2.0 * WALL_HALF_THICKNESS;
const INNER_BOTTOM: f32 = WORLD_HEIGHT - 2.0 * WALL_HALF_THICKNESS;

fn rect(cx: f32, cy: f32, hx: f32, hy: f32) -> Rect {
    Rect::new(Vec2::new(cx, cy), Vec2::new(hx, hy))
}

fn lane(x: f32, base_y: f32, amplitude: f32, speed: f32, phase: f32, direction: f32) -> MovingWaterDef {
    MovingWaterDef {
        base: Vec2::new(x, base_y),
        half_extents: Vec2::new(1.0, 1.5),
        amplitude,
        speed,
        phase,
        direction,
    }
}

fn boundary_walls() -> Vec<Rect> {
    let (w, h, t) = (WORLD_WIDTH, WORLD_HEIGHT, WALL_HALF_THICKNESS);
    vec![
        // Top, bottom, left, right (y grows downward)
        rect(w * 0.5, t, w * 0.5, t),
        rect(w * 0.5, h - t, w * 0.5, t),
        rect(t, h * 0.5, t, h * 0.5),
        rect(w - t, h * 0.5, t, h * 0.5),
    ]
}

/// Build the layout for `id`. Unknown ids get the level 1 layout.
pub fn get_level(id: u32) -> LevelConfig {
    let m = START_MARGIN;
    let top_left = Vec2::new(INNER_LEFT + m, INNER_TOP + m);
    let top_right = Vec2::new(INNER_RIGHT - m, INNER_TOP + m);
    let bottom_left = Vec2::new(INNER_LEFT + m, INNER_BOTTOM - m);
    let bottom_right = Vec2::new(INNER_RIGHT - m, INNER_BOTTOM - m);
    let mid_left = Vec2::new(INNER_LEFT + m, WORLD_HEIGHT * 0.5);
    let mid_right = Vec2::new(INNER_RIGHT - m, WORLD_HEIGHT * 0.5);
    let center = Vec2::new(WORLD_WIDTH * 0.5, WORLD_HEIGHT * 0.5);

    let mut level = LevelConfig {
        id,
        width: WORLD_WIDTH,
        height: WORLD_HEIGHT,
        ball_start: top_right,
        hole_pos: center,
        hole_radius: HOLE_RADIUS,
        walls: boundary_walls(),
        water: Vec::new(),
        moving_water: Vec::new(),
    };
    let (w, h) = (WORLD_WIDTH, WORLD_HEIGHT);

    match id {
        2 => {
            // Vertical bar left of center, horizontal bar right of center
            level.ball_start = top_left;
            level.hole_pos = bottom_right;
            level.walls.push(rect(w * 0.35, h * 0.5, 0.3, (h * 0.18).max(0.8)));
            level.walls.push(rect(w * 0.65, h * 0.5, (w * 0.18).max(0.8), 0.3));
        }
        3 => {
            // Pond in the middle, go around it
            level.ball_start = mid_left;
            level.hole_pos = mid_right;
            level.water.push(rect(w * 0.5, h * 0.5, 2.5, 3.0));
            level.walls.push(rect(w * 0.5, INNER_TOP + 1.0, 0.3, 1.0));
            level.walls.push(rect(w * 0.5, INNER_BOTTOM - 1.0, 0.3, 1.0));
        }
        4 => {
            // Two lanes of sliding water, out of phase
            level.ball_start = top_left;
            level.hole_pos = bottom_right;
            level.moving_water.push(lane(w * 0.35, h * 0.5, 4.0, 1.5, 0.0, 1.0));
            level.moving_water.push(lane(w * 0.65, h * 0.5, 4.0, 1.5, PI, -1.0));
        }
        5 => {
            // Switchback corridors with water pockets in the corners
            level.ball_start = bottom_left;
            level.hole_pos = bottom_right;
            level.walls.push(rect(w * 0.27, INNER_TOP + 4.5, 0.3, 4.5));
            level.walls.push(rect(w * 0.5, INNER_BOTTOM - 4.5, 0.3, 4.5));
            level.walls.push(rect(w * 0.73, INNER_TOP + 4.5, 0.3, 4.5));
            level.water.push(rect(w * 0.385, INNER_TOP + 1.0, 1.5, 1.0));
            level.water.push(rect(w * 0.615, INNER_BOTTOM - 1.0, 1.5, 1.0));
        }
        6 => {
            // Everything at once
            level.ball_start = top_left;
            level.hole_pos = center;
            level.walls.push(rect(w * 0.5, h * 0.5 - 2.0, 3.0, 0.3));
            level.walls.push(rect(w * 0.5 - 3.0, h * 0.5, 0.3, 2.0));
            level.water.push(rect(w * 0.2, INNER_BOTTOM - 1.5, 2.0, 1.5));
            level.water.push(rect(w * 0.8, INNER_TOP + 1.5, 2.0, 1.5));
            level.moving_water.push(lane(w * 0.3, h * 0.5, 3.5, 2.0, 0.0, 1.0));
            level.moving_water.push(lane(w * 0.7, h * 0.5, 3.5, 1.2, PI * 0.5, -1.0));
        }
        _ => {
            // Level 1 and fallback: open green, one pond out of the way
            level.water.push(rect(5.0, INNER_BOTTOM - 2.0, 2.5, 1.5));
        }
    }

    level
}
