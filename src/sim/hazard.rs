//! Post-step hazard and win checks
//!
//! Water uses center-point containment, not circle/rectangle overlap: a ball
//! hanging over the edge of a pond is safe until its center crosses the edge.
//! Rectangle edges count as inside.

use glam::Vec2;

use super::level::{LevelConfig, MovingWater};
use crate::consts::WIN_RADIUS_FACTOR;

/// Which water region caught the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterHit {
    Static(usize),
    Moving(usize),
}

/// Result of evaluating one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Clear,
    /// Ball center is in water; the ball must go back to the start
    Water(WaterHit),
    /// Ball center is well inside the hole
    Holed,
}

/// First water region containing `ball`: static water first, then moving
pub fn find_water(ball: Vec2, level: &LevelConfig, moving: &[MovingWater]) -> Option<WaterHit> {
    if let Some(i) = level.water.iter().position(|r| r.contains_point(ball)) {
        return Some(WaterHit::Static(i));
    }
    moving
        .iter()
        .position(|m| m.rect().contains_point(ball))
        .map(WaterHit::Moving)
}

/// Strictly closer than half the hole radius
pub fn is_holed(ball: Vec2, hole_pos: Vec2, hole_radius: f32) -> bool {
    ball.distance(hole_pos) < hole_radius * WIN_RADIUS_FACTOR
}

/// Water takes precedence: at most one reset per step, and a ball sent back
/// to the start cannot also be in the hole.
pub fn evaluate(ball: Vec2, level: &LevelConfig, moving: &[MovingWater]) -> StepOutcome {
    if let Some(hit) = find_water(ball, level, moving) {
        return StepOutcome::Water(hit);
    }
    if is_holed(ball, level.hole_pos, level.hole_radius) {
        return StepOutcome::Holed;
    }
    StepOutcome::Clear
}
