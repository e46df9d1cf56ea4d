//! Deterministic simulation module
//!
//! Everything between a calibrated sensor reading and "ball is in the water /
//! in the hole" lives here:
//! - Fixed timestep only
//! - No sensor, rendering or platform dependencies
//! - Level geometry is pure data

pub mod conditioner;
pub mod hazard;
pub mod level;
pub mod world;

pub use conditioner::{Conditioner, condition, scale_with_deadzone, smooth};
pub use hazard::{StepOutcome, WaterHit, evaluate, find_water, is_holed};
pub use level::{LevelConfig, MovingWater, MovingWaterDef, Rect, get_level};
pub use world::RigidBodyWorld;
