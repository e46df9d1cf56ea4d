//! Rigid body world for one level
//!
//! Static walls plus a single dynamic ball, zero gravity (the table is seen
//! from above; tilt is applied as a force). The whole rapier world is rebuilt
//! on every level load. Before a level is loaded every operation is a no-op.

use glam::Vec2;
use rapier2d::prelude::*;

use super::level::{LevelConfig, MovingWater};
use crate::consts::*;

/// Everything that lives and dies with one loaded level
struct Scene {
    level: LevelConfig,
    moving_water: Vec<MovingWater>,
    ball: RigidBodyHandle,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    integration_params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
}

impl Scene {
    fn build(level: &LevelConfig) -> Self {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for wall in &level.walls {
            let body = RigidBodyBuilder::fixed()
                .translation(vector![wall.center.x, wall.center.y])
                .build();
            let handle = bodies.insert(body);
            let collider = ColliderBuilder::cuboid(wall.half_extents.x, wall.half_extents.y)
                .density(0.0)
                .friction(WALL_FRICTION)
                .restitution(WALL_RESTITUTION)
                .build();
            colliders.insert_with_parent(collider, handle, &mut bodies);
        }

        let ball_body = RigidBodyBuilder::dynamic()
            .translation(vector![level.ball_start.x, level.ball_start.y])
            .linear_damping(BALL_LINEAR_DAMPING)
            .angular_damping(BALL_ANGULAR_DAMPING)
            .ccd_enabled(true)
            .build();
        let ball = bodies.insert(ball_body);
        let ball_collider = ColliderBuilder::ball(BALL_RADIUS)
            .density(BALL_DENSITY)
            .friction(BALL_FRICTION)
            .restitution(BALL_RESTITUTION)
            .build();
        colliders.insert_with_parent(ball_collider, ball, &mut bodies);

        let mut integration_params = IntegrationParameters::default();
        integration_params.dt = TIME_STEP;

        Self {
            level: level.clone(),
            moving_water: level.spawn_moving_water(),
            ball,
            bodies,
            colliders,
            integration_params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
        }
    }

    fn ball(&self) -> Option<&RigidBody> {
        self.bodies.get(self.ball)
    }

    fn ball_mut(&mut self) -> Option<&mut RigidBody> {
        self.bodies.get_mut(self.ball)
    }
}

/// Physics world; holds at most one loaded level at a time
#[derive(Default)]
pub struct RigidBodyWorld {
    scene: Option<Scene>,
    steps: u64,
}

impl RigidBodyWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous world and build a fresh one for `level`
    pub fn load_level(&mut self, level: &LevelConfig) {
        // Old bodies go before the new ones are built
        self.scene = None;
        self.scene = Some(Scene::build(level));
        self.steps = 0;
        log::info!(
            "Level {} loaded: {} walls, {} water, {} moving water",
            level.id,
            level.walls.len(),
            level.water.len(),
            level.moving_water.len()
        );
    }

    pub fn is_loaded(&self) -> bool {
        self.scene.is_some()
    }

    /// Apply `force` to the ball for one fixed timestep, then advance the
    /// moving water by the same timestep.
    pub fn step(&mut self, force: Vec2) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };

        if let Some(ball) = scene.ball_mut() {
            ball.reset_forces(false);
            ball.add_force(vector![force.x, force.y], force != Vec2::ZERO);
        }

        scene.pipeline.step(
            &vector![0.0, 0.0],
            &scene.integration_params,
            &mut scene.islands,
            &mut scene.broad_phase,
            &mut scene.narrow_phase,
            &mut scene.bodies,
            &mut scene.colliders,
            &mut scene.impulse_joints,
            &mut scene.multibody_joints,
            &mut scene.ccd,
            None,
            &(),
            &(),
        );

        for water in &mut scene.moving_water {
            water.advance(TIME_STEP);
        }
        self.steps += 1;
    }

    /// Teleport the ball to the level start, at rest
    pub fn reset(&mut self) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let start = scene.level.ball_start;
        if let Some(ball) = scene.ball_mut() {
            ball.reset_forces(false);
            ball.set_position(Isometry::translation(start.x, start.y), true);
            ball.set_linvel(vector![0.0, 0.0], true);
            ball.set_angvel(0.0, true);
            ball.wake_up(true);
        }
        log::debug!("Ball reset to ({:.2}, {:.2})", start.x, start.y);
    }

    /// Ball center in meters (origin when nothing is loaded)
    pub fn position(&self) -> Vec2 {
        self.scene
            .as_ref()
            .and_then(Scene::ball)
            .map(|b| Vec2::new(b.translation().x, b.translation().y))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn angle(&self) -> f32 {
        self.scene
            .as_ref()
            .and_then(Scene::ball)
            .map(|b| b.rotation().angle())
            .unwrap_or(0.0)
    }

    pub fn velocity(&self) -> Vec2 {
        self.scene
            .as_ref()
            .and_then(Scene::ball)
            .map(|b| Vec2::new(b.linvel().x, b.linvel().y))
            .unwrap_or(Vec2::ZERO)
    }

    /// Level the world was built from
    pub fn level(&self) -> Option<&LevelConfig> {
        self.scene.as_ref().map(|s| &s.level)
    }

    /// Current runtime state of the moving water
    pub fn moving_water(&self) -> &[MovingWater] {
        self.scene
            .as_ref()
            .map(|s| s.moving_water.as_slice())
            .unwrap_or(&[])
    }

    /// Fixed steps taken since the last load
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::get_level;

    #[test]
    fn test_unloaded_world_is_inert() {
        let mut world = RigidBodyWorld::new();
        world.step(Vec2::new(10.0, 10.0));
        world.reset();
        assert!(!world.is_loaded());
        assert_eq!(world.position(), Vec2::ZERO);
        assert_eq!(world.angle(), 0.0);
        assert!(world.moving_water().is_empty());
        assert_eq!(world.steps(), 0);
    }

    #[test]
    fn test_ball_starts_at_level_start() {
        let level = get_level(2);
        let mut world = RigidBodyWorld::new();
        world.load_level(&level);
        assert_eq!(world.position(), level.ball_start);
    }

    #[test]
    fn test_ball_at_rest_without_force() {
        let level = get_level(1);
        let mut world = RigidBodyWorld::new();
        world.load_level(&level);
        for _ in 0..1000 {
            world.step(Vec2::ZERO);
        }
        assert!(world.position().distance(level.ball_start) < 1e-4);
    }

    #[test]
    fn test_force_moves_ball_and_reset_restores() {
        let level = get_level(1);
        let mut world = RigidBodyWorld::new();
        world.load_level(&level);
        for _ in 0..60 {
            world.step(Vec2::new(-5.0, 0.0));
        }
        assert!(world.position().x < level.ball_start.x - 0.5);
        assert!(world.velocity().x < 0.0);

        world.reset();
        assert_eq!(world.position(), level.ball_start);
        assert_eq!(world.velocity(), Vec2::ZERO);
        assert_eq!(world.angle(), 0.0);
    }

    #[test]
    fn test_walls_contain_ball() {
        let level = get_level(1);
        let mut world = RigidBodyWorld::new();
        world.load_level(&level);
        // Push hard into the right wall for a few seconds
        for _ in 0..300 {
            world.step(Vec2::new(50.0, 0.0));
        }
        let inner_right = level.width - 2.0 * WALL_HALF_THICKNESS;
        assert!(world.position().x <= inner_right - BALL_RADIUS + 0.05);
    }

    #[test]
    fn test_step_advances_moving_water() {
        let level = get_level(4);
        let mut world = RigidBodyWorld::new();
        world.load_level(&level);
        let before = world.moving_water()[0].position;
        for _ in 0..30 {
            world.step(Vec2::ZERO);
        }
        let after = world.moving_water()[0];
        assert!((after.phase - (level.moving_water[0].phase + 30.0 * after.def.speed * TIME_STEP)).abs() < 1e-4);
        assert_ne!(after.position, before);
        assert_eq!(after.position.x, before.x);
    }

    #[test]
    fn test_reload_replaces_world() {
        let mut world = RigidBodyWorld::new();
        world.load_level(&get_level(1));
        for _ in 0..10 {
            world.step(Vec2::new(-5.0, 5.0));
        }
        let level = get_level(2);
        world.load_level(&level);
        assert_eq!(world.steps(), 0);
        assert_eq!(world.position(), level.ball_start);
        assert_eq!(world.level().map(|l| l.id), Some(2));
    }
}
