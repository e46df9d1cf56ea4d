//! Game controller
//!
//! Owns the sensor, the conditioner and the physics world, and runs the
//! per-frame pipeline: sensor read -> force -> fixed step -> hazard/win check.
//! The UI polls positions and drains events; nothing here renders or blocks
//! except the calibration sampling window.

use embedded_hal::delay::DelayNs;
use glam::Vec2;

use crate::progress::LevelProgress;
use crate::sensor::{SensorCalibration, TiltSensor};
use crate::settings::Settings;
use crate::sim::{
    Conditioner, LevelConfig, MovingWater, RigidBodyWorld, StepOutcome, WaterHit, evaluate,
    get_level,
};
use crate::ticks_to_secs;

/// Controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No level loaded yet
    Idle,
    Playing,
    /// Stepping suspended (e.g. left to the menu)
    Paused,
    /// Ball holed; terminal until reset or reload
    Won,
}

/// Notifications for the UI layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A step ran; redraw
    StateUpdated,
    /// Ball went in the water and was sent back to the start
    Splash(WaterHit),
    /// Level complete; fired once per attempt
    Won { level: u32, secs: f32, new_best: bool },
}

pub struct Game<S, D> {
    sensor: SensorCalibration<S, D>,
    conditioner: Conditioner,
    world: RigidBodyWorld,
    progress: LevelProgress,
    phase: GamePhase,
    level_id: u32,
    /// Ticks played in the current attempt
    elapsed_ticks: u64,
    events: Vec<GameEvent>,
}

impl<S: TiltSensor, D: DelayNs> Game<S, D> {
    pub fn new(sensor: SensorCalibration<S, D>, settings: &Settings) -> Self {
        Self {
            sensor,
            conditioner: Conditioner::new(settings.orientation),
            world: RigidBodyWorld::new(),
            progress: LevelProgress::new(settings.level_count),
            phase: GamePhase::Idle,
            level_id: 0,
            elapsed_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Build the level and start playing it
    pub fn load_level(&mut self, id: u32) {
        let level = get_level(id);
        self.world.load_level(&level);
        self.conditioner.reset();
        self.level_id = id;
        self.elapsed_ticks = 0;
        self.phase = GamePhase::Playing;
    }

    /// Back to the start of the current level; also leaves `Won`
    pub fn reset(&mut self) {
        if !self.world.is_loaded() {
            return;
        }
        self.world.reset();
        self.conditioner.reset();
        self.elapsed_ticks = 0;
        self.phase = GamePhase::Playing;
        self.notify(GameEvent::StateUpdated);
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    /// Run one fixed step of the pipeline. Returns false if nothing ran.
    pub fn tick(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }

        // A failed read leaves the previous sample in place
        self.sensor.update();
        let reading = self.sensor.calibrated_sample();
        let force = self.conditioner.compute(reading.x, reading.y);

        self.world.step(force);
        self.elapsed_ticks += 1;

        let outcome = match self.world.level() {
            Some(level) => evaluate(self.world.position(), level, self.world.moving_water()),
            None => return false,
        };

        match outcome {
            StepOutcome::Clear => {}
            StepOutcome::Water(hit) => {
                log::debug!("Splash ({:?}) at tick {}", hit, self.elapsed_ticks);
                self.world.reset();
                self.conditioner.reset();
                self.notify(GameEvent::Splash(hit));
            }
            StepOutcome::Holed => {
                let secs = self.elapsed_secs();
                let new_best = self.progress.record_completion(self.level_id, secs);
                self.phase = GamePhase::Won;
                log::info!("Level {} holed in {:.2}s", self.level_id, secs);
                self.notify(GameEvent::Won {
                    level: self.level_id,
                    secs,
                    new_best,
                });
            }
        }

        self.notify(GameEvent::StateUpdated);
        true
    }

    /// Immediate, permanent (in-memory) calibration
    pub fn calibrate_now(&mut self) -> bool {
        self.sensor.calibrate_now()
    }

    /// Start a live calibration preview. With `reset_ball`, the ball waits
    /// at the start so the player can hold the board level.
    pub fn start_preview(&mut self, reset_ball: bool) -> bool {
        let ok = self.sensor.start_preview();
        if reset_ball && self.world.is_loaded() {
            self.world.reset();
            self.conditioner.reset();
            self.notify(GameEvent::StateUpdated);
        }
        ok
    }

    pub fn commit_preview(&mut self) -> bool {
        self.sensor.commit_preview()
    }

    pub fn cancel_preview(&mut self) -> bool {
        self.sensor.cancel_preview()
    }

    /// Pending notifications, oldest first. Back-to-back `StateUpdated`
    /// entries are merged, so a caller that only drains now and then sees
    /// one redraw request per run of steps.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn notify(&mut self, event: GameEvent) {
        if event == GameEvent::StateUpdated && self.events.last() == Some(&GameEvent::StateUpdated)
        {
            return;
        }
        self.events.push(event);
    }

    pub fn ball_position(&self) -> Vec2 {
        self.world.position()
    }

    pub fn ball_angle(&self) -> f32 {
        self.world.angle()
    }

    pub fn level(&self) -> Option<&LevelConfig> {
        self.world.level()
    }

    pub fn moving_water(&self) -> &[MovingWater] {
        self.world.moving_water()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn level_id(&self) -> u32 {
        self.level_id
    }

    pub fn elapsed_secs(&self) -> f32 {
        ticks_to_secs(self.elapsed_ticks)
    }

    pub fn progress(&self) -> &LevelProgress {
        &self.progress
    }

    pub fn sensor(&self) -> &SensorCalibration<S, D> {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut SensorCalibration<S, D> {
        &mut self.sensor
    }

    pub fn conditioner(&self) -> &Conditioner {
        &self.conditioner
    }
}
