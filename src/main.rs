//! Tilt Golf headless runner
//!
//! Drives the game core without the touchscreen. By default a simulated
//! magnetometer is steered toward the hole; with `--hardware` the LSM303 on
//! the configured I2C bus is read in real time instead.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;

use tilt_golf::consts::TIME_STEP;
use tilt_golf::sensor::{RawSample, SensorCalibration, SimulatedSensor, StdDelay, TiltSensor};
use tilt_golf::sim::get_level;
use tilt_golf::{Game, GameEvent, GamePhase, Orientation, Settings};

/// Raw units of tilt the autopilot leans with
const AUTOPILOT_TILT: f32 = 120.0;

#[derive(Parser)]
#[command(name = "tilt-golf", about = "Tilt Golf headless runner")]
struct Cli {
    /// Level to play
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Maximum fixed steps to simulate
    #[arg(long, default_value_t = 3600)]
    steps: u32,
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the level layout as JSON and exit
    #[arg(long)]
    dump_level: bool,
    /// Simulated sensor seed
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Simulated sensor noise amplitude (raw units)
    #[arg(long, default_value_t = 3)]
    noise: i16,
    /// Read the LSM303 on the configured I2C bus instead of simulating
    #[arg(long)]
    hardware: bool,
}

/// Raw (x, y) tilt that the conditioner maps onto world direction `dir`
fn tilt_for(dir: Vec2, orientation: &Orientation) -> (i16, i16) {
    let mut v = dir.normalize_or_zero() * AUTOPILOT_TILT;
    if orientation.invert_x {
        v.x = -v.x;
    }
    if orientation.invert_y {
        v.y = -v.y;
    }
    if orientation.swap_axes {
        v = Vec2::new(v.y, v.x);
    }
    (v.x.round() as i16, v.y.round() as i16)
}

/// Open the magnetometer on `bus`; without one the game still runs, it
/// just never sees any tilt.
#[cfg(target_os = "linux")]
fn open_hardware(bus: &str) -> SensorCalibration<impl TiltSensor, StdDelay> {
    use tilt_golf::sensor::lsm303;

    match linux_embedded_hal::I2cdev::new(bus) {
        Ok(i2c) => lsm303::connect(i2c, StdDelay),
        Err(e) => {
            log::warn!("Cannot open {}: {}, running without sensor", bus, e);
            SensorCalibration::disconnected(StdDelay)
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn open_hardware(bus: &str) -> SensorCalibration<SimulatedSensor, StdDelay> {
    log::warn!("No I2C support on this platform ({}), running without sensor", bus);
    SensorCalibration::disconnected(StdDelay)
}

/// Step `game` until it is won or `steps` run out. `steer` runs before each
/// tick; `realtime` paces ticks at the fixed timestep.
fn play<S: TiltSensor>(
    game: &mut Game<S, StdDelay>,
    steps: u32,
    realtime: bool,
    mut steer: impl FnMut(&mut Game<S, StdDelay>),
) {
    for _ in 0..steps {
        steer(game);
        game.tick();
        for event in game.drain_events() {
            match event {
                GameEvent::StateUpdated => {}
                GameEvent::Splash(hit) => log::info!("Splash: {:?}", hit),
                GameEvent::Won { level, secs, .. } => {
                    log::info!("Level {} complete in {:.2}s", level, secs)
                }
            }
        }
        if game.phase() == GamePhase::Won {
            break;
        }
        if realtime {
            std::thread::sleep(std::time::Duration::from_secs_f32(TIME_STEP));
        }
    }
}

fn report<S: TiltSensor>(game: &Game<S, StdDelay>, steps: u32) {
    let pos = game.ball_position();
    match game.phase() {
        GamePhase::Won => println!(
            "Level {} holed in {:.2}s",
            game.level_id(),
            game.elapsed_secs()
        ),
        _ => println!(
            "Level {} not holed after {:.1}s, ball at ({:.2}, {:.2})",
            game.level_id(),
            steps as f32 * TIME_STEP,
            pos.x,
            pos.y
        ),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.dump_level {
        println!("{}", serde_json::to_string_pretty(&get_level(cli.level))?);
        return Ok(());
    }

    let settings = cli
        .config
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();

    if cli.hardware {
        let mut game = Game::new(open_hardware(&settings.i2c_bus), &settings);
        start_level(&mut game, cli.level);
        play(&mut game, cli.steps, true, |_| {});
        report(&game, cli.steps);
        return Ok(());
    }

    // Earth's field with the board held level
    let sensor = SimulatedSensor::new(cli.seed)
        .with_baseline(RawSample::new(220, -140, 410))
        .with_noise(cli.noise);
    let mut game = Game::new(SensorCalibration::new(sensor, StdDelay), &settings);
    start_level(&mut game, cli.level);

    let orientation = settings.orientation;
    play(&mut game, cli.steps, false, |game| {
        let Some(target) = game.level().map(|l| l.hole_pos - game.ball_position()) else {
            return;
        };
        let (tx, ty) = tilt_for(target, &orientation);
        if let Some(sensor) = game.sensor_mut().sensor_mut() {
            sensor.set_tilt(tx, ty);
        }
    });
    report(&game, cli.steps);
    Ok(())
}

/// Load `level` and zero the sensor with the board held level
fn start_level<S: TiltSensor>(game: &mut Game<S, StdDelay>, level: u32) {
    if !game.progress().is_valid_level(level) {
        log::warn!(
            "Level {} out of range 1..={}, playing level 1 layout",
            level,
            game.progress().level_count()
        );
    }
    game.load_level(level);
    if !game.calibrate_now() {
        log::warn!("Calibration failed, playing uncalibrated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tilt_for_inverts_conditioner_mapping() {
        let orientation = Orientation {
            swap_axes: true,
            invert_x: true,
            invert_y: false,
        };
        let (x, y) = tilt_for(Vec2::new(1.0, 0.0), &orientation);
        let force = tilt_golf::sim::scale_with_deadzone(x, y, &orientation);
        assert!(force.x > 0.0);
        assert_eq!(force.y, 0.0);
    }
}
