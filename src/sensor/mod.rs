//! Tilt sensor input
//!
//! The game only needs one capability from the hardware: read a triplet of
//! signed 16-bit axis values. Everything above that (bias, preview, smoothing)
//! is ours.

pub mod calibration;
pub mod lsm303;
pub mod simulated;

pub use calibration::{Bias, SensorCalibration, StdDelay};
pub use lsm303::Lsm303Magnetometer;
pub use simulated::SimulatedSensor;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One raw sensor read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawSample {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    pub fn axis(&self, axis: Axis) -> i16 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Sensor axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// Sensor transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorError {
    /// Bus transfer failed (open, addressing, short read/write)
    #[error("sensor bus error: {0:?}")]
    Bus(embedded_hal::i2c::ErrorKind),
    /// Transport was never opened or initialization failed
    #[error("sensor not connected")]
    NotConnected,
}

/// Minimal capability consumed by the calibration layer
pub trait TiltSensor {
    /// Blocking read of one raw axis triplet
    fn read(&mut self) -> Result<RawSample, SensorError>;
}

impl<T: TiltSensor + ?Sized> TiltSensor for Box<T> {
    fn read(&mut self) -> Result<RawSample, SensorError> {
        (**self).read()
    }
}
