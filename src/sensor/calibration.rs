//! Hard-iron bias calibration with live preview
//!
//! Two bias triplets are kept in memory only:
//! - `saved`: survives preview cycles, reset to zero on restart
//! - `temp`: a delta applied only while a preview is active
//!
//! Every calibrated read is `raw - saved - temp`, so the preview is visible
//! through the normal read path without special casing.

use embedded_hal::delay::DelayNs;
use serde::{Deserialize, Serialize};

use super::{Axis, RawSample, TiltSensor};
use crate::consts::{CALIBRATION_SAMPLE_DELAY_MS, CALIBRATION_SAMPLES};

/// Per-axis bias accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bias {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Bias {
    pub const ZERO: Bias = Bias { x: 0, y: 0, z: 0 };

    pub fn axis(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    fn wrapping_add(self, other: Bias) -> Bias {
        Bias {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
            z: self.z.wrapping_add(other.z),
        }
    }

    fn wrapping_sub(self, other: Bias) -> Bias {
        Bias {
            x: self.x.wrapping_sub(other.x),
            y: self.y.wrapping_sub(other.y),
            z: self.z.wrapping_sub(other.z),
        }
    }
}

/// Blocking delay backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}

/// Sensor handle plus the bias state applied to its readings
pub struct SensorCalibration<S, D> {
    sensor: Option<S>,
    delay: D,
    raw: RawSample,
    saved: Bias,
    temp: Bias,
    preview_active: bool,
}

impl<S: TiltSensor, D: DelayNs> SensorCalibration<S, D> {
    /// Wrap an initialized sensor
    pub fn new(sensor: S, delay: D) -> Self {
        Self::with_sensor(Some(sensor), delay)
    }

    /// No transport available: every operation reports failure
    pub fn disconnected(delay: D) -> Self {
        Self::with_sensor(None, delay)
    }

    fn with_sensor(sensor: Option<S>, delay: D) -> Self {
        Self {
            sensor,
            delay,
            raw: RawSample::default(),
            saved: Bias::ZERO,
            temp: Bias::ZERO,
            preview_active: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.sensor.is_some()
    }

    pub fn sensor_mut(&mut self) -> Option<&mut S> {
        self.sensor.as_mut()
    }

    /// Poll the sensor once. On failure the previous sample is kept.
    pub fn update(&mut self) -> bool {
        let Some(sensor) = self.sensor.as_mut() else {
            return false;
        };
        match sensor.read() {
            Ok(sample) => {
                self.raw = sample;
                true
            }
            Err(e) => {
                log::warn!("Sensor read failed, keeping stale sample: {}", e);
                false
            }
        }
    }

    /// Latest raw sample
    pub fn raw(&self) -> RawSample {
        self.raw
    }

    pub fn saved_bias(&self) -> Bias {
        self.saved
    }

    pub fn temp_bias(&self) -> Bias {
        self.temp
    }

    pub fn preview_active(&self) -> bool {
        self.preview_active
    }

    /// `raw - saved - temp` for one axis, saturated to the i16 range
    pub fn calibrated(&self, axis: Axis) -> i16 {
        let value = i64::from(self.raw.axis(axis))
            - i64::from(self.saved.axis(axis))
            - i64::from(self.temp.axis(axis));
        value.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
    }

    /// All three calibrated axes
    pub fn calibrated_sample(&self) -> RawSample {
        RawSample::new(
            self.calibrated(Axis::X),
            self.calibrated(Axis::Y),
            self.calibrated(Axis::Z),
        )
    }

    /// Destructive calibration: `saved = mean`, `temp = 0`.
    pub fn calibrate_now(&mut self) -> bool {
        match self.sample_mean() {
            Some(mean) => {
                self.saved = mean;
                self.temp = Bias::ZERO;
                self.preview_active = false;
                log::info!("Sensor calibrated, bias = {:?}", mean);
                true
            }
            None => {
                log::warn!("Sensor calibration failed");
                false
            }
        }
    }

    /// Sample a new bias but keep it as a delta on top of `saved`.
    pub fn start_preview(&mut self) -> bool {
        match self.sample_mean() {
            Some(mean) => {
                self.temp = mean.wrapping_sub(self.saved);
                self.preview_active = true;
                log::info!("Calibration preview started, delta = {:?}", self.temp);
                true
            }
            None => {
                log::warn!("Calibration preview failed to sample");
                false
            }
        }
    }

    /// Merge the preview delta into the saved bias.
    pub fn commit_preview(&mut self) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.saved = self.saved.wrapping_add(self.temp);
        self.temp = Bias::ZERO;
        self.preview_active = false;
        log::info!("Calibration preview committed, bias = {:?}", self.saved);
        true
    }

    /// Discard the preview delta; `saved` is untouched. The delta is cleared
    /// either way, but a missing sensor still reports failure.
    pub fn cancel_preview(&mut self) -> bool {
        self.temp = Bias::ZERO;
        self.preview_active = false;
        self.is_connected()
    }

    /// Average `CALIBRATION_SAMPLES` consecutive reads, pausing between them.
    /// Any failed read aborts the whole window.
    fn sample_mean(&mut self) -> Option<Bias> {
        let sensor = self.sensor.as_mut()?;
        let mut sum = [0i64; 3];
        for i in 0..CALIBRATION_SAMPLES {
            if i > 0 {
                self.delay.delay_ms(CALIBRATION_SAMPLE_DELAY_MS);
            }
            let sample = match sensor.read() {
                Ok(sample) => sample,
                Err(e) => {
                    log::warn!("Calibration sample {} failed: {}", i, e);
                    return None;
                }
            };
            self.raw = sample;
            sum[0] += i64::from(sample.x);
            sum[1] += i64::from(sample.y);
            sum[2] += i64::from(sample.z);
        }
        let n = i64::from(CALIBRATION_SAMPLES);
        Some(Bias {
            x: (sum[0] / n) as i32,
            y: (sum[1] / n) as i32,
            z: (sum[2] / n) as i32,
        })
    }
}
