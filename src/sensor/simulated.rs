//! Seeded simulated magnetometer
//!
//! Stands in for the board when no bus is present: a fixed tilt offset plus
//! bounded uniform noise, reproducible from the seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{RawSample, SensorError, TiltSensor};

pub struct SimulatedSensor {
    rng: Pcg32,
    /// Field reading with the board held level
    pub baseline: RawSample,
    /// Offset added by the current tilt (x, y)
    pub tilt: (i16, i16),
    /// Peak noise amplitude per axis
    pub noise: i16,
    /// Force every read to fail (unplugged cable)
    pub failing: bool,
}

impl SimulatedSensor {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            baseline: RawSample::default(),
            tilt: (0, 0),
            noise: 0,
            failing: false,
        }
    }

    pub fn with_baseline(mut self, baseline: RawSample) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_noise(mut self, noise: i16) -> Self {
        self.noise = noise.max(0);
        self
    }

    pub fn set_tilt(&mut self, x: i16, y: i16) {
        self.tilt = (x, y);
    }

    fn jitter(&mut self) -> i16 {
        if self.noise == 0 {
            0
        } else {
            self.rng.random_range(-self.noise..=self.noise)
        }
    }
}

impl TiltSensor for SimulatedSensor {
    fn read(&mut self) -> Result<RawSample, SensorError> {
        if self.failing {
            return Err(SensorError::Bus(embedded_hal::i2c::ErrorKind::Bus));
        }
        let (jx, jy, jz) = (self.jitter(), self.jitter(), self.jitter());
        Ok(RawSample {
            x: self.baseline.x.saturating_add(self.tilt.0).saturating_add(jx),
            y: self.baseline.y.saturating_add(self.tilt.1).saturating_add(jy),
            z: self.baseline.z.saturating_add(jz),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_readings() {
        let mut a = SimulatedSensor::new(7).with_noise(20);
        let mut b = SimulatedSensor::new(7).with_noise(20);
        for _ in 0..50 {
            assert_eq!(a.read(), b.read());
        }
    }

    #[test]
    fn test_noise_is_bounded() {
        let mut sensor = SimulatedSensor::new(1)
            .with_baseline(RawSample::new(100, -50, 400))
            .with_noise(5);
        sensor.set_tilt(10, 0);
        for _ in 0..200 {
            let s = sensor.read().unwrap();
            assert!((s.x - 110).abs() <= 5);
            assert!((s.y + 50).abs() <= 5);
            assert!((s.z - 400).abs() <= 5);
        }
    }

    #[test]
    fn test_failing_sensor_reports_bus_error() {
        let mut sensor = SimulatedSensor::new(0);
        sensor.failing = true;
        assert!(matches!(sensor.read(), Err(SensorError::Bus(_))));
    }
}
