//! LSM303DLHC magnetometer over I2C
//!
//! Only the magnetometer half of the chip is used. Output registers are
//! big-endian and ordered X, Z, Y.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};

use super::{RawSample, SensorCalibration, SensorError, TiltSensor};

/// Magnetometer I2C address
pub const MAG_ADDRESS: u8 = 0x1E;

/// Register addresses
pub mod registers {
    pub const CRA_REG_M: u8 = 0x00;
    pub const CRB_REG_M: u8 = 0x01;
    pub const MR_REG_M: u8 = 0x02;
    pub const OUT_X_H_M: u8 = 0x03;
}

/// 15 Hz output rate
const CRA_15HZ: u8 = 0x10;
/// +-1.3 gauss gain
const CRB_GAIN: u8 = 0x20;
/// Continuous conversion
const MR_CONTINUOUS: u8 = 0x00;

pub struct Lsm303Magnetometer<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Lsm303Magnetometer<I2C> {
    /// Create a driver with the default address (0x1E)
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, MAG_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Configure rate, gain and continuous mode
    pub fn init(&mut self) -> Result<(), SensorError> {
        self.write_reg(registers::CRA_REG_M, CRA_15HZ)?;
        self.write_reg(registers::CRB_REG_M, CRB_GAIN)?;
        self.write_reg(registers::MR_REG_M, MR_CONTINUOUS)?;
        log::info!("LSM303 magnetometer initialized at {:#04x}", self.address);
        Ok(())
    }

    /// Consume the driver and return the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|e| SensorError::Bus(e.kind()))
    }
}

impl<I2C: I2c> TiltSensor for Lsm303Magnetometer<I2C> {
    fn read(&mut self) -> Result<RawSample, SensorError> {
        let mut data = [0u8; 6];
        self.i2c
            .write_read(self.address, &[registers::OUT_X_H_M], &mut data)
            .map_err(|e| SensorError::Bus(e.kind()))?;
        Ok(RawSample {
            x: i16::from_be_bytes([data[0], data[1]]),
            z: i16::from_be_bytes([data[2], data[3]]),
            y: i16::from_be_bytes([data[4], data[5]]),
        })
    }
}

/// Initialize the magnetometer on `i2c` and wrap it for calibration.
/// If initialization fails the game keeps running without a sensor.
pub fn connect<I2C: I2c, D: DelayNs>(
    i2c: I2C,
    delay: D,
) -> SensorCalibration<Lsm303Magnetometer<I2C>, D> {
    let mut mag = Lsm303Magnetometer::new(i2c);
    match mag.init() {
        Ok(()) => SensorCalibration::new(mag, delay),
        Err(e) => {
            log::warn!("Magnetometer init failed, running without sensor: {}", e);
            SensorCalibration::disconnected(delay)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::StdDelay;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};
    use std::collections::HashMap;

    /// Register-file bus mock: writes set registers, reads auto-increment
    #[derive(Default)]
    struct MockBus {
        registers: HashMap<u8, u8>,
        pointer: u8,
        writes: Vec<(u8, Vec<u8>)>,
        fail: bool,
    }

    impl ErrorType for MockBus {
        type Error = ErrorKind;
    }

    impl I2c for MockBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Bus);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        self.writes.push((address, bytes.to_vec()));
                        if let Some((&reg, rest)) = bytes.split_first() {
                            self.pointer = reg;
                            for (i, &b) in rest.iter().enumerate() {
                                self.registers.insert(reg + i as u8, b);
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        for byte in buf.iter_mut() {
                            *byte = self.registers.get(&self.pointer).copied().unwrap_or(0);
                            self.pointer = self.pointer.wrapping_add(1);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_init_writes_configuration() {
        let mut mag = Lsm303Magnetometer::new(MockBus::default());
        mag.init().unwrap();
        let bus = mag.release();
        assert_eq!(
            bus.writes,
            vec![
                (MAG_ADDRESS, vec![registers::CRA_REG_M, 0x10]),
                (MAG_ADDRESS, vec![registers::CRB_REG_M, 0x20]),
                (MAG_ADDRESS, vec![registers::MR_REG_M, 0x00]),
            ]
        );
    }

    #[test]
    fn test_read_decodes_xzy_big_endian() {
        let mut bus = MockBus::default();
        // X = 0x0102, Z = -2 (0xFFFE), Y = 0x7FFF
        for (i, b) in [0x01, 0x02, 0xFF, 0xFE, 0x7F, 0xFF].into_iter().enumerate() {
            bus.registers.insert(registers::OUT_X_H_M + i as u8, b);
        }
        let mut mag = Lsm303Magnetometer::new(bus);
        let sample = mag.read().unwrap();
        assert_eq!(sample, RawSample::new(0x0102, 0x7FFF, -2));
    }

    #[test]
    fn test_bus_failure_maps_to_sensor_error() {
        let bus = MockBus {
            fail: true,
            ..Default::default()
        };
        let mut mag = Lsm303Magnetometer::new(bus);
        assert_eq!(mag.read(), Err(SensorError::Bus(ErrorKind::Bus)));
        assert_eq!(mag.init(), Err(SensorError::Bus(ErrorKind::Bus)));
    }

    #[test]
    fn test_connect_initializes_and_reads() {
        let mut bus = MockBus::default();
        for (i, b) in [0x00, 0x0A, 0x00, 0x01, 0xFF, 0xF6].into_iter().enumerate() {
            bus.registers.insert(registers::OUT_X_H_M + i as u8, b);
        }
        let mut cal = connect(bus, StdDelay);
        assert!(cal.is_connected());
        assert!(cal.update());
        assert_eq!(cal.raw(), RawSample::new(10, -10, 1));
    }

    #[test]
    fn test_connect_falls_back_to_disconnected() {
        let bus = MockBus {
            fail: true,
            ..Default::default()
        };
        let mut cal = connect(bus, StdDelay);
        assert!(!cal.is_connected());
        assert!(!cal.update());
        assert!(!cal.calibrate_now());
        assert!(!cal.start_preview());
        assert!(!cal.commit_preview());
        assert!(!cal.cancel_preview());
    }
}
