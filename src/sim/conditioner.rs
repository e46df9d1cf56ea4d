//! Calibrated sensor reading -> world force
//!
//! Fixed order: axis swap, sign inversion, sensitivity scale, deadzone,
//! single-pole low-pass. The filter history must be cleared whenever the
//! ball is repositioned.

use glam::Vec2;

use crate::consts::{FORCE_DEADZONE, FORCE_SENSITIVITY, SMOOTHING_ALPHA};
use crate::settings::Orientation;

/// Steps 1-4: remap, invert, scale, deadzone. No filter state involved.
pub fn scale_with_deadzone(x: i16, y: i16, orientation: &Orientation) -> Vec2 {
    let (mut x, mut y) = (f32::from(x), f32::from(y));
    if orientation.swap_axes {
        std::mem::swap(&mut x, &mut y);
    }
    if orientation.invert_x {
        x = -x;
    }
    if orientation.invert_y {
        y = -y;
    }
    let scaled = Vec2::new(x, y) * FORCE_SENSITIVITY;
    Vec2::new(deadzone(scaled.x), deadzone(scaled.y))
}

#[inline]
fn deadzone(v: f32) -> f32 {
    if v.abs() < FORCE_DEADZONE { 0.0 } else { v }
}

/// Single-pole exponential smoothing toward `target`
#[inline]
pub fn smooth(prev: Vec2, target: Vec2, alpha: f32) -> Vec2 {
    prev + (target - prev) * alpha
}

/// Pure conditioning step: returns the force to apply, which is also the
/// next filter state.
pub fn condition(x: i16, y: i16, prev: Vec2, orientation: &Orientation) -> Vec2 {
    smooth(prev, scale_with_deadzone(x, y, orientation), SMOOTHING_ALPHA)
}

/// Conditioner with its retained filter state
#[derive(Debug, Clone, Default)]
pub struct Conditioner {
    pub orientation: Orientation,
    prev_force: Vec2,
}

impl Conditioner {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            prev_force: Vec2::ZERO,
        }
    }

    /// Condition one calibrated (x, y) reading into a force
    pub fn compute(&mut self, x: i16, y: i16) -> Vec2 {
        self.prev_force = condition(x, y, self.prev_force, &self.orientation);
        self.prev_force
    }

    /// Drop smoothing history (ball was repositioned)
    pub fn reset(&mut self) {
        self.prev_force = Vec2::ZERO;
    }

    pub fn prev_force(&self) -> Vec2 {
        self.prev_force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_deadzone_zeroes_small_components() {
        let o = Orientation::default();
        // 9 * 0.05 = 0.45 < 0.5
        assert_eq!(scale_with_deadzone(9, -9, &o), Vec2::ZERO);
        // 10 * 0.05 = 0.5 is not below the threshold
        assert_eq!(scale_with_deadzone(10, -10, &o), Vec2::new(0.5, -0.5));
        // Components are independent
        assert_eq!(scale_with_deadzone(200, 3, &o), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_swap_happens_before_inversion() {
        let o = Orientation {
            swap_axes: true,
            invert_x: true,
            invert_y: false,
        };
        // swap -> (40, 100), invert x -> (-40, 100)
        assert_eq!(scale_with_deadzone(100, 40, &o), Vec2::new(-2.0, 5.0));
    }

    #[test]
    fn test_first_step_is_alpha_fraction() {
        let mut c = Conditioner::default();
        let f = c.compute(100, 0);
        assert!((f.x - 5.0 * SMOOTHING_ALPHA).abs() < 1e-6);
        assert_eq!(f.y, 0.0);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut c = Conditioner::default();
        for _ in 0..30 {
            c.compute(200, 200);
        }
        c.reset();
        assert_eq!(c.prev_force(), Vec2::ZERO);
        let f = c.compute(0, 0);
        assert_eq!(f, Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn prop_smoothing_converges_without_overshoot(x in any::<i16>(), y in any::<i16>()) {
            let o = Orientation::default();
            let target = scale_with_deadzone(x, y, &o);
            let mut c = Conditioner::new(o);
            let mut last_err = target.abs();
            for _ in 0..200 {
                let f = c.compute(x, y);
                let err = (target - f).abs();
                // Never past the target, never moving away from it
                prop_assert!(f.x.abs() <= target.x.abs() + 1e-3);
                prop_assert!(f.y.abs() <= target.y.abs() + 1e-3);
                prop_assert!(f.x * target.x >= 0.0 && f.y * target.y >= 0.0);
                prop_assert!(err.x <= last_err.x + 1e-3 && err.y <= last_err.y + 1e-3);
                last_err = err;
            }
            prop_assert!((target - c.prev_force()).length() < 1e-2);
        }
    }
}
