//! Holonomic pitch constraint
//!
//! Both wheels touch flat ground only for one rear-frame pitch θ given the
//! roll φ and steer δ. With
//!
//! ```text
//! A  = -sin θ cos φ cos δ + sin φ sin δ
//! B  = sqrt(A² + cos²θ cos²φ)
//! f(θ) = rf·B + d3·A + cos φ·(d2 cos θ - d1 sin θ) - rr·|cos φ|
//! ```
//!
//! the constraint is f(θ) = 0, with rf·B the height of the front wheel
//! center above its contact point.
//!
//! Upright with zero steer the root is θ = λ: pitch is measured from the
//! steer axis being vertical, not from the frame's nominal attitude.

use crate::parameters::{BicycleParameters, MooreParameters};

/// f(θ) and df/dθ at fixed roll and steer
#[derive(Clone, Copy, Debug)]
pub struct PitchConstraint {
    d1: f64,
    d2: f64,
    d3: f64,
    rr: f64,
    rf: f64,
    cos_roll: f64,
    sin_roll: f64,
    cos_steer: f64,
    sin_steer: f64,
}

impl PitchConstraint {
    pub fn new(
        moore: &MooreParameters,
        params: &BicycleParameters,
        roll_angle: f64,
        steer_angle: f64,
    ) -> Self {
        let (sin_roll, cos_roll) = roll_angle.sin_cos();
        let (sin_steer, cos_steer) = steer_angle.sin_cos();
        Self {
            d1: moore.d1,
            d2: moore.d2,
            d3: moore.d3,
            rr: params.rear_wheel_radius,
            rf: params.front_wheel_radius,
            cos_roll,
            sin_roll,
            cos_steer,
            sin_steer,
        }
    }

    /// Returns `(f(θ), f'(θ))`
    pub fn evaluate(&self, pitch: f64) -> (f64, f64) {
        let (sin_p, cos_p) = pitch.sin_cos();
        let cr = self.cos_roll;
        let cr2 = cr * cr;

        let a = -sin_p * cr * self.cos_steer + self.sin_roll * self.sin_steer;
        let da = -cos_p * cr * self.cos_steer;
        let b = (a * a + cos_p * cos_p * cr2).sqrt();

        let value = self.rf * b + self.d3 * a + cr * (self.d2 * cos_p - self.d1 * sin_p)
            - self.rr * cr.abs();

        // B vanishes only with the front wheel plane horizontal
        let db = if b > 0.0 {
            (a * da - sin_p * cos_p * cr2) / b
        } else {
            0.0
        };
        let derivative = self.rf * db + self.d3 * da - cr * (self.d2 * sin_p + self.d1 * cos_p);

        (value, derivative)
    }
}
