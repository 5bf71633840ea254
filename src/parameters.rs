//! Physical parameter set for the bicycle model
//!
//! Defaults are the benchmark bicycle of Meijaard, Papadopoulos, Ruina and
//! Schwab (2007). Matrices are stored row-major with the roll row/column
//! first and the steer row/column second.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{ModelError, ModelResult};
use crate::types::{mat2_from_rows, Mat2};

const GRAVITY: f64 = 9.81; // m/s²
const MIN_COS_TILT: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BicycleParameters {
    /// Wheelbase w [m]
    pub wheelbase: f64,
    /// Trail c [m]
    pub trail: f64,
    /// Steer axis tilt λ from vertical [rad]
    pub steer_axis_tilt: f64,
    /// Rear wheel radius rr [m]
    pub rear_wheel_radius: f64,
    /// Front wheel radius rf [m]
    pub front_wheel_radius: f64,
    /// Gravitational acceleration g [m/s²]
    pub gravity: f64,
    /// Mass matrix M
    pub mass: [[f64; 2]; 2],
    /// Velocity-proportional damping C1 (C = v·C1)
    pub damping_c1: [[f64; 2]; 2],
    /// Gravity-dependent stiffness K0
    pub stiffness_k0: [[f64; 2]; 2],
    /// Velocity-squared stiffness K2
    pub stiffness_k2: [[f64; 2]; 2],
}

impl Default for BicycleParameters {
    fn default() -> Self {
        Self::benchmark()
    }
}

impl BicycleParameters {
    pub fn benchmark() -> Self {
        Self {
            wheelbase: 1.02,
            trail: 0.08,
            steer_axis_tilt: PI / 10.0,
            rear_wheel_radius: 0.3,
            front_wheel_radius: 0.35,
            gravity: GRAVITY,
            mass: [
                [80.81722, 2.31941332208709],
                [2.31941332208709, 0.29784188199686],
            ],
            damping_c1: [
                [0.0, 33.86641391492494],
                [-0.85035641456978, 1.68540397397560],
            ],
            stiffness_k0: [
                [-80.95, -2.59951685249872],
                [-2.59951685249872, -0.80329488458618],
            ],
            stiffness_k2: [[0.0, 76.59734589573222], [0.0, 2.65431523794604]],
        }
    }

    /// Reject geometry the model cannot be built from
    pub fn validate(&self) -> ModelResult<()> {
        let scalars = [
            ("wheelbase", self.wheelbase),
            ("trail", self.trail),
            ("steer_axis_tilt", self.steer_axis_tilt),
            ("rear_wheel_radius", self.rear_wheel_radius),
            ("front_wheel_radius", self.front_wheel_radius),
            ("gravity", self.gravity),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ModelError::InvalidParameters(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        let matrices = [
            ("mass", &self.mass),
            ("damping_c1", &self.damping_c1),
            ("stiffness_k0", &self.stiffness_k0),
            ("stiffness_k2", &self.stiffness_k2),
        ];
        for (name, m) in matrices {
            if m.iter().flatten().any(|v| !v.is_finite()) {
                return Err(ModelError::InvalidParameters(format!(
                    "{name} contains a non-finite entry"
                )));
            }
        }

        if self.wheelbase <= 0.0 {
            return Err(ModelError::InvalidParameters(format!(
                "wheelbase must be positive, got {}",
                self.wheelbase
            )));
        }
        if self.rear_wheel_radius <= 0.0 || self.front_wheel_radius <= 0.0 {
            return Err(ModelError::InvalidParameters(
                "wheel radii must be positive".to_string(),
            ));
        }
        if self.steer_axis_tilt.cos().abs() < MIN_COS_TILT {
            return Err(ModelError::InvalidParameters(format!(
                "steer axis tilt {} leaves no vertical component",
                self.steer_axis_tilt
            )));
        }
        Ok(())
    }

    pub fn mass_matrix(&self) -> Mat2 {
        mat2_from_rows(&self.mass)
    }

    pub fn damping_c1_matrix(&self) -> Mat2 {
        mat2_from_rows(&self.damping_c1)
    }

    pub fn stiffness_k0_matrix(&self) -> Mat2 {
        mat2_from_rows(&self.stiffness_k0)
    }

    pub fn stiffness_k2_matrix(&self) -> Mat2 {
        mat2_from_rows(&self.stiffness_k2)
    }

    /// K = g·K0 + v²·K2
    pub fn stiffness(&self, v: f64) -> Mat2 {
        self.gravity * self.stiffness_k0_matrix() + v * v * self.stiffness_k2_matrix()
    }

    /// C = v·C1
    pub fn damping(&self, v: f64) -> Mat2 {
        v * self.damping_c1_matrix()
    }
}

/// Moore's frame offsets derived from the benchmark geometry
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MooreParameters {
    /// Rear wheel center to steer axis, perpendicular [m]
    pub d1: f64,
    /// Along the steer axis between the two perpendiculars [m]
    pub d2: f64,
    /// Front wheel center to steer axis, perpendicular [m]
    pub d3: f64,
}

impl MooreParameters {
    pub fn from_geometry(params: &BicycleParameters) -> Self {
        let (sin_l, cos_l) = params.steer_axis_tilt.sin_cos();
        let tan_l = params.steer_axis_tilt.tan();
        let rr = params.rear_wheel_radius;
        let rf = params.front_wheel_radius;

        let d1 = cos_l * (params.trail + params.wheelbase - rr * tan_l);
        let d3 = -cos_l * (params.trail - rf * tan_l);
        let d2 = (rr + d1 * sin_l - rf + d3 * sin_l) / cos_l;

        Self { d1, d2, d3 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_benchmark_is_valid() {
        assert!(BicycleParameters::benchmark().validate().is_ok());
    }

    #[test]
    fn test_moore_parameters_benchmark() {
        let moore = MooreParameters::from_geometry(&BicycleParameters::benchmark());
        assert_relative_eq!(moore.d1, 0.9534570696121847, epsilon = 1e-9);
        assert_relative_eq!(moore.d3, 0.0320714267276193, epsilon = 1e-9);
        assert_relative_eq!(moore.d2, 0.2676445084476887, epsilon = 1e-9);
    }

    #[test]
    fn test_moore_parameters_vertical_steer_axis() {
        let params = BicycleParameters {
            steer_axis_tilt: 0.0,
            ..BicycleParameters::benchmark()
        };
        let moore = MooreParameters::from_geometry(&params);
        assert_relative_eq!(moore.d1, params.trail + params.wheelbase);
        assert_relative_eq!(moore.d3, -params.trail);
        assert_relative_eq!(moore.d2, params.rear_wheel_radius - params.front_wheel_radius);
    }

    #[test]
    fn test_stiffness_at_rest_is_gravity_scaled() {
        let params = BicycleParameters::benchmark();
        let k = params.stiffness(0.0);
        assert_relative_eq!(k[(0, 0)], -80.95 * GRAVITY);
        assert_relative_eq!(k[(0, 1)], -2.59951685249872 * GRAVITY);
        assert_eq!(params.damping(0.0), Mat2::zeros());
    }

    #[test]
    fn test_benchmark_mass_matrix_is_symmetric() {
        let m = BicycleParameters::benchmark().mass_matrix();
        assert_relative_eq!(m[(0, 0)], 80.81722);
        assert_relative_eq!(m[(1, 1)], 0.29784188199686);
        assert_eq!(m, m.transpose());
        assert!(m.determinant() > 0.0);
    }

    #[test]
    fn test_stiffness_velocity_term() {
        let params = BicycleParameters::benchmark();
        let k = params.stiffness(5.0);
        assert_relative_eq!(k[(0, 1)], -2.59951685249872 * GRAVITY + 25.0 * 76.59734589573222);
        assert_relative_eq!(k[(1, 0)], -2.59951685249872 * GRAVITY);
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        let params = BicycleParameters {
            wheelbase: -1.0,
            ..BicycleParameters::benchmark()
        };
        assert!(params.validate().is_err());

        let params = BicycleParameters {
            steer_axis_tilt: PI / 2.0,
            ..BicycleParameters::benchmark()
        };
        assert!(params.validate().is_err());

        let mut params = BicycleParameters::benchmark();
        params.stiffness_k2[1][1] = f64::NAN;
        assert!(matches!(
            params.validate(),
            Err(ModelError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_benchmark_defaults() {
        let params: BicycleParameters = serde_json::from_str(r#"{"trail": 0.1}"#).unwrap();
        assert_eq!(params.trail, 0.1);
        assert_eq!(params.wheelbase, 1.02);
    }
}
