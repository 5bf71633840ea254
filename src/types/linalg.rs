//! Linear algebra type system for the bicycle model
//!
//! Fixed-size nalgebra aliases for the roll/steer state, the auxiliary
//! planar pose and the 2x2 physical matrices.

use nalgebra::{Matrix2, SVector};

// ===== State Dimensions =====
pub const STATE_DIM: usize = 4;
pub const AUX_STATE_DIM: usize = 4;

/// Linear roll/steer state `[steer, steer_rate, roll, roll_rate]`
pub type StateVec = SVector<f64, STATE_DIM>;

/// Auxiliary planar pose `[x, y, pitch, yaw]`
pub type AuxStateVec = SVector<f64, AUX_STATE_DIM>;

/// Mass, damping and stiffness matrices (roll row/column first)
pub type Mat2 = Matrix2<f64>;

/// Indices into [`StateVec`]
pub mod state_index {
    pub const STEER_ANGLE: usize = 0;
    pub const STEER_RATE: usize = 1;
    pub const ROLL_ANGLE: usize = 2;
    pub const ROLL_RATE: usize = 3;
}

/// Indices into [`AuxStateVec`]
pub mod auxiliary_state_index {
    pub const X: usize = 0;
    pub const Y: usize = 1;
    pub const PITCH_ANGLE: usize = 2;
    pub const YAW_ANGLE: usize = 3;
}

/// Build a [`Mat2`] from row-major storage
pub fn mat2_from_rows(rows: &[[f64; 2]; 2]) -> Mat2 {
    Mat2::new(rows[0][0], rows[0][1], rows[1][0], rows[1][1])
}
