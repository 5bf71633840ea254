//! Simplified bicycle pose model
//!
//! State layout:
//! - linear state `[steer, steer_rate, roll, roll_rate]` (rad, rad/s)
//! - auxiliary state `[x, y, pitch, yaw]` (m, m, rad, rad)
//!
//! Roll and steer follow the quasi-static equations of motion, where rate
//! and acceleration terms are dropped:
//!
//! ```text
//! (g·K0 + v²·K2) [φ] = [T_φ]
//!                [δ]   [T_δ]
//! ```
//!
//! With no roll torque the roll angle follows from the measured steer angle.
//! Position and yaw are integrated with the kinematic single-track relation,
//! and pitch is re-solved from the wheel contact constraint every cycle.

use log::{debug, trace, warn};
use std::f64::consts::FRAC_PI_2;

use crate::constraints::PitchConstraint;
use crate::error::{ModelError, ModelResult};
use crate::numerics::{newton_raphson_iterate, RootEstimate, RungeKutta4};
use crate::parameters::{BicycleParameters, MooreParameters};
use crate::types::{
    auxiliary_state_index as aux, state_index as st, AuxStateVec, Mat2, ModelInput,
    PoseSnapshot, StateVec,
};

/// Two thirds of the f64 mantissa
const PITCH_DIGITS: u32 = f64::MANTISSA_DIGITS * 2 / 3;
const PITCH_MAX_ITERATIONS: usize = 50;
const PITCH_MIN: f64 = -FRAC_PI_2;
const PITCH_MAX: f64 = FRAC_PI_2;

/// Below this |K[0][0]| the quasi-static roll solution is rejected
const MIN_ROLL_STIFFNESS: f64 = 1e-9;

pub struct SimpleBicycle {
    /// Physical parameters and derived geometry
    params: BicycleParameters,
    moore: MooreParameters,

    /// Forward velocity [m/s]
    v: f64,

    /// Cycle period [s]
    dt: f64,

    /// C = v·C1
    damping: Mat2,

    /// K = g·K0 + v²·K2
    stiffness: Mat2,

    state: StateVec,
    aux_state: AuxStateVec,

    /// Steer feedback torque for the actuator [N·m]
    feedback_torque: f64,

    /// Time since the last reset [s]
    elapsed: f64,
    pose: PoseSnapshot,
    last_pitch_solve: RootEstimate,
    auxiliary_stepper: RungeKutta4,
}

impl SimpleBicycle {
    /// Create a model and settle it into the upright, zero-steer pose
    pub fn new(v: f64, dt: f64, params: BicycleParameters) -> ModelResult<Self> {
        params.validate()?;
        check_timestep(dt)?;
        let (damping, stiffness) = velocity_matrices(&params, v)?;
        let moore = MooreParameters::from_geometry(&params);

        let mut model = Self {
            params,
            moore,
            v,
            dt,
            damping,
            stiffness,
            state: StateVec::zeros(),
            aux_state: AuxStateVec::zeros(),
            feedback_torque: 0.0,
            elapsed: 0.0,
            pose: PoseSnapshot::default(),
            last_pitch_solve: RootEstimate {
                root: 0.0,
                iterations: 0,
                converged: true,
            },
            auxiliary_stepper: RungeKutta4,
        };
        model.reset_pose();
        Ok(model)
    }

    /// Benchmark bicycle parameters
    pub fn benchmark(v: f64, dt: f64) -> ModelResult<Self> {
        Self::new(v, dt, BicycleParameters::benchmark())
    }

    /// Change forward velocity, recomputing damping and stiffness
    ///
    /// The model is left untouched if `v` is not finite or makes the
    /// quasi-static roll solution singular.
    pub fn set_velocity(&mut self, v: f64) -> ModelResult<()> {
        let (damping, stiffness) = velocity_matrices(&self.params, v)?;
        self.v = v;
        self.damping = damping;
        self.stiffness = stiffness;
        debug!("velocity set to {:.3} m/s (K00 = {:.3})", v, stiffness[(0, 0)]);
        Ok(())
    }

    pub fn set_dt(&mut self, dt: f64) -> ModelResult<()> {
        check_timestep(dt)?;
        self.dt = dt;
        debug!("timestep set to {dt} s");
        Ok(())
    }

    /// Zero all state and re-solve pitch for the flat-ground pose
    pub fn reset_pose(&mut self) {
        self.state = StateVec::zeros();
        self.aux_state = AuxStateVec::zeros();
        self.feedback_torque = 0.0;
        self.elapsed = 0.0;
        self.pose = PoseSnapshot::default();

        let solve = self.solve_constraint_pitch(&self.state, self.aux_state[aux::PITCH_ANGLE]);
        self.apply_pitch(solve);
        self.pose.pitch = self.aux_state[aux::PITCH_ANGLE];
        debug!("pose reset, upright pitch {:.6} rad", self.pose.pitch);
    }

    /// Run one control cycle
    ///
    /// Torque inputs and the yaw measurement are not used by the
    /// simplified dynamics.
    pub fn update(&mut self, input: &ModelInput) -> &PoseSnapshot {
        self.update_state(input.steer_angle);
        self.aux_state = self.integrate_auxiliary_state(&self.state, &self.aux_state);
        let solve = self.solve_constraint_pitch(&self.state, self.aux_state[aux::PITCH_ANGLE]);
        self.apply_pitch(solve);
        self.update_feedback_torque();
        self.set_pose();

        trace!(
            "t={} ms steer={:.5} roll={:.5} pitch={:.5} yaw={:.5}",
            self.pose.timestamp,
            self.pose.steer,
            self.pose.roll,
            self.pose.pitch,
            self.pose.yaw
        );
        &self.pose
    }

    /// Quasi-static roll from the measured steer angle
    ///
    /// Rates are backward differences against the previous cycle.
    pub fn update_state(&mut self, steer_measurement: f64) {
        let next_roll = -self.stiffness[(0, 1)] / self.stiffness[(0, 0)] * steer_measurement;

        self.state[st::STEER_RATE] = (steer_measurement - self.state[st::STEER_ANGLE]) / self.dt;
        self.state[st::ROLL_RATE] = (next_roll - self.state[st::ROLL_ANGLE]) / self.dt;
        self.state[st::STEER_ANGLE] = steer_measurement;
        self.state[st::ROLL_ANGLE] = next_roll;
    }

    /// T_m = -(K11 - K01·K10/K00)·δ
    pub fn update_feedback_torque(&mut self) {
        let k = &self.stiffness;
        self.feedback_torque =
            -(k[(1, 1)] - k[(0, 1)] * k[(1, 0)] / k[(0, 0)]) * self.state[st::STEER_ANGLE];
    }

    /// ψ' = (v·δ + c·δ')/w · cos λ
    pub fn yaw_rate(&self, state: &StateVec) -> f64 {
        (self.v * state[st::STEER_ANGLE] + self.params.trail * state[st::STEER_RATE])
            / self.params.wheelbase
            * self.params.steer_axis_tilt.cos()
    }

    /// One fixed step of the planar kinematics over [0, dt]
    ///
    /// Pitch is carried through unchanged; it is solved separately.
    pub fn integrate_auxiliary_state(&self, state: &StateVec, aux_state: &AuxStateVec) -> AuxStateVec {
        let v = self.v;
        let yaw_rate = self.yaw_rate(state);
        let mut next = *aux_state;

        self.auxiliary_stepper.do_step(
            |x: &AuxStateVec, _t| {
                let (sin_yaw, cos_yaw) = x[aux::YAW_ANGLE].sin_cos();
                AuxStateVec::new(v * cos_yaw, v * sin_yaw, 0.0, yaw_rate)
            },
            &mut next,
            0.0,
            self.dt,
        );
        next
    }

    /// Solve the contact constraint for pitch, seeded with `guess`
    pub fn solve_constraint_pitch(&self, state: &StateVec, guess: f64) -> RootEstimate {
        let constraint = PitchConstraint::new(
            &self.moore,
            &self.params,
            state[st::ROLL_ANGLE],
            state[st::STEER_ANGLE],
        );
        newton_raphson_iterate(
            |pitch| constraint.evaluate(pitch),
            guess,
            PITCH_MIN,
            PITCH_MAX,
            PITCH_DIGITS,
            PITCH_MAX_ITERATIONS,
        )
    }

    /// Advance the clock by one cycle and publish the current state
    ///
    /// The timestamp is rounded from accumulated seconds, so sub-millisecond
    /// cycle periods neither drift nor stall.
    pub fn set_pose(&mut self) {
        self.elapsed += self.dt;
        self.pose.timestamp = (self.elapsed * 1000.0).round() as u64;
        self.pose.x = self.aux_state[aux::X];
        self.pose.y = self.aux_state[aux::Y];
        self.pose.pitch = self.aux_state[aux::PITCH_ANGLE];
        self.pose.yaw = self.aux_state[aux::YAW_ANGLE];
        self.pose.roll = self.state[st::ROLL_ANGLE];
        self.pose.steer = self.state[st::STEER_ANGLE];
    }

    fn apply_pitch(&mut self, solve: RootEstimate) {
        if !solve.converged {
            warn!(
                "pitch solve did not converge after {} iterations, keeping {:.6} rad",
                solve.iterations, solve.root
            );
        }
        self.aux_state[aux::PITCH_ANGLE] = solve.root;
        self.last_pitch_solve = solve;
    }

    pub fn velocity(&self) -> f64 {
        self.v
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn parameters(&self) -> &BicycleParameters {
        &self.params
    }

    pub fn moore_parameters(&self) -> &MooreParameters {
        &self.moore
    }

    pub fn damping(&self) -> &Mat2 {
        &self.damping
    }

    pub fn stiffness(&self) -> &Mat2 {
        &self.stiffness
    }

    pub fn state(&self) -> &StateVec {
        &self.state
    }

    pub fn auxiliary_state(&self) -> &AuxStateVec {
        &self.aux_state
    }

    pub fn feedback_torque(&self) -> f64 {
        self.feedback_torque
    }

    pub fn pose(&self) -> &PoseSnapshot {
        &self.pose
    }

    /// Diagnostics of the most recent pitch solve
    pub fn last_pitch_solve(&self) -> RootEstimate {
        self.last_pitch_solve
    }
}

fn check_timestep(dt: f64) -> ModelResult<()> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(ModelError::InvalidTimestep(dt));
    }
    Ok(())
}

fn velocity_matrices(params: &BicycleParameters, v: f64) -> ModelResult<(Mat2, Mat2)> {
    if !v.is_finite() {
        return Err(ModelError::NonFiniteVelocity(v));
    }
    let stiffness = params.stiffness(v);
    let k00 = stiffness[(0, 0)];
    if k00.abs() < MIN_ROLL_STIFFNESS {
        return Err(ModelError::SingularStiffness { velocity: v, k00 });
    }
    Ok((params.damping(v), stiffness))
}
