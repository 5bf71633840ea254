//! Fixed-step explicit ODE integration
//!
//! Steppers carry no state between calls; each step starts from whatever
//! state vector it is handed.

use nalgebra::SVector;

/// Classic 4-stage Runge-Kutta, O(h⁴) global error
#[derive(Clone, Copy, Debug, Default)]
pub struct RungeKutta4;

impl RungeKutta4 {
    /// Advance `x` in place from `t` to `t + dt`
    ///
    /// `system(x, t)` returns dx/dt.
    pub fn do_step<const N: usize, F>(&self, system: F, x: &mut SVector<f64, N>, t: f64, dt: f64)
    where
        F: Fn(&SVector<f64, N>, f64) -> SVector<f64, N>,
    {
        let half_dt = 0.5 * dt;

        let k1 = system(&*x, t);
        let k2 = system(&(*x + k1 * half_dt), t + half_dt);
        let k3 = system(&(*x + k2 * half_dt), t + half_dt);
        let k4 = system(&(*x + k3 * dt), t + dt);

        *x += (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0);
    }
}
