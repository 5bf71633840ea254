//! Numerical building blocks for the model step
//!
//! Fixed-step ODE integration and bounded scalar root finding.

pub mod ode;
pub mod roots;

pub use ode::RungeKutta4;
pub use roots::{newton_raphson_iterate, RootEstimate};
