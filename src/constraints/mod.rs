//! Algebraic constraints solved once per model cycle

pub mod pitch;

pub use pitch::PitchConstraint;
