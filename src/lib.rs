//! Real-time pose model for a two-wheeled vehicle
//!
//! Once per control cycle the model turns a measured steer angle into a full
//! pose: quasi-static roll from the linear roll/steer equations, planar
//! position and yaw from a fixed-step integration of the kinematic bicycle,
//! and rear frame pitch from the wheel contact constraint.

pub mod config;
pub mod constraints;
pub mod error;
pub mod model;
pub mod numerics;
pub mod parameters;
pub mod sensors;
pub mod types;
pub mod utility;

pub use config::ModelConfig;
pub use error::{ModelError, ModelResult};
pub use model::SimpleBicycle;
pub use parameters::{BicycleParameters, MooreParameters};
pub use sensors::{encoder_count, encoder_rate, Encoder, EncoderChannel, RateEstimator};
pub use types::{EncoderConfig, ModelInput, PoseSnapshot, RawEncoderSample};
