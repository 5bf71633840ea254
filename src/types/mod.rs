pub mod linalg;

pub use linalg::*;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::sensors::{encoder_count, Encoder};

/// Static configuration of a rotary encoder
///
/// Serialized as the bare resolution; deserializing goes through [`EncoderConfig::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct EncoderConfig {
    counts_per_revolution: u32,
}

impl EncoderConfig {
    /// Counts must be positive and small enough to reinterpret as a signed count
    pub fn new(counts_per_revolution: u32) -> ModelResult<Self> {
        if counts_per_revolution == 0 || counts_per_revolution > i32::MAX as u32 {
            return Err(ModelError::InvalidCountsPerRevolution(counts_per_revolution));
        }
        Ok(Self {
            counts_per_revolution,
        })
    }

    pub fn counts_per_revolution(&self) -> u32 {
        self.counts_per_revolution
    }
}

impl TryFrom<u32> for EncoderConfig {
    type Error = ModelError;

    fn try_from(counts_per_revolution: u32) -> ModelResult<Self> {
        Self::new(counts_per_revolution)
    }
}

impl From<EncoderConfig> for u32 {
    fn from(config: EncoderConfig) -> Self {
        config.counts_per_revolution
    }
}

/// One cycle of raw encoder output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEncoderSample {
    /// Position count, wraps at counts per revolution
    pub count: u32,
    /// Rate estimate in counts per cycle
    pub velocity_count: i32,
}

/// Inputs consumed by one model cycle
///
/// Only `steer_angle` drives the simplified model; the torques and the yaw
/// measurement are accepted for interface compatibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInput {
    #[serde(default)]
    pub roll_torque: f64,
    #[serde(default)]
    pub steer_torque: f64,
    #[serde(default)]
    pub yaw_angle: f64,
    pub steer_angle: f64,
}

impl ModelInput {
    pub fn new(steer_angle: f64) -> Self {
        Self {
            steer_angle,
            ..Self::default()
        }
    }

    /// Convert a raw steer encoder count into a cycle input
    pub fn from_steer_encoder<E: Encoder>(encoder: &E) -> Self {
        Self::new(encoder_count::<f64, _>(encoder))
    }
}

/// Most recent computed pose, published once per cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseSnapshot {
    /// Milliseconds since the last reset
    pub timestamp: u64,
    pub x: f64,
    pub y: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
    pub steer: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_config_rejects_zero() {
        assert!(matches!(
            EncoderConfig::new(0),
            Err(ModelError::InvalidCountsPerRevolution(0))
        ));
    }

    #[test]
    fn test_encoder_config_rejects_unsigned_overflow() {
        assert!(EncoderConfig::new(u32::MAX).is_err());
        assert!(EncoderConfig::new(i32::MAX as u32).is_ok());
    }

    #[test]
    fn test_encoder_config_deserialize_validates() {
        assert!(serde_json::from_str::<EncoderConfig>("0").is_err());
        assert!(serde_json::from_str::<EncoderConfig>("4294967295").is_err());

        let config: EncoderConfig = serde_json::from_str("4096").unwrap();
        assert_eq!(config.counts_per_revolution(), 4096);
        assert_eq!(serde_json::to_value(config).unwrap(), 4096);
    }

    #[test]
    fn test_model_input_defaults_unused_fields() {
        let input: ModelInput = serde_json::from_str(r#"{"steer_angle": 0.1}"#).unwrap();
        assert_eq!(input, ModelInput::new(0.1));
    }

    #[test]
    fn test_pose_snapshot_json_fields() {
        let pose = PoseSnapshot {
            timestamp: 15,
            x: 1.0,
            y: 2.0,
            pitch: 0.3,
            yaw: 0.4,
            roll: 0.5,
            steer: 0.6,
        };
        let value = serde_json::to_value(pose).unwrap();
        assert_eq!(value["timestamp"], 15);
        assert_eq!(value["steer"], 0.6);
        let back: PoseSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(back, pose);
    }
}
