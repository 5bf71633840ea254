//! Model construction settings loaded from JSON

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ModelResult;
use crate::model::SimpleBicycle;
use crate::parameters::BicycleParameters;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Forward velocity [m/s]
    pub velocity: f64,
    /// Control cycle period [s]
    pub dt: f64,
    pub parameters: BicycleParameters,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            velocity: 5.0,
            dt: 0.005, // 200 Hz
            parameters: BicycleParameters::benchmark(),
        }
    }
}

impl ModelConfig {
    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.parameters.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ModelResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn build(&self) -> ModelResult<SimpleBicycle> {
        SimpleBicycle::new(self.velocity, self.dt, self.parameters.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    #[test]
    fn test_empty_json_is_default() {
        let config = ModelConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ModelConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ModelConfig::from_json_str(
            r#"{"velocity": 3.5, "parameters": {"wheelbase": 1.1}}"#,
        )
        .unwrap();
        assert_eq!(config.velocity, 3.5);
        assert_eq!(config.dt, 0.005);
        assert_eq!(config.parameters.wheelbase, 1.1);
        assert_eq!(config.parameters.trail, 0.08);

        let model = config.build().unwrap();
        assert_eq!(model.velocity(), 3.5);
        assert_eq!(model.parameters().wheelbase, 1.1);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let err = ModelConfig::from_json_str(r#"{"parameters": {"front_wheel_radius": 0.0}}"#)
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameters(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ModelConfig::from_json_str("{\"velocity\": }"),
            Err(ModelError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ModelConfig::load(Path::new("/nonexistent/bicycle.json")).unwrap_err();
        assert!(matches!(err, ModelError::ConfigIo(_)));
    }

    #[test]
    fn test_invalid_dt_fails_on_build() {
        let config = ModelConfig::from_json_str(r#"{"dt": 0.0}"#).unwrap();
        assert!(matches!(config.build(), Err(ModelError::InvalidTimestep(_))));
    }
}
