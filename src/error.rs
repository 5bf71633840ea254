use thiserror::Error;

/// Bicycle model error types
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid counts per revolution: {0} (must be in 1..=i32::MAX)")]
    InvalidCountsPerRevolution(u32),

    #[error("Velocity must be finite, got {0}")]
    NonFiniteVelocity(f64),

    #[error("Stiffness matrix is singular at v = {velocity} m/s (K[0][0] = {k00:e})")]
    SingularStiffness { velocity: f64, k00: f64 },

    #[error("Invalid timestep: {0} s")]
    InvalidTimestep(f64),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
