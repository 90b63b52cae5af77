/// Convenience result type used across the splat pipeline.
pub type SplatResult<T> = Result<T, SplatError>;

/// Failure surface exposed by pipeline entry points.
///
/// Per-splat numeric problems never surface here; the projector reports them as
/// [`crate::CullReason`] values and the frame keeps going.
#[derive(thiserror::Error, Debug)]
pub enum SplatError {
    /// Null, empty or out-of-range input rejected before any work is done.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Storage could not grow. Per-frame paths degrade instead of returning this.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// Ill-conditioned math that could not be recovered locally.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    /// Invalid pipeline configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing scenes and configs.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SplatError {
    /// Build a [`SplatError::InvalidParameter`] value.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Build a [`SplatError::OutOfMemory`] value.
    pub fn out_of_memory(msg: impl Into<String>) -> Self {
        Self::OutOfMemory(msg.into())
    }

    /// Build a [`SplatError::NumericalInstability`] value.
    pub fn numerical(msg: impl Into<String>) -> Self {
        Self::NumericalInstability(msg.into())
    }

    /// Build a [`SplatError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SplatError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for SplatError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
