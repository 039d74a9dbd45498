/// Convenience result type used across the crate.
pub type ConvergeResult<T> = Result<T, ConvergeError>;

/// Top-level error taxonomy used by library APIs.
///
/// Geometry and scroll handling never fail: degenerate viewports are clamped instead. Errors come
/// from invalid configuration, asset IO, and the render/encode backends.
#[derive(thiserror::Error, Debug)]
pub enum ConvergeError {
    /// Invalid user-provided page or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors raised by render or encode backends.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConvergeError {
    /// Build a [`ConvergeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ConvergeError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ConvergeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for ConvergeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
