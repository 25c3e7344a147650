/// Convenience result type used across layerflow.
pub type LayerflowResult<T> = Result<T, LayerflowError>;

/// Top-level error taxonomy used by engine APIs.
///
/// The recompute path itself never fails; these errors surface only at the edges
/// (parsing documents, validating config, loading media, dispatching events that
/// reference unknown nodes).
#[derive(thiserror::Error, Debug)]
pub enum LayerflowError {
    /// Invalid user-provided graph data or event payload.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid or unreadable layer/style configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Media bytes could not be loaded or probed.
    #[error("media error: {0}")]
    Media(String),

    /// Errors when serializing or deserializing documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayerflowError {
    /// Build a [`LayerflowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LayerflowError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`LayerflowError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`LayerflowError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for LayerflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
