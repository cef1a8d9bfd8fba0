use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a tracked body in the external scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub String);

impl BodyId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BodyId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for BodyId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Errors surfaced at API boundaries.
///
/// Degenerate geometry and spline fit failures are recovered where they
/// occur and never show up here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("body `{0}` not found in scene")]
    NotFound(BodyId),
}

impl PathError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        PathError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] PathError),
}
