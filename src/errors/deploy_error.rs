use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployErrorKind {
    InvalidParams,
    Denied,
    Transport,
    Internal,
}

/// Failure surfaced to the caller of a deployment. `message` is kept verbatim
/// from the underlying cause; classification reads it.
#[derive(Debug, Clone, Serialize)]
pub struct DeployError {
    pub kind: DeployErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl DeployError {
    pub fn new(
        kind: DeployErrorKind,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::InvalidParams, "INVALID_PARAMS", message)
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::Denied, "DENIED", message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::Transport, "TRANSPORT", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::Internal, "INTERNAL", message)
    }
}

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for DeployError {}

impl From<std::io::Error> for DeployError {
    fn from(err: std::io::Error) -> Self {
        DeployError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for DeployError {
    fn from(err: serde_json::Error) -> Self {
        DeployError::internal(format!("Failed to encode service input: {}", err))
    }
}
