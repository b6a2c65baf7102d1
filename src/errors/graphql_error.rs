use super::{DeployError, DeployErrorKind};
use thiserror::Error;

/// Failures raised while talking to the GraphQL gateway.
#[derive(Debug, Error)]
pub enum GraphQlError {
    #[error("GraphQL request failed: {0}")]
    Send(#[from] reqwest::Error),
    #[error("GraphQL request failed ({status}): {body}")]
    Http { status: u16, body: String },
    #[error("GraphQL response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{}", .0.join("\n"))]
    Errors(Vec<String>),
    #[error("GraphQL response is missing data.{0}")]
    MissingData(String),
}

impl From<GraphQlError> for DeployError {
    fn from(err: GraphQlError) -> Self {
        let message = err.to_string();
        match err {
            GraphQlError::Http { status, .. } if status == 401 || status == 403 => {
                DeployError::denied(message)
                    .with_hint("Check the API token and tenant configured for this deployment.")
            }
            GraphQlError::Http { status, .. } => DeployError::transport(message)
                .with_details(serde_json::json!({ "status": status })),
            GraphQlError::Errors(messages) => {
                DeployError::new(DeployErrorKind::Transport, "GRAPHQL_ERRORS", message)
                    .with_details(serde_json::json!({ "errors": messages }))
            }
            GraphQlError::Send(_) | GraphQlError::Decode(_) => DeployError::transport(message),
            GraphQlError::MissingData(_) => DeployError::internal(message),
        }
    }
}
