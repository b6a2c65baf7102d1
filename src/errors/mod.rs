mod classify;
mod deploy_error;
mod graphql_error;

pub use classify::{classify, classify_message, ErrorClass};
pub use deploy_error::{DeployError, DeployErrorKind};
pub use graphql_error::GraphQlError;
