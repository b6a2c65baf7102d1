pub mod client;
pub mod documents;
pub mod model;

use crate::errors::DeployError;
use async_trait::async_trait;
use model::UpsertResult;
use serde_json::Value;

/// Remote operations on Knative services. One call is one round-trip.
#[async_trait]
pub trait ServiceApi: Send + Sync {
    /// `Ok(None)` when the gateway answers with no record.
    async fn fetch(
        &self,
        cluster_id: &str,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Option<Value>, DeployError>;

    async fn create(&self, cluster_id: &str, input: &Value) -> Result<UpsertResult, DeployError>;

    async fn update(&self, cluster_id: &str, input: &Value) -> Result<UpsertResult, DeployError>;
}
