use crate::errors::{classify, DeployError, ErrorClass};
use crate::managers::knative::model::{DesiredState, UpsertResult};
use crate::managers::knative::ServiceApi;
use crate::services::config::DeployConfig;
use crate::services::logger::Logger;
use crate::utils::merge::merge_deep;
use crate::utils::redact::redact_service_input;
use crate::utils::sanitize::{is_absent_record, sanitize_existing};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Which write produced the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileAction {
    /// Existing record merged with the desired state and updated.
    Updated,
    Created,
    /// Create was rejected because the service exists; desired state sent as an update.
    UpdatedAfterConflict,
    /// Fetch reported the service exists; desired state sent as an update.
    UpdatedUnmerged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub service_url: String,
    pub revision_name: String,
    pub action: ReconcileAction,
}

impl ReconcileOutcome {
    fn from_upsert(result: UpsertResult, action: ReconcileAction) -> Self {
        Self {
            service_url: result.address,
            revision_name: result.revision,
            action,
        }
    }
}

/// Drives fetch → merge → upsert for one service.
///
/// Every call performs at most one fetch and two writes, strictly in sequence,
/// and holds no state between calls.
#[derive(Clone)]
pub struct Reconciler {
    logger: Logger,
    api: Arc<dyn ServiceApi>,
    cluster_id: String,
    default_namespace: Option<String>,
}

impl Reconciler {
    pub fn new(logger: Logger, config: &DeployConfig, api: Arc<dyn ServiceApi>) -> Self {
        Self {
            logger: logger.child("reconcile"),
            api,
            cluster_id: config.cluster_id.clone(),
            default_namespace: config.namespace.clone(),
        }
    }

    pub async fn reconcile(&self, desired: &DesiredState) -> Result<ReconcileOutcome, DeployError> {
        let input = desired.to_input()?;
        let namespace = desired
            .namespace()
            .or(self.default_namespace.as_deref());
        self.reconcile_input(desired.name(), namespace, &input).await
    }

    /// Same as [`Reconciler::reconcile`] for an already rendered input object.
    pub async fn reconcile_input(
        &self,
        name: &str,
        namespace: Option<&str>,
        desired: &Value,
    ) -> Result<ReconcileOutcome, DeployError> {
        let scoped = with_namespace(desired, namespace);
        let desired = &scoped;
        self.logger.debug(
            "desired state",
            Some(&serde_json::json!({ "name": name, "input": redact_service_input(desired) })),
        );

        match self.api.fetch(&self.cluster_id, name, namespace).await {
            Ok(Some(existing)) if !is_absent_record(&existing) => {
                self.logger
                    .info(&format!("Updating existing Knative service: {}", name), None);
                let merged = merge_deep(&sanitize_existing(&existing), desired);
                self.logger.debug(
                    "merged state",
                    Some(&serde_json::json!({ "input": redact_service_input(&merged) })),
                );
                let result = self.api.update(&self.cluster_id, &merged).await?;
                Ok(self.finish(name, result, ReconcileAction::Updated))
            }
            Ok(_) => {
                self.logger
                    .info(&format!("Service {} has no existing record", name), None);
                self.create_or_update(name, desired).await
            }
            Err(err) => match classify(&err) {
                ErrorClass::NotFound => {
                    self.logger.info(
                        &format!("Service not found, creating new Knative service: {}", name),
                        None,
                    );
                    self.create_or_update(name, desired).await
                }
                ErrorClass::AlreadyExists => {
                    self.logger.info(
                        &format!("Fetch reported {} already exists, updating without merge", name),
                        None,
                    );
                    let result = self.api.update(&self.cluster_id, desired).await?;
                    Ok(self.finish(name, result, ReconcileAction::UpdatedUnmerged))
                }
                ErrorClass::Unclassified => Err(err),
            },
        }
    }

    async fn create_or_update(
        &self,
        name: &str,
        desired: &Value,
    ) -> Result<ReconcileOutcome, DeployError> {
        match self.api.create(&self.cluster_id, desired).await {
            Ok(result) => Ok(self.finish(name, result, ReconcileAction::Created)),
            Err(err) if classify(&err) == ErrorClass::AlreadyExists => {
                self.logger.warn(
                    &format!("Create of {} conflicted, falling back to update", name),
                    Some(&serde_json::json!({ "error": err.message })),
                );
                let result = self.api.update(&self.cluster_id, desired).await?;
                Ok(self.finish(name, result, ReconcileAction::UpdatedAfterConflict))
            }
            Err(err) => Err(err),
        }
    }

    fn finish(&self, name: &str, result: UpsertResult, action: ReconcileAction) -> ReconcileOutcome {
        let verb = match action {
            ReconcileAction::Created => "created",
            _ => "updated",
        };
        self.logger
            .info(&format!("Successfully {} Knative service: {}", verb, name), None);
        self.logger
            .info(&format!("Service URL: {}", result.address), None);
        ReconcileOutcome::from_upsert(result, action)
    }
}

/// Writes must target the namespace the fetch looked in, so a resolved
/// namespace is filled into inputs that do not carry one.
fn with_namespace(desired: &Value, namespace: Option<&str>) -> Value {
    let mut scoped = desired.clone();
    if let (Some(namespace), Value::Object(map)) = (namespace, &mut scoped) {
        let missing = map.get("namespace").map(Value::is_null).unwrap_or(true);
        if missing {
            map.insert(
                "namespace".to_string(),
                Value::String(namespace.to_string()),
            );
        }
    }
    scoped
}
