use crate::constants::defaults::IMAGE_PULL_SECRET;
use crate::errors::DeployError;
use crate::managers::knative::model::{DesiredState, EnvVar, KeyValue};
use crate::services::logger::Logger;
use crate::services::validation::{non_empty, Validation};
use serde_json::Value;

/// Raw action inputs as they arrive from flags or `INPUT_*` variables.
/// Empty strings mean "not provided".
#[derive(Debug, Clone, Default)]
pub struct DeployInputs {
    pub service_name: Option<String>,
    pub image: Option<String>,
    pub namespace: Option<String>,
    pub env_vars: Option<String>,
    pub annotations: Option<String>,
    pub template_annotations: Option<String>,
    pub labels: Option<String>,
    pub resource_limits_cpu: Option<String>,
    pub resource_limits_memory: Option<String>,
    pub resource_requests_cpu: Option<String>,
    pub resource_requests_memory: Option<String>,
    pub container_port: Option<String>,
    pub port_name: Option<String>,
    pub image_pull_secret_name: Option<String>,
}

impl DeployInputs {
    pub fn to_desired_state(
        &self,
        validation: &Validation,
        logger: &Logger,
    ) -> Result<DesiredState, DeployError> {
        let name = validation.ensure_service_name(self.service_name.as_deref())?;
        let image = validation.ensure_image(self.image.as_deref())?;
        let limits_cpu = validation.ensure_cpu("limits", self.resource_limits_cpu.as_deref())?;
        let limits_memory =
            validation.ensure_memory("limits", "512Mi", self.resource_limits_memory.as_deref())?;
        let requests_cpu =
            validation.ensure_cpu("requests", self.resource_requests_cpu.as_deref())?;
        let requests_memory = validation.ensure_memory(
            "requests",
            "128Mi",
            self.resource_requests_memory.as_deref(),
        )?;
        let port = validation.ensure_port(self.container_port.as_deref())?;
        let pull_secret = non_empty(self.image_pull_secret_name.as_deref())
            .unwrap_or(IMAGE_PULL_SECRET)
            .to_string();

        Ok(DesiredState::builder(name, image)
            .namespace(owned(self.namespace.as_deref()))
            .env(parse_env_vars(self.env_vars.as_deref(), logger))
            .limits(limits_cpu, limits_memory)
            .requests(requests_cpu, requests_memory)
            .port(port, owned(self.port_name.as_deref()))
            .image_pull_secret(Some(pull_secret))
            .template_annotations(parse_key_values(
                self.template_annotations.as_deref(),
                "template_annotations",
                logger,
            ))
            .annotations(parse_key_values(
                self.annotations.as_deref(),
                "annotations",
                logger,
            ))
            .labels(parse_key_values(self.labels.as_deref(), "labels", logger))
            .build())
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

fn parse_json_input(raw: Option<&str>, label: &str, logger: &Logger) -> Option<Value> {
    let raw = non_empty(raw)?;
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            logger.warn(
                &format!("Failed to parse JSON input {}: {}", label, err),
                None,
            );
            None
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Accepts `[{"name": .., "value": ..}]` or a flat `{"NAME": "value"}` map.
pub fn parse_env_vars(raw: Option<&str>, logger: &Logger) -> Vec<EnvVar> {
    let Some(parsed) = parse_json_input(raw, "env_vars", logger) else {
        return Vec::new();
    };
    match parsed {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let name = item.get("name").and_then(Value::as_str)?.trim();
                if name.is_empty() {
                    logger.warn("Skipping env_vars entry without a name", Some(item));
                    return None;
                }
                Some(EnvVar {
                    name: name.to_string(),
                    value: item.get("value").and_then(scalar_text),
                })
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(name, value)| EnvVar {
                name: name.clone(),
                value: scalar_text(value),
            })
            .collect(),
        _ => {
            logger.warn("env_vars must be a JSON array or object; ignoring it", None);
            Vec::new()
        }
    }
}

/// Accepts `[{"key": .., "value": ..}]` or a flat `{"key": "value"}` map.
pub fn parse_key_values(raw: Option<&str>, label: &str, logger: &Logger) -> Vec<KeyValue> {
    let Some(parsed) = parse_json_input(raw, label, logger) else {
        return Vec::new();
    };
    match parsed {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let key = item.get("key").and_then(Value::as_str)?;
                Some(KeyValue {
                    key: key.to_string(),
                    value: item.get("value").and_then(scalar_text).unwrap_or_default(),
                })
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: scalar_text(value).unwrap_or_default(),
            })
            .collect(),
        _ => {
            logger.warn(
                &format!("{} must be a JSON array or object; ignoring it", label),
                None,
            );
            Vec::new()
        }
    }
}
