use crate::errors::DeployError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuantities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub limits: ResourceQuantities,
    pub requests: ResourceQuantities,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    pub container_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub image: String,
    pub env: Vec<EnvVar>,
    pub resources: ResourceRequirements,
    pub ports: Vec<ContainerPort>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalObjectReference {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionSpec {
    pub containers: Vec<Container>,
    pub image_pull_secrets: Vec<LocalObjectReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionMetadata {
    pub annotations: Vec<KeyValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionTemplate {
    pub metadata: RevisionMetadata,
    pub spec: RevisionSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    pub labels: Vec<KeyValue>,
}

/// The service a caller wants deployed, shaped like `KnativeServiceInput`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    template: RevisionTemplate,
    annotations: Vec<KeyValue>,
    metadata: ServiceMetadata,
}

impl DesiredState {
    pub fn builder(name: impl Into<String>, image: impl Into<String>) -> DesiredStateBuilder {
        DesiredStateBuilder::new(name.into(), image.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Wire form consumed by the merge engine and the mutations.
    pub fn to_input(&self) -> Result<Value, DeployError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Assembles a [`DesiredState`] with a single container.
#[derive(Debug, Clone)]
pub struct DesiredStateBuilder {
    name: String,
    namespace: Option<String>,
    container: Container,
    image_pull_secret: Option<String>,
    template_annotations: Vec<KeyValue>,
    annotations: Vec<KeyValue>,
    labels: Vec<KeyValue>,
}

impl DesiredStateBuilder {
    fn new(name: String, image: String) -> Self {
        Self {
            name,
            namespace: None,
            container: Container {
                image,
                env: Vec::new(),
                resources: ResourceRequirements::default(),
                ports: Vec::new(),
            },
            image_pull_secret: None,
            template_annotations: Vec::new(),
            annotations: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn env(mut self, env: Vec<EnvVar>) -> Self {
        self.container.env = env;
        self
    }

    pub fn limits(mut self, cpu: Option<String>, memory: Option<String>) -> Self {
        self.container.resources.limits = ResourceQuantities { cpu, memory };
        self
    }

    pub fn requests(mut self, cpu: Option<String>, memory: Option<String>) -> Self {
        self.container.resources.requests = ResourceQuantities { cpu, memory };
        self
    }

    pub fn port(mut self, container_port: u16, name: Option<String>) -> Self {
        self.container.ports = vec![ContainerPort {
            container_port,
            name,
        }];
        self
    }

    pub fn image_pull_secret(mut self, name: Option<String>) -> Self {
        self.image_pull_secret = name;
        self
    }

    pub fn template_annotations(mut self, annotations: Vec<KeyValue>) -> Self {
        self.template_annotations = annotations;
        self
    }

    pub fn annotations(mut self, annotations: Vec<KeyValue>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn labels(mut self, labels: Vec<KeyValue>) -> Self {
        self.labels = labels;
        self
    }

    pub fn build(self) -> DesiredState {
        DesiredState {
            name: self.name,
            namespace: self.namespace,
            template: RevisionTemplate {
                metadata: RevisionMetadata {
                    annotations: self.template_annotations,
                },
                spec: RevisionSpec {
                    containers: vec![self.container],
                    image_pull_secrets: self
                        .image_pull_secret
                        .into_iter()
                        .map(|name| LocalObjectReference { name })
                        .collect(),
                },
            },
            annotations: self.annotations,
            metadata: ServiceMetadata {
                labels: self.labels,
            },
        }
    }
}

/// What a successful create or update reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertResult {
    pub address: String,
    pub revision: String,
}
