#![allow(dead_code)]

use async_trait::async_trait;
use knative_deploy::errors::DeployError;
use knative_deploy::managers::knative::model::UpsertResult;
use knative_deploy::managers::knative::ServiceApi;
use knative_deploy::services::config::DeployConfig;
use knative_deploy::services::logger::{LogLevel, Logger};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex as StdMutex;
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch {
        cluster_id: String,
        name: String,
        namespace: Option<String>,
    },
    Create(Value),
    Update(Value),
}

/// Scripted `ServiceApi` that records every call it receives.
pub struct RecordingApi {
    fetch_result: StdMutex<Option<Result<Option<Value>, DeployError>>>,
    create_results: StdMutex<VecDeque<Result<UpsertResult, DeployError>>>,
    update_results: StdMutex<VecDeque<Result<UpsertResult, DeployError>>>,
    calls: StdMutex<Vec<Call>>,
}

pub fn upsert(address: &str, revision: &str) -> UpsertResult {
    UpsertResult {
        address: address.to_string(),
        revision: revision.to_string(),
    }
}

impl RecordingApi {
    pub fn new(fetch_result: Result<Option<Value>, DeployError>) -> Self {
        Self {
            fetch_result: StdMutex::new(Some(fetch_result)),
            create_results: StdMutex::new(VecDeque::new()),
            update_results: StdMutex::new(VecDeque::new()),
            calls: StdMutex::new(Vec::new()),
        }
    }

    pub fn on_create(self, result: Result<UpsertResult, DeployError>) -> Self {
        self.create_results.lock().unwrap().push_back(result);
        self
    }

    pub fn on_update(self, result: Result<UpsertResult, DeployError>) -> Self {
        self.update_results.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(input) => Some(input),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update(input) => Some(input),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ServiceApi for RecordingApi {
    async fn fetch(
        &self,
        cluster_id: &str,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Option<Value>, DeployError> {
        self.calls.lock().unwrap().push(Call::Fetch {
            cluster_id: cluster_id.to_string(),
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
        });
        self.fetch_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(DeployError::internal("fetch called twice")))
    }

    async fn create(&self, _cluster_id: &str, input: &Value) -> Result<UpsertResult, DeployError> {
        self.calls.lock().unwrap().push(Call::Create(input.clone()));
        self.create_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(upsert("https://created.example", "created-00001")))
    }

    async fn update(&self, _cluster_id: &str, input: &Value) -> Result<UpsertResult, DeployError> {
        self.calls.lock().unwrap().push(Call::Update(input.clone()));
        self.update_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(upsert("https://updated.example", "updated-00002")))
    }
}

pub fn test_config() -> DeployConfig {
    test_config_at("http://localhost:4000/graphql", None)
}

pub fn test_config_at(api_url: &str, namespace: Option<&str>) -> DeployConfig {
    DeployConfig::from_parts(
        Some(api_url),
        Some("test-token"),
        Some("test-tenant"),
        Some("test-cluster"),
        namespace,
    )
    .expect("test config")
}

pub fn quiet_logger() -> Logger {
    Logger::new("test").with_level(LogLevel::Error)
}
