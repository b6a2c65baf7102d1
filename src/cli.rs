use crate::constants::api::{DEFAULT_API_URL, DEFAULT_CLUSTER_ID};
use crate::constants::defaults::LOG_CONTEXT;
use crate::constants::env::{self, GITHUB_OUTPUT};
use crate::constants::outputs::{REVISION_NAME, SERVICE_URL};
use crate::errors::DeployError;
use crate::managers::knative::client::GraphQlClient;
use crate::managers::reconcile::{ReconcileOutcome, Reconciler};
use crate::services::config::DeployConfig;
use crate::services::inputs::DeployInputs;
use crate::services::logger::Logger;
use crate::services::validation::Validation;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Create or update a Knative service through the RSO cloud gateway.
///
/// Every flag also reads the matching `INPUT_*` variable, so the binary can be
/// dropped into a GitHub Actions step unchanged.
#[derive(Clone, Parser)]
#[command(name = "knative-deploy", version)]
pub struct Args {
    #[arg(long, env = "INPUT_SERVICE_NAME")]
    pub service_name: Option<String>,
    #[arg(long, env = "INPUT_IMAGE")]
    pub image: Option<String>,
    #[arg(long, env = "INPUT_NAMESPACE")]
    pub namespace: Option<String>,
    /// JSON list of `{name, value}` or a flat JSON object.
    #[arg(long, env = "INPUT_ENV_VARS")]
    pub env_vars: Option<String>,
    /// JSON list of `{key, value}` or a flat JSON object.
    #[arg(long, env = "INPUT_ANNOTATIONS")]
    pub annotations: Option<String>,
    #[arg(long, env = "INPUT_TEMPLATE_ANNOTATIONS")]
    pub template_annotations: Option<String>,
    #[arg(long, env = "INPUT_LABELS")]
    pub labels: Option<String>,
    #[arg(long, env = "INPUT_RESOURCE_LIMITS_CPU")]
    pub resource_limits_cpu: Option<String>,
    #[arg(long, env = "INPUT_RESOURCE_LIMITS_MEMORY")]
    pub resource_limits_memory: Option<String>,
    #[arg(long, env = "INPUT_RESOURCE_REQUESTS_CPU")]
    pub resource_requests_cpu: Option<String>,
    #[arg(long, env = "INPUT_RESOURCE_REQUESTS_MEMORY")]
    pub resource_requests_memory: Option<String>,
    #[arg(long, env = "INPUT_CONTAINER_PORT")]
    pub container_port: Option<String>,
    #[arg(long, env = "INPUT_PORT_NAME")]
    pub port_name: Option<String>,
    #[arg(long, env = "INPUT_IMAGE_PULL_SECRET_NAME")]
    pub image_pull_secret_name: Option<String>,

    #[arg(long, env = env::API_URL, default_value = DEFAULT_API_URL)]
    pub api_url: String,
    #[arg(long, env = env::API_TOKEN, hide_env_values = true)]
    pub api_token: Option<String>,
    #[arg(long, env = env::CLOUD_TENANT)]
    pub tenant: Option<String>,
    #[arg(long, env = env::CLUSTER_ID, default_value = DEFAULT_CLUSTER_ID)]
    pub cluster_id: String,
    #[arg(long = "default-namespace", env = env::NAMESPACE)]
    pub default_namespace: Option<String>,
}

impl Args {
    pub fn inputs(&self) -> DeployInputs {
        DeployInputs {
            service_name: self.service_name.clone(),
            image: self.image.clone(),
            namespace: self.namespace.clone(),
            env_vars: self.env_vars.clone(),
            annotations: self.annotations.clone(),
            template_annotations: self.template_annotations.clone(),
            labels: self.labels.clone(),
            resource_limits_cpu: self.resource_limits_cpu.clone(),
            resource_limits_memory: self.resource_limits_memory.clone(),
            resource_requests_cpu: self.resource_requests_cpu.clone(),
            resource_requests_memory: self.resource_requests_memory.clone(),
            container_port: self.container_port.clone(),
            port_name: self.port_name.clone(),
            image_pull_secret_name: self.image_pull_secret_name.clone(),
        }
    }

    pub fn config(&self) -> Result<DeployConfig, DeployError> {
        DeployConfig::from_parts(
            Some(&self.api_url),
            self.api_token.as_deref(),
            self.tenant.as_deref(),
            Some(&self.cluster_id),
            self.default_namespace.as_deref(),
        )
    }
}

pub async fn run() -> Result<ReconcileOutcome, DeployError> {
    let args = Args::parse();
    let logger = Logger::new(LOG_CONTEXT);
    match deploy(&args, &logger).await {
        Ok(outcome) => {
            let target = std::env::var_os(GITHUB_OUTPUT).map(PathBuf::from);
            if let Err(err) = publish_outputs(&outcome, target.as_deref()).await {
                logger.error(&err.message, None);
                return Err(err);
            }
            Ok(outcome)
        }
        Err(err) => {
            let meta = err
                .hint
                .as_ref()
                .map(|hint| serde_json::json!({ "hint": hint }));
            logger.error(&err.message, meta.as_ref());
            Err(err)
        }
    }
}

async fn deploy(args: &Args, logger: &Logger) -> Result<ReconcileOutcome, DeployError> {
    let validation = Validation::new();
    let desired = args.inputs().to_desired_state(&validation, logger)?;
    let config = args.config()?;

    let request_id = uuid::Uuid::new_v4().to_string();
    logger.debug(
        "configuration",
        Some(&serde_json::json!({
            "request_id": request_id,
            "api_url": config.api_url.as_str(),
            "cluster_id": config.cluster_id,
            "namespace": desired.namespace().or(config.namespace.as_deref()),
        })),
    );

    let client = GraphQlClient::new(logger.clone(), &config, &request_id)?;
    let reconciler = Reconciler::new(logger.clone(), &config, Arc::new(client));
    reconciler.reconcile(&desired).await
}

fn render_output(key: &str, value: &str) -> String {
    if value.contains('\n') || value.contains('\r') {
        let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
        format!("{}<<{}\n{}\n{}\n", key, delimiter, value, delimiter)
    } else {
        format!("{}={}\n", key, value)
    }
}

/// Appends `service_url` and `revision_name` to the step output file, or
/// prints them to stdout when there is none.
pub async fn publish_outputs(
    outcome: &ReconcileOutcome,
    output_file: Option<&Path>,
) -> Result<(), DeployError> {
    let rendered = format!(
        "{}{}",
        render_output(SERVICE_URL, &outcome.service_url),
        render_output(REVISION_NAME, &outcome.revision_name)
    );
    match output_file.filter(|p| !p.as_os_str().is_empty()) {
        Some(path) => {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await
                .map_err(|err| {
                    DeployError::internal(format!(
                        "Failed to open output file {}: {}",
                        path.display(),
                        err
                    ))
                })?;
            file.write_all(rendered.as_bytes()).await?;
            file.flush().await?;
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
