use crate::constants::api::{DEFAULT_API_URL, DEFAULT_CLUSTER_ID};
use crate::constants::env::{API_TOKEN, CLOUD_TENANT};
use crate::errors::DeployError;
use crate::services::validation::non_empty;
use std::fmt;
use url::Url;

/// Connection settings for one deployment, resolved once at startup and
/// handed to the transport and the reconciler.
#[derive(Clone)]
pub struct DeployConfig {
    pub api_url: Url,
    pub api_token: String,
    pub tenant: String,
    pub cluster_id: String,
    pub namespace: Option<String>,
}

impl DeployConfig {
    pub fn from_parts(
        api_url: Option<&str>,
        api_token: Option<&str>,
        tenant: Option<&str>,
        cluster_id: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<Self, DeployError> {
        let tenant = non_empty(tenant).ok_or_else(|| {
            DeployError::invalid_params(format!("{} environment variable is required", CLOUD_TENANT))
        })?;
        let api_token = non_empty(api_token).ok_or_else(|| {
            DeployError::invalid_params(format!("{} environment variable is required", API_TOKEN))
        })?;

        let raw_url = non_empty(api_url).unwrap_or(DEFAULT_API_URL);
        let api_url = Url::parse(raw_url).map_err(|err| {
            DeployError::invalid_params(format!("Invalid API URL \"{}\": {}", raw_url, err))
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(DeployError::invalid_params(format!(
                "API URL must use http or https, got \"{}\"",
                api_url.scheme()
            )));
        }

        Ok(Self {
            api_url,
            api_token: api_token.to_string(),
            tenant: tenant.to_string(),
            cluster_id: non_empty(cluster_id)
                .unwrap_or(DEFAULT_CLUSTER_ID)
                .to_string(),
            namespace: non_empty(namespace).map(str::to_string),
        })
    }
}

impl fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &"[REDACTED]")
            .field("tenant", &self.tenant)
            .field("cluster_id", &self.cluster_id)
            .field("namespace", &self.namespace)
            .finish()
    }
}
