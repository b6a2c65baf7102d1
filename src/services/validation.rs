use crate::constants::defaults::CONTAINER_PORT;
use crate::constants::limits::{MAX_PORT, MAX_SERVICE_NAME_LENGTH, MIN_PORT};
use crate::errors::DeployError;
use once_cell::sync::Lazy;
use regex::Regex;

static SERVICE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$").expect("service name regex"));
static CPU_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+)?m?$").expect("cpu regex"));
static MEMORY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(\.\d+)?(Ki|Mi|Gi|Ti|Pi|Ei|K|M|G|T|P|E)$").expect("memory regex")
});

#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn ensure_string(&self, value: Option<&str>, label: &str) -> Result<String, DeployError> {
        let normalized = value.map(str::trim).unwrap_or("");
        if normalized.is_empty() {
            return Err(DeployError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(normalized.to_string())
    }

    pub fn ensure_service_name(&self, value: Option<&str>) -> Result<String, DeployError> {
        let name = self.ensure_string(value, "service_name")?;
        if name.len() > MAX_SERVICE_NAME_LENGTH || !SERVICE_NAME_RE.is_match(&name) {
            return Err(DeployError::invalid_params(format!(
                "service_name \"{}\" must be a lowercase DNS label of at most {} characters",
                name, MAX_SERVICE_NAME_LENGTH
            ))
            .with_hint("Use lowercase letters, digits and '-', starting with a letter."));
        }
        Ok(name)
    }

    pub fn ensure_image(&self, value: Option<&str>) -> Result<String, DeployError> {
        let image = self.ensure_string(value, "image")?;
        if image.chars().any(char::is_whitespace) {
            return Err(DeployError::invalid_params(
                "image must not contain whitespace",
            ));
        }
        Ok(image)
    }

    /// `label` is "limits" or "requests".
    pub fn ensure_cpu(&self, label: &str, value: Option<&str>) -> Result<Option<String>, DeployError> {
        let Some(cpu) = non_empty(value) else {
            return Ok(None);
        };
        if !CPU_RE.is_match(cpu) {
            return Err(DeployError::invalid_params(format!(
                "Resource {} CPU must be in format like \"500m\", \"0.5\", or \"1\"",
                label
            )));
        }
        Ok(Some(cpu.to_string()))
    }

    pub fn ensure_memory(
        &self,
        label: &str,
        example: &str,
        value: Option<&str>,
    ) -> Result<Option<String>, DeployError> {
        let Some(memory) = non_empty(value) else {
            return Ok(None);
        };
        if !MEMORY_RE.is_match(memory) {
            return Err(DeployError::invalid_params(format!(
                "Resource {} Memory must be in format like \"{}\", \"1Gi\", etc.",
                label, example
            )));
        }
        Ok(Some(memory.to_string()))
    }

    pub fn ensure_port(&self, value: Option<&str>) -> Result<u16, DeployError> {
        let Some(raw) = non_empty(value) else {
            return Ok(CONTAINER_PORT);
        };
        let numeric = raw.parse::<i64>().map_err(|_| port_error())?;
        if numeric < MIN_PORT as i64 || numeric > MAX_PORT as i64 {
            return Err(port_error());
        }
        Ok(numeric as u16)
    }
}

pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn port_error() -> DeployError {
    DeployError::invalid_params(format!(
        "container_port must be an integer between {} and {}",
        MIN_PORT, MAX_PORT
    ))
}
