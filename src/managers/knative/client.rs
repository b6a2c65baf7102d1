use super::documents::{
    CREATE_FIELD, CREATE_OPERATION, CREATE_SERVICE, FETCH_FIELD, FETCH_OPERATION, FETCH_SERVICE,
    UPDATE_FIELD, UPDATE_OPERATION, UPDATE_SERVICE,
};
use super::model::UpsertResult;
use super::ServiceApi;
use crate::constants::api::{REQUEST_ID_HEADER, TENANT_HEADER, USER_AGENT};
use crate::constants::limits::ERROR_BODY_SNIPPET_LENGTH;
use crate::errors::{DeployError, GraphQlError};
use crate::services::config::DeployConfig;
use crate::services::logger::Logger;
use crate::utils::redact::redact_text;
use crate::utils::sanitize::is_absent_record;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// `ServiceApi` over the tenant's GraphQL gateway.
#[derive(Clone)]
pub struct GraphQlClient {
    logger: Logger,
    client: Client,
    endpoint: Url,
    token: String,
}

impl GraphQlClient {
    pub fn new(logger: Logger, config: &DeployConfig, request_id: &str) -> Result<Self, DeployError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
            .map_err(|_| DeployError::invalid_params("API token contains invalid header characters"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let tenant = HeaderValue::from_str(&config.tenant)
            .map_err(|_| DeployError::invalid_params("Tenant contains invalid header characters"))?;
        headers.insert(HeaderName::from_static(TENANT_HEADER), tenant);

        if let Ok(value) = HeaderValue::from_str(request_id) {
            headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|err| DeployError::internal(format!("Failed to build HTTP client: {}", err)))?;

        Ok(Self {
            logger: logger.child("graphql"),
            client,
            endpoint: config.api_url.clone(),
            token: config.api_token.clone(),
        })
    }

    async fn execute(
        &self,
        operation: &str,
        query: &str,
        field: &str,
        variables: Value,
    ) -> Result<Value, GraphQlError> {
        self.logger.debug(
            "request",
            Some(&serde_json::json!({ "operation": operation, "endpoint": self.endpoint.as_str() })),
        );
        let body = serde_json::json!({
            "operationName": operation,
            "query": query,
            "variables": variables,
        });
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        self.logger.debug(
            "response",
            Some(&serde_json::json!({ "operation": operation, "status": status })),
        );
        parse_graphql_response(status, &text, field, &[self.token.as_str()])
    }

    fn upsert_result(&self, operation: &str, record: &Value) -> UpsertResult {
        let (result, missing) = read_upsert_result(record);
        if !missing.is_empty() {
            self.logger.warn(
                &format!("{} response did not include {}", operation, missing.join(", ")),
                None,
            );
        }
        result
    }
}

#[async_trait]
impl ServiceApi for GraphQlClient {
    async fn fetch(
        &self,
        cluster_id: &str,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Option<Value>, DeployError> {
        let record = self
            .execute(
                FETCH_OPERATION,
                FETCH_SERVICE,
                FETCH_FIELD,
                serde_json::json!({
                    "clusterId": cluster_id,
                    "name": name,
                    "namespace": namespace,
                }),
            )
            .await?;
        Ok(if is_absent_record(&record) {
            None
        } else {
            Some(record)
        })
    }

    async fn create(&self, cluster_id: &str, input: &Value) -> Result<UpsertResult, DeployError> {
        let record = self
            .execute(
                CREATE_OPERATION,
                CREATE_SERVICE,
                CREATE_FIELD,
                serde_json::json!({ "clusterId": cluster_id, "input": input }),
            )
            .await?;
        if record.is_null() {
            return Err(GraphQlError::MissingData(CREATE_FIELD.to_string()).into());
        }
        Ok(self.upsert_result(CREATE_OPERATION, &record))
    }

    async fn update(&self, cluster_id: &str, input: &Value) -> Result<UpsertResult, DeployError> {
        let record = self
            .execute(
                UPDATE_OPERATION,
                UPDATE_SERVICE,
                UPDATE_FIELD,
                serde_json::json!({ "clusterId": cluster_id, "input": input }),
            )
            .await?;
        if record.is_null() {
            return Err(GraphQlError::MissingData(UPDATE_FIELD.to_string()).into());
        }
        Ok(self.upsert_result(UPDATE_OPERATION, &record))
    }
}

fn error_messages(parsed: &Value) -> Vec<String> {
    parsed
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .map(|err| {
                    err.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| err.to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Turns a raw gateway reply into the value of `data.<field>`.
///
/// Auth failures win over everything else; otherwise GraphQL `errors[]` are
/// reported as-is even on non-2xx statuses so their text stays classifiable.
pub(crate) fn parse_graphql_response(
    status: u16,
    body: &str,
    field: &str,
    secrets: &[&str],
) -> Result<Value, GraphQlError> {
    let snippet = || redact_text(body.trim(), ERROR_BODY_SNIPPET_LENGTH, secrets);
    if status == 401 || status == 403 {
        return Err(GraphQlError::Http {
            status,
            body: snippet(),
        });
    }

    let parsed = match serde_json::from_str::<Value>(body) {
        Ok(parsed) => parsed,
        Err(_) if !(200..300).contains(&status) => {
            return Err(GraphQlError::Http {
                status,
                body: snippet(),
            })
        }
        Err(err) => return Err(GraphQlError::Decode(err)),
    };

    let messages = error_messages(&parsed);
    if !messages.is_empty() {
        return Err(GraphQlError::Errors(messages));
    }
    if !(200..300).contains(&status) {
        return Err(GraphQlError::Http {
            status,
            body: snippet(),
        });
    }

    parsed
        .get("data")
        .and_then(Value::as_object)
        .and_then(|data| data.get(field))
        .cloned()
        .ok_or_else(|| GraphQlError::MissingData(field.to_string()))
}

/// Reads `status.url` and `status.latestReadyRevisionName`; absent values come
/// back as empty strings alongside the list of what was missing.
pub(crate) fn read_upsert_result(record: &Value) -> (UpsertResult, Vec<&'static str>) {
    let status = record.get("status");
    let read = |key: &str| {
        status
            .and_then(|s| s.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let mut missing = Vec::new();
    let address = read("url").unwrap_or_else(|| {
        missing.push("status.url");
        String::new()
    });
    let revision = read("latestReadyRevisionName").unwrap_or_else(|| {
        missing.push("status.latestReadyRevisionName");
        String::new()
    });
    (UpsertResult { address, revision }, missing)
}

#[cfg(test)]
mod tests {
    use super::{parse_graphql_response, read_upsert_result};
    use crate::errors::GraphQlError;
    use serde_json::json;

    #[test]
    fn returns_requested_field() {
        let body = r#"{"data":{"knativeServiceByCluster":{"name":"svc-a"}}}"#;
        let value = parse_graphql_response(200, body, "knativeServiceByCluster", &[]).unwrap();
        assert_eq!(value, json!({ "name": "svc-a" }));
    }

    #[test]
    fn null_field_is_returned_as_null() {
        let body = r#"{"data":{"knativeServiceByCluster":null}}"#;
        let value = parse_graphql_response(200, body, "knativeServiceByCluster", &[]).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn graphql_errors_surface_their_messages() {
        let body = r#"{"errors":[{"message":"service svc-a not found"}],"data":null}"#;
        match parse_graphql_response(200, body, "knativeServiceByCluster", &[]) {
            Err(GraphQlError::Errors(messages)) => {
                assert_eq!(messages, vec!["service svc-a not found".to_string()])
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn graphql_errors_on_error_status_are_still_messages() {
        let body = r#"{"errors":[{"message":"service already exists"}]}"#;
        assert!(matches!(
            parse_graphql_response(400, body, "createKnativeService", &[]),
            Err(GraphQlError::Errors(_))
        ));
    }

    #[test]
    fn auth_failures_redact_the_token() {
        let body = "invalid token tok-abcdef123456";
        match parse_graphql_response(401, body, "x", &["tok-abcdef123456"]) {
            Err(GraphQlError::Http { status, body }) => {
                assert_eq!(status, 401);
                assert!(!body.contains("tok-abcdef123456"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn non_json_server_errors_are_http_errors() {
        assert!(matches!(
            parse_graphql_response(502, "<html>bad gateway</html>", "x", &[]),
            Err(GraphQlError::Http { status: 502, .. })
        ));
        assert!(matches!(
            parse_graphql_response(200, "<html>", "x", &[]),
            Err(GraphQlError::Decode(_))
        ));
    }

    #[test]
    fn missing_data_field_is_reported() {
        assert!(matches!(
            parse_graphql_response(200, r#"{"data":{}}"#, "updateKnativeService", &[]),
            Err(GraphQlError::MissingData(_))
        ));
    }

    #[test]
    fn upsert_result_reads_status() {
        let (result, missing) = read_upsert_result(&json!({
            "status": { "url": "https://svc-a.example", "latestReadyRevisionName": "svc-a-00001" }
        }));
        assert_eq!(result.address, "https://svc-a.example");
        assert_eq!(result.revision, "svc-a-00001");
        assert!(missing.is_empty());

        let (result, missing) = read_upsert_result(&json!({
            "status": { "url": "https://svc-a.example", "latestReadyRevisionName": null }
        }));
        assert_eq!(result.revision, "");
        assert_eq!(missing, vec!["status.latestReadyRevisionName"]);
    }
}
