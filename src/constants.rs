pub mod api {
    pub const DEFAULT_API_URL: &str = "https://gateway.cloud.rso.dev/graphql";
    pub const DEFAULT_CLUSTER_ID: &str = "toc-cluster-prod-o4";
    pub const TENANT_HEADER: &str = "x-tenant";
    pub const REQUEST_ID_HEADER: &str = "x-request-id";
    pub const USER_AGENT: &str = concat!("knative-deploy/", env!("CARGO_PKG_VERSION"));
}

pub mod defaults {
    pub const CONTAINER_PORT: u16 = 8080;
    pub const IMAGE_PULL_SECRET: &str = "regcred";
    pub const LOG_CONTEXT: &str = "knative-deploy";
}

pub mod limits {
    pub const MAX_PORT: u16 = 65_535;
    pub const MIN_PORT: u16 = 1;
    pub const MAX_SERVICE_NAME_LENGTH: usize = 63;
    pub const ERROR_BODY_SNIPPET_LENGTH: usize = 512;
}

pub mod markers {
    pub const TYPENAME_KEY: &str = "__typename";
    pub const NOT_FOUND: &str = "not found";
    pub const ALREADY_EXISTS: &str = "already exists";
    pub const SERVER_ONLY_FIELDS: &[&str] = &["status", "creationTimestamp"];
}

pub mod env {
    pub const API_URL: &str = "RSO_API_URL";
    pub const API_TOKEN: &str = "RSO_DEV_ACCESS_TOKEN";
    pub const CLOUD_TENANT: &str = "RSO_CLOUD_TENANT";
    pub const CLUSTER_ID: &str = "RSO_CLUSTER_ID";
    pub const NAMESPACE: &str = "RSO_NAMESPACE";
    pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";
    pub const GITHUB_ACTIONS: &str = "GITHUB_ACTIONS";
    pub const RUNNER_DEBUG: &str = "RUNNER_DEBUG";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

pub mod outputs {
    pub const SERVICE_URL: &str = "service_url";
    pub const REVISION_NAME: &str = "revision_name";
}
