//! GraphQL documents for the `KnativeService` schema.

macro_rules! service_selection {
    () => {
        r#"
      name
      namespace
      template {
        metadata {
          annotations { key value }
        }
        spec {
          imagePullSecrets { name }
          volumes {
            name
            persistentVolumeClaim { claimName readOnly }
            configMap { name optional defaultMode }
            secret { secretName optional defaultMode }
          }
          containers {
            image
            ports { containerPort name }
            resources {
              limits { cpu memory }
              requests { cpu memory }
            }
            env { name value }
            volumeMounts { mountPath name readOnly }
            securityContext {
              allowPrivilegeEscalation
              capabilities { add drop }
              runAsNonRoot
              seccompProfile { type localhostProfile }
              runAsUser
              runAsGroup
              readOnlyRootFilesystem
              privileged
            }
          }
        }
      }
      annotations { key value }
      creationTimestamp
      status {
        latestReadyRevisionName
        url
      }
      metadata {
        annotations { key value }
        labels { key value }
      }
"#
    };
}

pub const FETCH_OPERATION: &str = "KnativeServiceByCluster";
pub const FETCH_FIELD: &str = "knativeServiceByCluster";
pub const FETCH_SERVICE: &str = concat!(
    "query KnativeServiceByCluster($clusterId: ID!, $name: String!, $namespace: String) {\n",
    "  knativeServiceByCluster(clusterId: $clusterId, name: $name, namespace: $namespace) {",
    service_selection!(),
    "  }\n}\n"
);

pub const CREATE_OPERATION: &str = "CreateKnativeService";
pub const CREATE_FIELD: &str = "createKnativeService";
pub const CREATE_SERVICE: &str = concat!(
    "mutation CreateKnativeService($clusterId: ID!, $input: KnativeServiceInput!) {\n",
    "  createKnativeService(clusterId: $clusterId, input: $input) {",
    service_selection!(),
    "  }\n}\n"
);

pub const UPDATE_OPERATION: &str = "UpdateKnativeService";
pub const UPDATE_FIELD: &str = "updateKnativeService";
pub const UPDATE_SERVICE: &str = concat!(
    "mutation UpdateKnativeService($clusterId: ID!, $input: KnativeServiceInput!) {\n",
    "  updateKnativeService(clusterId: $clusterId, input: $input) {",
    service_selection!(),
    "  }\n}\n"
);
