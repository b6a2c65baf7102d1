pub mod knative;
pub mod reconcile;
