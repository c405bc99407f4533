pub use route_admission_core as core;
pub use route_admission_k8s_api as k8s;

mod admission;
mod args;
mod metrics;

pub use self::{
    admission::{Admission, VALIDATE_ROUTE_PATH},
    args::Args,
    metrics::AdmissionMetrics,
};

use std::collections::BTreeMap;

/// Reads namespaces from the Kubernetes API.
#[derive(Clone)]
pub struct NamespaceLookup(k8s::Api<k8s::Namespace>);

impl NamespaceLookup {
    pub fn new(client: k8s::Client) -> Self {
        Self(k8s::Api::all(client))
    }
}

#[async_trait::async_trait]
impl core::FetchNamespace for NamespaceLookup {
    async fn namespace_annotations(&self, name: &str) -> anyhow::Result<BTreeMap<String, String>> {
        let ns = self.0.get(name).await?;
        Ok(ns.metadata.annotations.unwrap_or_default())
    }
}
