use crate::IntOrString;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Exposes a service at a host name, served by the cluster's edge router.
///
/// Only the fields needed to recognize a well-formed route are modeled;
/// everything else in the object is ignored.
#[derive(Clone, Debug, PartialEq, CustomResource, Deserialize, Serialize)]
#[kube(
    group = "route.openshift.io",
    version = "v1",
    kind = "Route",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    pub host: Option<String>,
    pub subdomain: Option<String>,
    pub path: Option<String>,
    pub to: RouteTargetReference,
    pub alternate_backends: Option<Vec<RouteTargetReference>>,
    pub port: Option<RoutePort>,
    pub tls: Option<TlsConfig>,
    pub wildcard_policy: Option<String>,
}

/// The backend a route sends traffic to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTargetReference {
    #[serde(default = "RouteTargetReference::default_kind")]
    pub kind: String,
    pub name: String,
    pub weight: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePort {
    pub target_port: IntOrString,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    pub termination: String,
    pub insecure_edge_termination_policy: Option<String>,
}

// === impl RouteTargetReference ===

impl RouteTargetReference {
    fn default_kind() -> String {
        "Service".to_string()
    }
}
