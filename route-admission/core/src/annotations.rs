use crate::{
    policy::NamespacePolicy,
    tokens::{parse_tokens, TokenSet},
};
use std::collections::BTreeMap;

pub const DEFAULT_POLICY_DOMAIN: &str = "openshift.astrokube.io";
pub const DEFAULT_ROUTER_DOMAIN: &str = "haproxy.router.openshift.io";

/// The annotation keys that carry IP whitelist configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationKeys {
    /// Namespace annotation holding the allow list.
    pub allowed: String,

    /// Namespace annotation holding the forbidden list.
    pub forbidden: String,

    /// Namespace annotation holding the required list.
    pub required: String,

    /// Route annotation read by the router.
    pub route: String,
}

// === impl AnnotationKeys ===

impl Default for AnnotationKeys {
    fn default() -> Self {
        Self::new(DEFAULT_POLICY_DOMAIN, DEFAULT_ROUTER_DOMAIN)
    }
}

impl AnnotationKeys {
    pub fn new(policy_domain: &str, router_domain: &str) -> Self {
        Self {
            allowed: format!("{policy_domain}/route-allowed-ip-whitelist"),
            forbidden: format!("{policy_domain}/route-forbidden-ip-whitelist"),
            required: format!("{policy_domain}/route-required-ip-whitelist"),
            route: format!("{router_domain}/ip_whitelist"),
        }
    }

    /// Reads a namespace's policy from its annotations.
    pub fn namespace_policy(&self, annotations: &BTreeMap<String, String>) -> NamespacePolicy {
        let get = |key: &String| parse_tokens(annotations.get(key).map(String::as_str));
        NamespacePolicy {
            allowed: get(&self.allowed),
            forbidden: get(&self.forbidden),
            required: get(&self.required),
        }
    }

    /// Reads the tokens a route declares. A route without the annotation
    /// declares nothing.
    pub fn route_declaration(&self, annotations: &BTreeMap<String, String>) -> TokenSet {
        parse_tokens(annotations.get(&self.route).map(String::as_str)).unwrap_or_default()
    }
}
