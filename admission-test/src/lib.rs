#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod admission;

use maplit::{btreemap, convert_args};
use route_admission_core::AnnotationKeys;
use route_admission_k8s_api::{self as k8s, Route, RouteSpec, RouteTargetReference};
use std::collections::BTreeMap;
use tracing::Instrument;

/// Runs a test with a random namespace carrying `annotations`. The namespace
/// is deleted on test completion.
pub async fn with_temp_ns<F, Fut>(annotations: BTreeMap<String, String>, test: F)
where
    F: FnOnce(kube::Client, String) -> Fut,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let _tracing = init_tracing();

    let namespace = format!("route-admission-test-{}", random_suffix(6));

    tracing::debug!("initializing client");
    let client = kube::Client::try_default()
        .await
        .expect("failed to initialize k8s client");
    let api = kube::Api::<k8s::Namespace>::all(client.clone());

    tracing::debug!(%namespace, "creating");
    let ns = k8s::Namespace {
        metadata: k8s::ObjectMeta {
            name: Some(namespace.clone()),
            labels: Some(convert_args!(btreemap!(
                "route-admission-test" => std::thread::current().name().unwrap_or(""),
            ))),
            annotations: Some(annotations),
            ..Default::default()
        },
        ..Default::default()
    };
    api.create(
        &kube::api::PostParams {
            dry_run: false,
            field_manager: Some("route-admission-test".to_string()),
        },
        &ns,
    )
    .await
    .expect("failed to create Namespace");

    tracing::trace!("spawning");
    let test = test(client.clone(), namespace.clone());
    let res = tokio::spawn(test.instrument(tracing::info_span!("test", %namespace))).await;
    if res.is_err() {
        // Stop tracing so the failure is not buried under cleanup logs.
        drop(_tracing);
    }

    tracing::debug!(%namespace, "deleting");
    api.delete(&namespace, &kube::api::DeleteParams::background())
        .await
        .expect("failed to delete Namespace");
    if let Err(err) = res {
        std::panic::resume_unwind(err.into_panic());
    }
}

/// Builds namespace annotations for the given allowed, forbidden, and required
/// lists, using the default annotation domain.
pub fn ns_policy(
    allowed: Option<&str>,
    forbidden: Option<&str>,
    required: Option<&str>,
) -> BTreeMap<String, String> {
    let keys = AnnotationKeys::default();
    [
        (keys.allowed, allowed),
        (keys.forbidden, forbidden),
        (keys.required, required),
    ]
    .into_iter()
    .filter_map(|(key, value)| Some((key, value?.to_string())))
    .collect()
}

/// Builds a route to a `web` service that declares `whitelist`.
pub fn mk_route(ns: &str, name: &str, whitelist: Option<&str>) -> Route {
    let annotations = whitelist.map(|wl| {
        std::iter::once((AnnotationKeys::default().route, wl.to_string())).collect()
    });
    Route {
        metadata: k8s::ObjectMeta {
            namespace: Some(ns.to_string()),
            name: Some(name.to_string()),
            annotations,
            ..Default::default()
        },
        spec: RouteSpec {
            host: None,
            subdomain: None,
            path: None,
            to: RouteTargetReference {
                kind: "Service".to_string(),
                name: "web".to_string(),
                weight: None,
            },
            alternate_backends: None,
            port: None,
            tls: None,
            wildcard_policy: None,
        },
    }
}

pub fn random_suffix(len: usize) -> String {
    use rand::{distributions::Alphanumeric, Rng};

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

fn init_tracing() -> tracing::subscriber::DefaultGuard {
    tracing::subscriber::set_default(
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "route_admission=trace,debug".parse().unwrap()),
            )
            .finish(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_namespace_policy_annotations() {
        let annotations = ns_policy(Some("10.0.0.1"), None, Some(""));
        assert_eq!(
            annotations,
            convert_args!(btreemap!(
                "openshift.astrokube.io/route-allowed-ip-whitelist" => "10.0.0.1",
                "openshift.astrokube.io/route-required-ip-whitelist" => "",
            ))
        );
    }

    #[test]
    fn builds_route_with_whitelist() {
        let route = mk_route("team-a", "web", Some("10.0.0.1"));
        let keys = AnnotationKeys::default();
        let annotations = route.metadata.annotations.unwrap_or_default();
        assert_eq!(
            keys.route_declaration(&annotations).to_string(),
            "10.0.0.1"
        );
        assert!(mk_route("team-a", "web", None).metadata.annotations.is_none());
    }

    #[test]
    fn random_suffix_is_lowercase() {
        let suffix = random_suffix(12);
        assert_eq!(suffix.len(), 12);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
