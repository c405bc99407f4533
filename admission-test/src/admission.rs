use crate::with_temp_ns;
use route_admission_k8s_api::Route;
use std::collections::BTreeMap;

/// Creates the route built by `f` in a namespace annotated with `ns_annotations`
/// and expects it to be admitted.
pub async fn accepts<F>(ns_annotations: BTreeMap<String, String>, f: F)
where
    F: FnOnce(String) -> Route + Send + 'static,
{
    with_temp_ns(ns_annotations, |client, ns| async move {
        let api = kube::Api::<Route>::namespaced(client, &ns);
        let route = f(ns);
        let res = api.create(&kube::api::PostParams::default(), &route).await;
        res.expect("resource must apply");
    })
    .await;
}

/// Creates the route built by `f` in a namespace annotated with `ns_annotations`
/// and expects the webhook to deny it with a message containing `reason`.
pub async fn rejects<F>(ns_annotations: BTreeMap<String, String>, reason: &'static str, f: F)
where
    F: FnOnce(String) -> Route + Send + 'static,
{
    with_temp_ns(ns_annotations, move |client, ns| async move {
        let api = kube::Api::<Route>::namespaced(client, &ns);
        let route = f(ns);
        let res = api.create(&kube::api::PostParams::default(), &route).await;
        let error = res.expect_err("resource must not apply");
        assert!(
            error.to_string().contains(reason),
            "{error} must mention {reason:?}"
        );
    })
    .await;
}
