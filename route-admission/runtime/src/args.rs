use crate::{
    admission::Admission,
    core::{
        annotations::{DEFAULT_POLICY_DOMAIN, DEFAULT_ROUTER_DOMAIN},
        AnnotationKeys,
    },
    metrics::AdmissionMetrics,
    NamespaceLookup,
};
use anyhow::{bail, ensure, Result};
use clap::Parser;
use prometheus_client::registry::Registry;
use tracing::info;

#[derive(Debug, Parser)]
#[clap(
    name = "route-admission",
    about = "Validates Route IP whitelists against namespace policy"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "route_admission=info,warn",
        env = "ROUTE_ADMISSION_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    server: kubert::ServerArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Domain of the namespace annotations that configure route IP whitelist
    /// policy.
    #[clap(long, default_value = DEFAULT_POLICY_DOMAIN)]
    policy_annotation_domain: AnnotationDomain,

    /// Domain of the router's IP whitelist annotation on routes.
    #[clap(long, default_value = DEFAULT_ROUTER_DOMAIN)]
    route_annotation_domain: AnnotationDomain,
}

/// The prefix of an annotation key, e.g. `haproxy.router.openshift.io`.
#[derive(Clone, Debug, PartialEq, Eq)]
struct AnnotationDomain(String);

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            server,
            policy_annotation_domain: AnnotationDomain(policy_domain),
            route_annotation_domain: AnnotationDomain(router_domain),
        } = self;

        let mut prom = <Registry>::default();
        let metrics = AdmissionMetrics::register(prom.sub_registry_with_prefix("route_admission"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .with_optional_server(Some(server))
            .build()
            .await?;

        let keys = AnnotationKeys::new(&policy_domain, &router_domain);
        info!(
            allowed = %keys.allowed,
            forbidden = %keys.forbidden,
            required = %keys.required,
            route = %keys.route,
            "Validating route IP whitelists"
        );

        let admission = Admission::new(NamespaceLookup::new(runtime.client()), keys, metrics);
        let runtime = runtime.spawn_server(move || admission);

        // Block the main thread on the shutdown signal. Once it fires, wait for the background tasks to
        // complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}

impl std::str::FromStr for AnnotationDomain {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        ensure!(!s.is_empty(), "annotation domain must not be empty");
        ensure!(
            !s.contains('/') && !s.contains(char::is_whitespace),
            "invalid annotation domain: {s:?}"
        );
        Ok(Self(s.to_string()))
    }
}
