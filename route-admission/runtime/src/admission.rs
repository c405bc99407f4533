use crate::{
    core::{AnnotationKeys, FetchNamespace, Verdict},
    k8s::{Route, RouteSpec},
    metrics::AdmissionMetrics,
};
use anyhow::{anyhow, Result};
use futures::future;
use http_body_util::BodyExt;
use hyper::{http, Request, Response};
use kube::core::{admission::Operation, DynamicObject, Resource, ResourceExt};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, info_span, trace, warn, Instrument};

/// The path the webhook configuration posts reviews to.
pub const VALIDATE_ROUTE_PATH: &str = "/validate-route";

/// Validates the IP whitelist of routes against the policy annotated on their
/// namespace.
#[derive(Clone)]
pub struct Admission<N> {
    namespaces: N,
    keys: Arc<AnnotationKeys>,
    metrics: AdmissionMetrics,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read request body: {0}")]
    Request(BoxError),

    #[error("failed to encode json response: {0}")]
    Json(#[from] serde_json::Error),
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

type Review = kube::core::admission::AdmissionReview<DynamicObject>;
type AdmissionRequest = kube::core::admission::AdmissionRequest<DynamicObject>;
type AdmissionResponse = kube::core::admission::AdmissionResponse;
type AdmissionReview = kube::core::admission::AdmissionReview<DynamicObject>;

type Body = http_body_util::Full<bytes::Bytes>;

// === impl Admission ===

impl<N, B> tower::Service<Request<B>> for Admission<N>
where
    N: FetchNamespace + Clone + Send + Sync + 'static,
    B: hyper::body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = Response<Body>;
    type Error = Error;
    type Future = future::BoxFuture<'static, Result<Response<Body>, Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        trace!(method = %req.method(), uri = %req.uri());
        if req.method() != http::Method::POST
            || !matches!(req.uri().path(), "/" | VALIDATE_ROUTE_PATH)
        {
            return Box::pin(future::ok(empty_response(http::StatusCode::NOT_FOUND)));
        }

        let admission = self.clone();
        Box::pin(async move {
            use bytes::Buf;
            let bytes = req
                .into_body()
                .collect()
                .await
                .map_err(|error| Error::Request(error.into()))?
                .to_bytes();
            let review: Review = match serde_json::from_reader(bytes.reader()) {
                Ok(review) => review,
                Err(error) => {
                    warn!(%error, "Failed to parse request body");
                    admission.metrics.invalid();
                    return json_response(
                        bad_request(AdmissionResponse::invalid(error)).into_review(),
                    );
                }
            };
            trace!(?review);

            let req: AdmissionRequest = match review.try_into() {
                Ok(req) => req,
                Err(error) => {
                    warn!(%error, "Invalid admission request");
                    admission.metrics.invalid();
                    return json_response(
                        bad_request(AdmissionResponse::invalid(error)).into_review(),
                    );
                }
            };
            debug!(?req);

            let span = info_span!(
                "route",
                ns = req.namespace.as_deref().unwrap_or_default(),
                name = %req.name
            );
            match admission.admit(req).instrument(span).await {
                Ok(rsp) => {
                    debug!(?rsp);
                    json_response(rsp.into_review())
                }
                Err(error) => {
                    warn!(%error, "Failed to review route");
                    Ok(empty_response(http::StatusCode::INTERNAL_SERVER_ERROR))
                }
            }
        })
    }
}

impl<N: FetchNamespace> Admission<N> {
    pub fn new(namespaces: N, keys: AnnotationKeys, metrics: AdmissionMetrics) -> Self {
        Self {
            namespaces,
            keys: Arc::new(keys),
            metrics,
        }
    }

    /// Reviews a route. Fails only when the route's namespace cannot be
    /// fetched; every other outcome is a response.
    async fn admit(self, req: AdmissionRequest) -> Result<AdmissionResponse> {
        if !is_kind::<Route>(&req) {
            self.metrics.invalid();
            return Ok(bad_request(AdmissionResponse::invalid(format_args!(
                "unsupported resource type: {}.{}.{}",
                req.kind.group, req.kind.version, req.kind.kind
            ))));
        }

        let rsp = AdmissionResponse::from(&req);

        if !matches!(req.operation, Operation::Create | Operation::Update) {
            debug!(operation = ?req.operation, "Skipping review");
            self.metrics.allowed();
            return Ok(rsp);
        }

        let (ns, route) = match parse_route(req) {
            Ok(parsed) => parsed,
            Err(error) => {
                info!(%error, "Failed to parse Route");
                self.metrics.invalid();
                return Ok(bad_request(rsp.deny(error)));
            }
        };

        let ns_annotations = match self.namespaces.namespace_annotations(&ns).await {
            Ok(annotations) => annotations,
            Err(error) => {
                self.metrics.error();
                return Err(error.context(format!("failed to fetch namespace {ns}")));
            }
        };

        let policy = self.keys.namespace_policy(&ns_annotations);
        let declared = self.keys.route_declaration(route.annotations());
        debug!(?policy, %declared);

        match policy.evaluate(&declared) {
            Verdict::Allowed => {
                self.metrics.allowed();
                Ok(rsp)
            }
            Verdict::Denied { reason } => {
                info!(%reason, "Denied");
                self.metrics.denied();
                Ok(rsp.deny(reason))
            }
        }
    }
}

fn is_kind<T>(req: &AdmissionRequest) -> bool
where
    T: Resource,
    T::DynamicType: Default,
{
    let dt = Default::default();
    req.kind.group.eq_ignore_ascii_case(&T::group(&dt))
        && req.kind.kind.eq_ignore_ascii_case(&T::kind(&dt))
}

/// Decodes the route under review along with the namespace that owns it.
fn parse_route(req: AdmissionRequest) -> Result<(String, Route)> {
    let obj = req
        .object
        .ok_or_else(|| anyhow!("admission request missing 'object'"))?;

    let ns = req
        .namespace
        .or_else(|| obj.namespace())
        .ok_or_else(|| anyhow!("admission request missing 'namespace'"))?;

    let spec = {
        let data = obj
            .data
            .get("spec")
            .cloned()
            .ok_or_else(|| anyhow!("admission request missing 'spec'"))?;
        serde_json::from_value::<RouteSpec>(data)?
    };

    Ok((
        ns,
        Route {
            metadata: obj.metadata,
            spec,
        },
    ))
}

/// Marks a rejected response as a client error, distinct from a policy denial.
fn bad_request(mut rsp: AdmissionResponse) -> AdmissionResponse {
    rsp.result.code = http::StatusCode::BAD_REQUEST.as_u16();
    rsp.result.reason = "BadRequest".to_string();
    rsp
}

fn json_response(rsp: AdmissionReview) -> Result<Response<Body>, Error> {
    let bytes = serde_json::to_vec(&rsp)?;
    Ok(Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .expect("admission review response must be valid"))
}

fn empty_response(status: http::StatusCode) -> Response<Body> {
    Response::builder()
        .status(status)
        .body(Body::default())
        .expect("empty response must be valid")
}
