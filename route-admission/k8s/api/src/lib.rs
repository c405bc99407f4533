#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod route;

pub use self::route::{Route, RoutePort, RouteSpec, RouteTargetReference};
pub use k8s_openapi::{api::core::v1::Namespace, apimachinery::pkg::util::intstr::IntOrString};
pub use kube::{
    api::{Api, ObjectMeta},
    Client,
};
