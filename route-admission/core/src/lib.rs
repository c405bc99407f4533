#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod annotations;
pub mod policy;
pub mod tokens;

pub use self::{
    annotations::AnnotationKeys,
    policy::{NamespacePolicy, Verdict},
    tokens::{parse_tokens, TokenSet},
};
use anyhow::Result;
use std::collections::BTreeMap;

/// Looks up the annotations of a namespace by name.
#[async_trait::async_trait]
pub trait FetchNamespace {
    async fn namespace_annotations(&self, name: &str) -> Result<BTreeMap<String, String>>;
}
