//! Blocking, authenticated request client for the GitLab REST API.
//!
//! # Overview
//! `GitLabApiClient` turns a verb, a list of path segments and a set of
//! parameters into one HTTP round-trip against `<host>/api/v3`, attaching the
//! `PRIVATE-TOKEN` header on every call. Responses come back raw: status,
//! headers and body bytes, with no status interpretation or deserialization.
//!
//! # Design
//! - `build_*` methods produce plain-data `HttpRequest` values, so URL
//!   joining and parameter encoding are testable without a network.
//! - `Transport` owns a lazily built `ureq::Agent` reused for every call.
//! - Certificate verification is a per-client `TrustPolicy`; disabling it
//!   never affects other clients in the process.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod transport;

pub use client::{GitLabApiClient, PathArgs, API_NAMESPACE, PRIVATE_TOKEN_HEADER};
pub use config::{ClientConfig, TrustPolicy};
pub use error::{ApiError, ApiResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::Params;
pub use url::Url;
