//! Authenticated request client for the GitLab REST API.
//!
//! # Design
//! Each verb is split in two: `build_*` joins the URL, attaches the
//! `PRIVATE-TOKEN` and `Accept` headers and encodes the parameters into an
//! `HttpRequest` without any I/O; `get`/`post`/`put`/`delete` build and then
//! execute through the client's `Transport`. GET and DELETE carry their
//! parameters in the query string, POST and PUT as a URL-encoded form body.

use std::fmt::{self, Display};

use url::Url;

use crate::config::{ClientConfig, TrustPolicy};
use crate::error::{ApiError, ApiResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::Params;
use crate::transport::Transport;

pub const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";
pub const API_NAMESPACE: &str = "/api/v3";

const ACCEPT_JSON: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Path segments for a call. Anything `Display` works, so ids and names mix:
/// `&[&"projects", &42, &"issues"]`.
pub type PathArgs<'a> = &'a [&'a dyn Display];

/// Blocking client bound to one GitLab server and one private token.
///
/// Safe to share across threads; the underlying agent is built on first use.
pub struct GitLabApiClient {
    base_url: String,
    private_token: String,
    transport: Transport,
}

impl GitLabApiClient {
    /// Client with default settings: certificates verified, no timeout,
    /// up to 10 redirects.
    pub fn new(host_url: &str, private_token: &str) -> Self {
        let config = ClientConfig::new(host_url, private_token);
        Self {
            base_url: api_base_url(&config.host_url),
            private_token: config.private_token.clone(),
            transport: Transport::new(&config),
        }
    }

    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;
        if config.trust_policy.ignores_errors() {
            tracing::warn!(host = %config.host_url, "client created with TLS verification disabled");
        }
        Ok(Self {
            base_url: api_base_url(&config.host_url),
            transport: Transport::new(&config),
            private_token: config.private_token,
        })
    }

    /// Host URL with the API namespace appended, e.g.
    /// `https://gitlab.example.com/api/v3`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn trust_policy(&self) -> TrustPolicy {
        self.transport.trust_policy()
    }

    pub fn ignore_certificate_errors(&self) -> bool {
        self.trust_policy().ignores_errors()
    }

    /// Accept invalid certificates and hostnames (`true`) or restore normal
    /// verification (`false`) for this client only.
    pub fn set_ignore_certificate_errors(&mut self, ignore: bool) {
        self.transport
            .set_trust_policy(TrustPolicy::from_ignore_errors(ignore));
    }

    /// Join `base_url` and `path` with `/` separators.
    pub fn build_url(&self, path: PathArgs<'_>) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        for segment in path {
            url.push('/');
            url.push_str(&segment.to_string());
        }
        Url::parse(&url).map_err(|source| ApiError::MalformedUrl { url, source })
    }

    pub fn build_get(&self, query: &Params, path: PathArgs<'_>) -> ApiResult<HttpRequest> {
        Ok(self.build_get_url(query, self.build_url(path)?))
    }

    pub fn build_post(&self, form: &Params, path: PathArgs<'_>) -> ApiResult<HttpRequest> {
        Ok(self.build_post_url(form, self.build_url(path)?))
    }

    pub fn build_put(&self, form: &Params, path: PathArgs<'_>) -> ApiResult<HttpRequest> {
        Ok(self.build_put_url(form, self.build_url(path)?))
    }

    pub fn build_delete(&self, query: &Params, path: PathArgs<'_>) -> ApiResult<HttpRequest> {
        Ok(self.build_delete_url(query, self.build_url(path)?))
    }

    pub fn build_get_url(&self, query: &Params, url: Url) -> HttpRequest {
        self.query_request(HttpMethod::Get, query, url)
    }

    pub fn build_post_url(&self, form: &Params, url: Url) -> HttpRequest {
        self.form_request(HttpMethod::Post, form, url)
    }

    pub fn build_put_url(&self, form: &Params, url: Url) -> HttpRequest {
        self.form_request(HttpMethod::Put, form, url)
    }

    pub fn build_delete_url(&self, query: &Params, url: Url) -> HttpRequest {
        self.query_request(HttpMethod::Delete, query, url)
    }

    pub fn get(&self, query: &Params, path: PathArgs<'_>) -> ApiResult<HttpResponse> {
        self.transport.execute(&self.build_get(query, path)?)
    }

    pub fn post(&self, form: &Params, path: PathArgs<'_>) -> ApiResult<HttpResponse> {
        self.transport.execute(&self.build_post(form, path)?)
    }

    pub fn put(&self, form: &Params, path: PathArgs<'_>) -> ApiResult<HttpResponse> {
        self.transport.execute(&self.build_put(form, path)?)
    }

    pub fn delete(&self, query: &Params, path: PathArgs<'_>) -> ApiResult<HttpResponse> {
        self.transport.execute(&self.build_delete(query, path)?)
    }

    pub fn get_url(&self, query: &Params, url: Url) -> ApiResult<HttpResponse> {
        self.transport.execute(&self.build_get_url(query, url))
    }

    pub fn post_url(&self, form: &Params, url: Url) -> ApiResult<HttpResponse> {
        self.transport.execute(&self.build_post_url(form, url))
    }

    pub fn put_url(&self, form: &Params, url: Url) -> ApiResult<HttpResponse> {
        self.transport.execute(&self.build_put_url(form, url))
    }

    pub fn delete_url(&self, query: &Params, url: Url) -> ApiResult<HttpResponse> {
        self.transport.execute(&self.build_delete_url(query, url))
    }

    fn query_request(&self, method: HttpMethod, query: &Params, mut url: Url) -> HttpRequest {
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        HttpRequest {
            method,
            url,
            headers: self.default_headers(),
            body: None,
        }
    }

    fn form_request(&self, method: HttpMethod, form: &Params, url: Url) -> HttpRequest {
        let mut headers = self.default_headers();
        headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
        HttpRequest {
            method,
            url,
            headers,
            body: Some(form.to_form_body()),
        }
    }

    fn default_headers(&self) -> Vec<(String, String)> {
        vec![
            (PRIVATE_TOKEN_HEADER.to_string(), self.private_token.clone()),
            ("Accept".to_string(), ACCEPT_JSON.to_string()),
        ]
    }
}

impl fmt::Debug for GitLabApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabApiClient")
            .field("base_url", &self.base_url)
            .field("private_token", &"<redacted>")
            .field("transport", &self.transport)
            .finish()
    }
}

fn api_base_url(host_url: &str) -> String {
    format!("{}{API_NAMESPACE}", host_url.trim_end_matches('/'))
}
