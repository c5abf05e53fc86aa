//! Executes `HttpRequest` values over the network with a lazily built
//! `ureq::Agent`.
//!
//! The agent is created on the first request and reused afterwards, so
//! connection pooling and keep-alive come from ureq. Changing the trust
//! policy drops the cached agent; the next request builds a fresh one.
//!
//! # Redirects
//! GET and DELETE follow redirects inside ureq. POST and PUT are sent with
//! redirects off: a 301/302/303 answer is then followed as a GET carrying the
//! same auth headers, while a 307/308 (which would require replaying the
//! body) is handed back to the caller as the response.

use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use ureq::config::Config;
use ureq::tls::TlsConfig;
use ureq::Agent;
use url::Url;

use crate::config::{ClientConfig, TrustPolicy};
use crate::error::ApiResult;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

type UreqResponse = ureq::http::Response<ureq::Body>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Settings {
    trust_policy: TrustPolicy,
    timeout: Option<Duration>,
    max_redirects: u32,
}

pub struct Transport {
    settings: Settings,
    agent: OnceLock<Agent>,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            settings: Settings {
                trust_policy: config.trust_policy,
                timeout: config.timeout_duration(),
                max_redirects: config.max_redirects,
            },
            agent: OnceLock::new(),
        }
    }

    pub fn trust_policy(&self) -> TrustPolicy {
        self.settings.trust_policy
    }

    /// Switch the trust policy for this transport only. The next request
    /// builds a new agent with the updated TLS configuration.
    pub fn set_trust_policy(&mut self, policy: TrustPolicy) {
        if policy == self.settings.trust_policy {
            return;
        }
        if policy.ignores_errors() {
            tracing::warn!("TLS certificate and hostname verification disabled for this client");
        } else {
            tracing::debug!("TLS certificate verification restored");
        }
        self.settings.trust_policy = policy;
        self.agent = OnceLock::new();
    }

    fn agent(&self) -> &Agent {
        self.agent.get_or_init(|| {
            tracing::debug!(trust_policy = ?self.settings.trust_policy, "building HTTP agent");
            Agent::new_with_config(agent_config(&self.settings))
        })
    }

    /// Perform one logical round-trip. Non-2xx statuses, including redirects
    /// that cannot be followed, are returned as data.
    pub fn execute(&self, request: &HttpRequest) -> ApiResult<HttpResponse> {
        let agent = self.agent();
        let url = request.url.as_str();
        tracing::debug!(method = %request.method, url, "sending request");

        let result = match request.method {
            HttpMethod::Get => with_headers(agent.get(url), &request.headers).call(),
            HttpMethod::Delete => with_headers(agent.delete(url), &request.headers).call(),
            HttpMethod::Post => self.send_form(agent.post(url), request),
            HttpMethod::Put => self.send_form(agent.put(url), request),
        };
        let mut response = result.inspect_err(|e| {
            tracing::debug!(method = %request.method, url, error = %e, "request failed");
        })?;

        if matches!(request.method, HttpMethod::Post | HttpMethod::Put) {
            let location = response
                .headers()
                .get("location")
                .and_then(|value| value.to_str().ok());
            if let Some(target) = see_other_target(&request.url, response.status().as_u16(), location) {
                if self.settings.max_redirects > 0 {
                    tracing::debug!(method = %request.method, from = url, to = %target, "following redirect as GET");
                    response = self.follow_as_get(&target, request)?;
                }
            }
        }

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;
        tracing::debug!(method = %request.method, url, status, "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn send_form(
        &self,
        builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
        request: &HttpRequest,
    ) -> Result<UreqResponse, ureq::Error> {
        let builder = with_headers(builder, &request.headers)
            .config()
            .max_redirects(0)
            .build();
        match request.body.as_deref() {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        }
    }

    /// The follow-up hop keeps the auth headers but drops the body and its
    /// content type.
    fn follow_as_get(&self, target: &Url, request: &HttpRequest) -> Result<UreqResponse, ureq::Error> {
        let headers: Vec<(String, String)> = request
            .headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("content-type"))
            .cloned()
            .collect();
        with_headers(self.agent().get(target.as_str()), &headers)
            .config()
            .max_redirects(self.settings.max_redirects - 1)
            .build()
            .call()
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("settings", &self.settings)
            .field("initialized", &self.agent.get().is_some())
            .finish()
    }
}

/// Target of a 301/302/303 answer, resolved against the request URL.
fn see_other_target(request_url: &Url, status: u16, location: Option<&str>) -> Option<Url> {
    if !matches!(status, 301..=303) {
        return None;
    }
    request_url.join(location?).ok()
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn agent_config(settings: &Settings) -> Config {
    let tls = TlsConfig::builder()
        .disable_verification(settings.trust_policy.ignores_errors())
        .build();
    Agent::config_builder()
        .http_status_as_error(false)
        .max_redirects(settings.max_redirects)
        .timeout_global(settings.timeout)
        .tls_config(tls)
        .build()
}
