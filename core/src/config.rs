//! Client configuration.
//!
//! Plain data that a host application can build by hand or deserialize from
//! whatever source it keeps settings in. Nothing here reads files or the
//! environment.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Whether the client verifies the server's TLS certificate and hostname.
///
/// Applies only to the client that owns it; other clients and other HTTP
/// traffic in the process are unaffected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustPolicy {
    #[default]
    Verify,
    /// Accept any certificate for any hostname.
    AcceptInvalid,
}

impl TrustPolicy {
    pub fn from_ignore_errors(ignore: bool) -> Self {
        if ignore {
            TrustPolicy::AcceptInvalid
        } else {
            TrustPolicy::Verify
        }
    }

    pub fn ignores_errors(self) -> bool {
        self == TrustPolicy::AcceptInvalid
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// GitLab server root, e.g. `https://gitlab.example.com`.
    pub host_url: String,
    pub private_token: String,
    #[serde(default)]
    pub trust_policy: TrustPolicy,
    /// Global per-call timeout in milliseconds. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
}

fn default_max_redirects() -> u32 {
    DEFAULT_MAX_REDIRECTS
}

impl ClientConfig {
    pub fn new(host_url: &str, private_token: &str) -> Self {
        Self {
            host_url: host_url.to_string(),
            private_token: private_token.to_string(),
            trust_policy: TrustPolicy::default(),
            timeout_ms: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    pub fn trust_policy(mut self, policy: TrustPolicy) -> Self {
        self.trust_policy = policy;
        self
    }

    /// Sub-millisecond remainders round up, so only `Duration::ZERO` maps to
    /// a zero timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let mut millis = timeout.as_millis();
        if timeout.subsec_nanos() % 1_000_000 != 0 {
            millis += 1;
        }
        self.timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn max_redirects(mut self, max: u32) -> Self {
        self.max_redirects = max;
        self
    }

    pub(crate) fn timeout_duration(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> ApiResult<()> {
        if self.host_url.trim().is_empty() {
            return Err(ApiError::Config("host URL is empty".to_string()));
        }
        if self.private_token.is_empty() {
            return Err(ApiError::Config("private token is empty".to_string()));
        }
        if self.timeout_ms == Some(0) {
            return Err(ApiError::Config("timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}

// Keep the token out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host_url", &self.host_url)
            .field("private_token", &"<redacted>")
            .field("trust_policy", &self.trust_policy)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_redirects", &self.max_redirects)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_verify_certificates() {
        let config = ClientConfig::new("https://gitlab.example.com", "secret");
        assert_eq!(config.trust_policy, TrustPolicy::Verify);
        assert_eq!(config.max_redirects, 10);
        assert!(config.timeout_ms.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"host_url":"https://gitlab.example.com","private_token":"t"}"#,
        )
        .unwrap();
        assert_eq!(config, ClientConfig::new("https://gitlab.example.com", "t"));
    }

    #[test]
    fn deserializes_trust_policy() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"host_url":"https://h","private_token":"t","trust_policy":"accept_invalid","timeout_ms":5000}"#,
        )
        .unwrap();
        assert!(config.trust_policy.ignores_errors());
        assert_eq!(config.timeout_duration(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(ClientConfig::new("", "t").validate().is_err());
        assert!(ClientConfig::new("https://h", "").validate().is_err());
        let zero = ClientConfig::new("https://h", "t").timeout(Duration::ZERO);
        assert!(matches!(zero.validate(), Err(ApiError::Config(_))));
    }

    #[test]
    fn timeout_keeps_sub_second_precision() {
        let config = ClientConfig::new("https://h", "t").timeout(Duration::from_millis(1500));
        assert_eq!(config.timeout_ms, Some(1500));
        assert_eq!(config.timeout_duration(), Some(Duration::from_millis(1500)));

        let short = ClientConfig::new("https://h", "t").timeout(Duration::from_millis(10));
        assert_eq!(short.timeout_ms, Some(10));
        assert!(short.validate().is_ok());
    }

    #[test]
    fn timeout_rounds_sub_millisecond_up() {
        let config = ClientConfig::new("https://h", "t").timeout(Duration::from_micros(1200));
        assert_eq!(config.timeout_ms, Some(2));
        let tiny = ClientConfig::new("https://h", "t").timeout(Duration::from_nanos(1));
        assert_eq!(tiny.timeout_ms, Some(1));
        assert!(tiny.validate().is_ok());
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", ClientConfig::new("https://h", "glpat-supersecret"));
        assert!(!rendered.contains("supersecret"));
        assert!(rendered.contains("<redacted>"));
    }
}
