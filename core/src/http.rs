//! HTTP request and response types described as plain data.
//!
//! # Design
//! `GitLabApiClient::build_*` produces an `HttpRequest` without touching the
//! network, so URL joining, header attachment and parameter encoding can be
//! inspected directly. `Transport` executes a request and hands back an
//! `HttpResponse` holding the raw status, headers and body.

use std::fmt;

use url::Url;

use crate::error::ApiResult;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-built HTTP request.
///
/// For GET/DELETE the parameters are already encoded into `url`'s query
/// string; for POST/PUT they are in `body` as a URL-encoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value whose name matches `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A raw HTTP response. No status interpretation happens in this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Borrow the body as UTF-8 text.
    pub fn text(&self) -> ApiResult<&str> {
        Ok(std::str::from_utf8(&self.body)?)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    fn response(status: u16, body: &[u8]) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_vec(),
        }
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn success_range() {
        assert!(response(200, b"").is_success());
        assert!(response(204, b"").is_success());
        assert!(!response(301, b"").is_success());
        assert!(!response(404, b"").is_success());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = response(200, b"{}");
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.header("x-total"), None);
    }

    #[test]
    fn text_rejects_invalid_utf8() {
        assert_eq!(response(200, b"[]").text().unwrap(), "[]");
        let err = response(200, &[0xff, 0xfe]).text().unwrap_err();
        assert!(matches!(err, ApiError::Body(_)));
    }
}
