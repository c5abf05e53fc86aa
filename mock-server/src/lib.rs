//! Stand-in for a GitLab server, used by the client's integration tests.
//!
//! Unknown routes echo the request back as JSON (`EchoedRequest`) so tests can
//! assert on exactly what went over the wire. A few fixed routes cover
//! authentication, redirects and error statuses.

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use url::form_urlencoded;

pub const PRIVATE_TOKEN_HEADER: &str = "private-token";

/// Size of the `/api/v3/big` body: larger than common client read limits.
pub const BIG_BODY_LEN: usize = 11 * 1024 * 1024;

/// What the server saw. Header names are lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Body decoded as `application/x-www-form-urlencoded`.
    pub form: Vec<(String, String)>,
    pub body: String,
}

impl EchoedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/api/v3/user", get(current_user))
        .route("/api/v3/moved", get(moved).post(moved).put(moved))
        .route("/api/v3/created", post(created))
        .route("/api/v3/big", get(big))
        .route("/api/v3/missing", get(missing).delete(missing))
        .fallback(echo)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn current_user(headers: HeaderMap) -> Response {
    match headers.get(PRIVATE_TOKEN_HEADER) {
        Some(_) => Json(json!({ "id": 1, "username": "root" })).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "401 Unauthorized" })),
        )
            .into_response(),
    }
}

async fn moved() -> Redirect {
    Redirect::temporary("/api/v3/projects?moved=true")
}

/// 303 after a form submission, the way GitLab answers some web-style posts.
async fn created() -> Redirect {
    Redirect::to("/api/v3/projects/99")
}

async fn big() -> Vec<u8> {
    vec![b'x'; BIG_BODY_LEN]
}

async fn missing() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "404 Not Found" })),
    )
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<EchoedRequest> {
    tracing::debug!(%method, %uri, "echoing request");
    let query = uri
        .query()
        .map(|q| decode_pairs(q.as_bytes()))
        .unwrap_or_default();
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(EchoedRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query,
        headers,
        form: decode_pairs(&body),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn decode_pairs(input: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(input).into_owned().collect()
}
