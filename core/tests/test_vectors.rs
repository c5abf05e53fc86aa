//! Verify URL joining and request building against JSON test vectors stored
//! in `test-vectors/`.
//!
//! Each case lists inputs and the exact request the client must build, so the
//! wire format is pinned without a running server.

use std::fmt::Display;

use gitlab_core::{GitLabApiClient, HttpMethod, HttpRequest, Params};
use serde_json::Value;

/// Path segments in the vectors are strings or integers; render them the way
/// a caller's `Display` values would be.
fn segments(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|s| match s {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

fn string_pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let arr = pair.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect()
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

// ---------------------------------------------------------------------------
// URL joining
// ---------------------------------------------------------------------------

#[test]
fn build_url_test_vectors() {
    let raw = include_str!("../../test-vectors/build_url.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let client = GitLabApiClient::new(case["host"].as_str().unwrap(), "token");

        let owned = segments(&case["segments"]);
        let path: Vec<&dyn Display> = owned.iter().map(|s| s as &dyn Display).collect();
        let url = client.build_url(&path).unwrap();

        assert_eq!(url.as_str(), case["expected"].as_str().unwrap(), "{name}");
        assert!(!url.path().contains("//"), "{name}: double slash in {url}");
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let client = GitLabApiClient::new(
        vectors["host"].as_str().unwrap(),
        vectors["token"].as_str().unwrap(),
    );

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method = parse_method(case["method"].as_str().unwrap());

        let owned = segments(&case["segments"]);
        let path: Vec<&dyn Display> = owned.iter().map(|s| s as &dyn Display).collect();
        let params: Params = string_pairs(&case["params"]).into_iter().collect();

        let req: HttpRequest = match method {
            HttpMethod::Get => client.build_get(&params, &path),
            HttpMethod::Post => client.build_post(&params, &path),
            HttpMethod::Put => client.build_put(&params, &path),
            HttpMethod::Delete => client.build_delete(&params, &path),
        }
        .unwrap();

        let expected = &case["expected_request"];
        assert_eq!(req.method, method, "{name}: method");
        assert_eq!(req.url.as_str(), expected["url"].as_str().unwrap(), "{name}: url");
        assert_eq!(req.headers, string_pairs(&expected["headers"]), "{name}: headers");
        assert_eq!(req.body.as_deref(), expected["body"].as_str(), "{name}: body");
    }
}
