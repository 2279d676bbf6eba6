//! In-process HTTP client for tests

use crate::http::Request;
use crate::routing::Router;
use crate::server::dispatch;
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;

/// Sends requests straight through a router's dispatch
#[derive(Clone)]
pub struct TestClient {
    router: Arc<Router>,
}

impl TestClient {
    pub fn new(router: impl Into<Arc<Router>>) -> Self {
        Self {
            router: router.into(),
        }
    }

    pub fn get(&self, path: &str) -> TestRequest {
        self.request(http::Method::GET, path)
    }

    pub fn post(&self, path: &str) -> TestRequest {
        self.request(http::Method::POST, path)
    }

    pub fn patch(&self, path: &str) -> TestRequest {
        self.request(http::Method::PATCH, path)
    }

    pub fn put(&self, path: &str) -> TestRequest {
        self.request(http::Method::PUT, path)
    }

    pub fn delete(&self, path: &str) -> TestRequest {
        self.request(http::Method::DELETE, path)
    }

    fn request(&self, method: http::Method, path: &str) -> TestRequest {
        TestRequest {
            router: self.router.clone(),
            method,
            path: path.to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }
}

/// A request being built by [`TestClient`]
pub struct TestRequest {
    router: Arc<Router>,
    method: http::Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

impl TestRequest {
    /// Send `body` as `application/json`
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a raw query parameter
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter holding JSON, e.g. `filter` or `where`
    pub fn query_json(self, name: &str, value: Value) -> Self {
        let encoded = value.to_string();
        self.query(name, &encoded)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub async fn send(self) -> TestResponse {
        let mut uri = self.path;
        if !self.query.is_empty() {
            let encoded = serde_urlencoded::to_string(&self.query).unwrap_or_default();
            uri.push('?');
            uri.push_str(&encoded);
        }

        let mut builder = http::Request::builder().method(self.method).uri(uri);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let body = match self.body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Bytes::from(value.to_string())
            }
            None => Bytes::new(),
        };

        let response = match builder.body(body) {
            Ok(request) => dispatch(&self.router, Request::from(request)).await,
            Err(e) => panic!("invalid test request: {}", e),
        };

        TestResponse {
            status: response.status_code(),
            body: response.body().to_string(),
        }
    }
}

/// Status and body of a dispatched request
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: u16,
    body: String,
}

impl TestResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// The body parsed as JSON; `Value::Null` for an empty body
    pub fn json(&self) -> Value {
        if self.body.is_empty() {
            return Value::Null;
        }
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("response body is not JSON ({}): {}", e, self.body))
    }
}
