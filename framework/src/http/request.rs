use super::body::{parse_form, parse_json};
use super::query::{decode_json_param, parse_query};
use crate::database::{Filter, Where};
use crate::error::FrameworkError;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::str::FromStr;

/// HTTP Request with its body already collected
///
/// The server reads the body up front (bounded by `ServerConfig::max_body_size`)
/// so handlers, and tests building requests by hand, deal with plain bytes.
pub struct Request {
    method: http::Method,
    uri: http::Uri,
    headers: http::HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
}

impl Request {
    pub fn new(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params: HashMap::new(),
        }
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Get the request method
    pub fn method(&self) -> &http::Method {
        &self.method
    }

    /// Get the request path
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Get the full request URI
    pub fn uri(&self) -> &http::Uri {
        &self.uri
    }

    /// Get a route parameter by name (e.g., /todo-lists/{id})
    pub fn param(&self, name: &str) -> Result<&str, FrameworkError> {
        self.params
            .get(name)
            .map(|s| s.as_str())
            .ok_or_else(|| FrameworkError::param(name))
    }

    /// Get a route parameter parsed into `T`
    ///
    /// Fails with `ParamParse` (400) when the value does not parse.
    pub fn param_as<T: FromStr>(&self, name: &str) -> Result<T, FrameworkError> {
        let raw = self.param(name)?;
        raw.parse()
            .map_err(|_| FrameworkError::param_parse(raw, std::any::type_name::<T>()))
    }

    /// Get all route parameters
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Get a header value by name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all headers
    pub fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    /// Get the Content-Type header
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Decode the query string into a nested JSON object
    pub fn query(&self) -> Result<Map<String, Value>, FrameworkError> {
        match self.uri.query() {
            Some(raw) => parse_query(raw),
            None => Ok(Map::new()),
        }
    }

    /// Read the `filter` query parameter (JSON-encoded or bracket form)
    pub fn filter(&self) -> Result<Filter, FrameworkError> {
        match self.query()?.get("filter") {
            Some(raw) => Filter::from_json(&decode_json_param("filter", raw)?),
            None => Ok(Filter::default()),
        }
    }

    /// Read the `where` query parameter (JSON-encoded or bracket form)
    pub fn where_clause(&self) -> Result<Option<Where>, FrameworkError> {
        match self.query()?.get("where") {
            Some(raw) => Where::from_json(&decode_json_param("where", raw)?).map(Some),
            None => Ok(None),
        }
    }

    /// Get the raw body bytes
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parse the request body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FrameworkError> {
        parse_json(&self.body)
    }

    /// Parse the request body based on Content-Type header
    ///
    /// - `application/x-www-form-urlencoded` -> Form parsing
    /// - Otherwise -> JSON parsing (default)
    pub fn input<T: DeserializeOwned>(&self) -> Result<T, FrameworkError> {
        match self.content_type() {
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                parse_form(&self.body)
            }
            _ => parse_json(&self.body),
        }
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Request::new(parts, body)
    }
}
