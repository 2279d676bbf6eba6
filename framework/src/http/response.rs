use bytes::Bytes;
use http_body_util::Full;

/// HTTP Response builder
#[derive(Debug)]
pub struct HttpResponse {
    status: u16,
    body: String,
    headers: Vec<(String, String)>,
}

/// Response type alias - allows using `?` operator for early returns
pub type Response = Result<HttpResponse, HttpResponse>;

impl HttpResponse {
    pub fn new() -> Self {
        Self {
            status: 200,
            body: String::new(),
            headers: Vec::new(),
        }
    }

    /// Create a response with a string body
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
        }
    }

    /// Create a JSON response from a serde_json::Value
    pub fn json(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        }
    }

    /// Create an empty 204 No Content response
    pub fn no_content() -> Self {
        Self::new().status(204)
    }

    /// Set the HTTP status code
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a header to the response
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Wrap this response in Ok() for use as Response type
    pub fn ok(self) -> Response {
        Ok(self)
    }

    /// The status code
    pub fn status_code(&self) -> u16 {
        self.status
    }

    /// The response body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Look up a header value by name (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Convert to hyper response
    pub fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let mut builder = hyper::Response::builder().status(self.status);

        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "invalid response head");
                let mut fallback = hyper::Response::new(Full::new(Bytes::new()));
                *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension trait for Response to enable method chaining
pub trait ResponseExt {
    fn status(self, code: u16) -> Self;
    fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self;
}

impl ResponseExt for Response {
    fn status(self, code: u16) -> Self {
        self.map(|r| r.status(code))
    }

    fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map(|r| r.header(name, value))
    }
}

/// Auto-convert FrameworkError to HttpResponse
///
/// This enables using the `?` operator in controller handlers to propagate
/// framework errors as appropriate HTTP responses.
impl From<crate::error::FrameworkError> for HttpResponse {
    fn from(err: crate::error::FrameworkError) -> HttpResponse {
        let status = err.status_code();
        let body = match &err {
            crate::error::FrameworkError::Validation(errors) => errors.to_json(),
            crate::error::FrameworkError::Database(_) | crate::error::FrameworkError::Internal { .. } => {
                tracing::error!(error = %err, "request failed");
                serde_json::json!({ "error": "Internal Server Error" })
            }
            _ => serde_json::json!({ "error": err.to_string() }),
        };
        HttpResponse::json(body).status(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameworkError;

    #[test]
    fn test_error_conversion() {
        let response = HttpResponse::from(FrameworkError::not_found("TodoList", 99999));
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.header_value("content-type"), Some("application/json"));
        assert!(response.body().contains("TodoList with id 99999"));

        let response = HttpResponse::from(FrameworkError::validation("title", "required"));
        assert_eq!(response.status_code(), 422);
        assert!(response.body().contains("The given data was invalid."));
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let response = HttpResponse::from(FrameworkError::database("UNIQUE constraint failed"));
        assert_eq!(response.status_code(), 500);
        assert!(!response.body().contains("UNIQUE"));
    }

    #[test]
    fn test_into_hyper() {
        let response = HttpResponse::no_content().into_hyper();
        assert_eq!(response.status(), 204);
    }
}
