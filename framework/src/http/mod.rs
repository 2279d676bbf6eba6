mod body;
mod query;
mod request;
mod response;

pub use body::{collect_body, parse_form, parse_json};
pub use query::{decode_json_param, parse_query};
pub use request::Request;
pub use response::{HttpResponse, Response, ResponseExt};

/// Create a text response
pub fn text(body: impl Into<String>) -> Response {
    Ok(HttpResponse::text(body))
}

/// Create a JSON response from a serde_json::Value
pub fn json(body: serde_json::Value) -> Response {
    Ok(HttpResponse::json(body))
}

/// Serialize any value into a JSON response
pub fn json_of<T: serde::Serialize>(body: &T) -> Response {
    let value = serde_json::to_value(body).map_err(crate::error::FrameworkError::from)?;
    Ok(HttpResponse::json(value))
}

/// Create an empty 204 No Content response
pub fn no_content() -> Response {
    Ok(HttpResponse::no_content())
}
