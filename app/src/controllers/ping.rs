use crate::config::PingConfig;
use listkit::{json, Config, Request, Response};
use serde_json::{Map, Value};

/// Greeting, server time, the requested URL and the request headers
pub async fn ping(req: Request) -> Response {
    let greeting = Config::get::<PingConfig>().unwrap_or_default().greeting;

    let headers: Map<String, Value> = req
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), Value::from(v)))
        })
        .collect();

    json(serde_json::json!({
        "greeting": greeting,
        "date": chrono::Utc::now().to_rfc3339(),
        "url": req.uri().to_string(),
        "headers": headers,
    }))
}
