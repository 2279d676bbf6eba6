use listkit::config::env;

/// Settings for the `/ping` endpoint
#[derive(Debug, Clone)]
pub struct PingConfig {
    pub greeting: String,
}

impl PingConfig {
    pub fn from_env() -> Self {
        Self {
            greeting: env("PING_GREETING", "Hello from todo-lists".to_string()),
        }
    }
}

impl Default for PingConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
