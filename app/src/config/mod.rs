mod ping;

pub use ping::PingConfig;

use listkit::config::env;
use listkit::{AppConfig, Config};

/// Register all application configs
///
/// Runs during boot, after `.env` files are loaded.
pub fn register_all() {
    Config::register(
        AppConfig::builder()
            .name(env("APP_NAME", "todo-lists".to_string()))
            .build(),
    );
    Config::register(PingConfig::from_env());
}
