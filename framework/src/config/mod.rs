//! Configuration
//!
//! `.env` files are loaded once at startup and every typed config struct is
//! registered in a process-wide repository keyed by type:
//!
//! ```rust,no_run
//! use listkit::{Config, ServerConfig};
//!
//! Config::init(std::path::Path::new("."));
//! let server = Config::get::<ServerConfig>().unwrap_or_default();
//! println!("listening on port {}", server.port);
//! ```

pub mod env;
pub mod providers;
pub mod repository;

pub use env::{env, env_optional, load_dotenv, Environment};
pub use providers::{AppConfig, AppConfigBuilder, ServerConfig, ServerConfigBuilder};

use crate::database::DatabaseConfig;
use crate::logging::LogConfig;
use std::any::Any;
use std::path::Path;

/// Facade over the global config repository
pub struct Config;

impl Config {
    /// Load `.env` files from `project_root` and register the built-in configs
    ///
    /// Configs registered before `init` are kept; `init` only fills in
    /// the ones that are missing.
    pub fn init(project_root: &Path) -> Environment {
        let env = env::load_dotenv(project_root);

        Self::register_default(AppConfig::from_env);
        Self::register_default(ServerConfig::from_env);
        Self::register_default(DatabaseConfig::from_env);
        Self::register_default(LogConfig::from_env);

        env
    }

    fn register_default<T: Any + Send + Sync + 'static>(build: impl FnOnce() -> T) {
        if !repository::has::<T>() {
            repository::register(build());
        }
    }

    /// Get a clone of a registered config
    pub fn get<T: Any + Send + Sync + Clone + 'static>() -> Option<T> {
        repository::get::<T>()
    }

    /// Register (or replace) a config
    pub fn register<T: Any + Send + Sync + 'static>(config: T) {
        repository::register(config);
    }

    pub fn has<T: Any + 'static>() -> bool {
        repository::has::<T>()
    }

    /// The environment from `AppConfig`, or `APP_ENV` before `init`
    pub fn environment() -> Environment {
        Config::get::<AppConfig>()
            .map(|c| c.environment)
            .unwrap_or_else(Environment::detect)
    }

    pub fn is_production() -> bool {
        Self::environment().is_production()
    }

    pub fn is_debug() -> bool {
        Config::get::<AppConfig>().map(|c| c.debug).unwrap_or(true)
    }
}
