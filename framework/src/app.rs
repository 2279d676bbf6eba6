//! Application lifecycle and command line
//!
//! ```rust,ignore
//! use listkit::Application;
//!
//! #[tokio::main]
//! async fn main() {
//!     let result = Application::new()
//!         .config(config::register_all)
//!         .routes(routes::register)
//!         .migrations::<migrations::Migrator>()
//!         .run()
//!         .await;
//! }
//! ```
//!
//! The lifecycle is an explicit state machine:
//!
//! ```text
//! Unconfigured --boot--> Booted --start--> Running --stop--> Stopped
//!                                             ^                 |
//!                                             +------start------+
//! ```

use crate::config::{AppConfig, Config, ServerConfig};
use crate::database::{DatabaseConfig, DbConnection};
use crate::error::FrameworkError;
use crate::logging::{self, LogConfig};
use crate::routing::Router;
use crate::server::{RunningServer, Server};
use clap::{Parser, Subcommand};
use sea_orm_migration::prelude::*;
use std::marker::PhantomData;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "app")]
#[command(about = "Application server and database utilities")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server (default command)
    Serve {
        /// Skip running migrations on startup
        #[arg(long)]
        no_migrate: bool,
    },
    /// Run pending database migrations
    Migrate,
    /// Show migration status
    #[command(name = "migrate:status")]
    MigrateStatus,
    /// Rollback the last migration(s)
    #[command(name = "migrate:rollback")]
    MigrateRollback {
        /// Number of migrations to rollback
        #[arg(default_value = "1")]
        steps: u32,
    },
    /// Drop all tables and re-run all migrations
    #[command(name = "migrate:fresh")]
    MigrateFresh,
}

/// Where an application is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unconfigured,
    Booted,
    Running,
    Stopped,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unconfigured => "unconfigured",
            Self::Booted => "booted",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

type ConfigFn = Arc<dyn Fn() + Send + Sync>;
type RoutesFn = Box<dyn FnOnce(DbConnection) -> Router + Send>;

/// Application builder and lifecycle owner
pub struct Application<M = NoMigrator>
where
    M: MigratorTrait,
{
    config_fn: Option<ConfigFn>,
    routes_fn: Option<RoutesFn>,
    database: Option<DatabaseConfig>,
    server: Option<ServerConfig>,
    migrate: bool,
    state: Lifecycle,
    db: Option<DbConnection>,
    router: Option<Arc<Router>>,
    running: Option<RunningServer>,
    _migrator: PhantomData<M>,
}

/// Placeholder type for when no migrator is configured
pub struct NoMigrator;

impl MigratorTrait for NoMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![]
    }
}

impl Application<NoMigrator> {
    pub fn new() -> Self {
        Application {
            config_fn: None,
            routes_fn: None,
            database: None,
            server: None,
            migrate: true,
            state: Lifecycle::Unconfigured,
            db: None,
            router: None,
            running: None,
            _migrator: PhantomData,
        }
    }
}

impl Default for Application<NoMigrator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Application<M>
where
    M: MigratorTrait,
{
    /// Register application config; runs during boot after `.env` is loaded
    ///
    /// Runs again if a failed boot is retried.
    pub fn config<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.config_fn = Some(Arc::new(f));
        self
    }

    /// Use this database instead of the configured one
    pub fn database(mut self, config: DatabaseConfig) -> Self {
        self.database = Some(config);
        self
    }

    /// Use these listener settings instead of the configured ones
    pub fn server(mut self, config: ServerConfig) -> Self {
        self.server = Some(config);
        self
    }

    /// The composition root: builds the router from the booted connection
    pub fn routes<F>(mut self, f: F) -> Self
    where
        F: FnOnce(DbConnection) -> Router + Send + 'static,
    {
        self.routes_fn = Some(Box::new(f));
        self
    }

    /// Configure the migrator type for database migrations
    pub fn migrations<NewM>(self) -> Application<NewM>
    where
        NewM: MigratorTrait,
    {
        Application {
            config_fn: self.config_fn,
            routes_fn: self.routes_fn,
            database: self.database,
            server: self.server,
            migrate: self.migrate,
            state: self.state,
            db: self.db,
            router: self.router,
            running: self.running,
            _migrator: PhantomData,
        }
    }

    /// Whether `boot` runs pending migrations (default: yes)
    pub fn auto_migrate(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// The connection, once booted
    pub fn db(&self) -> Option<&DbConnection> {
        self.db.as_ref()
    }

    /// The router, once booted
    pub fn router(&self) -> Option<&Router> {
        self.router.as_deref()
    }

    fn invalid(&self, action: &'static str) -> FrameworkError {
        FrameworkError::Lifecycle {
            action,
            state: self.state.to_string(),
        }
    }

    /// Load config, connect, migrate and build the router
    pub async fn boot(&mut self) -> Result<(), FrameworkError> {
        if self.state != Lifecycle::Unconfigured {
            return Err(self.invalid("boot"));
        }

        let db = self.connect().await?;
        if self.migrate {
            M::up(db.inner(), None).await?;
            tracing::info!("migrations applied");
        }

        let router = match self.routes_fn.take() {
            Some(routes) => routes(db.clone()),
            None => Router::new(),
        };

        self.db = Some(db);
        self.router = Some(Arc::new(router));
        self.state = Lifecycle::Booted;
        let app = Config::get::<AppConfig>().unwrap_or_default();
        tracing::info!(app = %app.name, env = %app.environment, "application booted");
        Ok(())
    }

    /// Bind the listener and serve in the background; returns the bound address
    pub async fn start(&mut self) -> Result<SocketAddr, FrameworkError> {
        let router = match (self.state, &self.router) {
            (Lifecycle::Booted | Lifecycle::Stopped, Some(router)) => router.clone(),
            _ => return Err(self.invalid("start")),
        };

        let config = self
            .server
            .clone()
            .or_else(Config::get::<ServerConfig>)
            .unwrap_or_default();
        let running = Server::from_config(router, &config).bind().await?;
        let addr = running.local_addr();

        self.running = Some(running);
        self.state = Lifecycle::Running;
        Ok(addr)
    }

    /// Stop serving and wait for the accept loop to finish
    pub async fn stop(&mut self) -> Result<(), FrameworkError> {
        if self.state != Lifecycle::Running {
            return Err(self.invalid("stop"));
        }
        if let Some(running) = self.running.take() {
            running.shutdown().await;
        }
        self.state = Lifecycle::Stopped;
        Ok(())
    }

    /// Load `.env`, register config, start logging and open the connection
    async fn connect(&mut self) -> Result<DbConnection, FrameworkError> {
        Config::init(Path::new("."));
        if let Some(config_fn) = &self.config_fn {
            config_fn();
        }
        logging::init(&Config::get::<LogConfig>().unwrap_or_default());

        let config = self
            .database
            .clone()
            .or_else(Config::get::<DatabaseConfig>)
            .unwrap_or_default();
        DbConnection::connect(&config).await
    }

    /// Parse the command line and run the chosen command
    ///
    /// - `serve` (default): boot, serve until Ctrl+C, stop
    /// - `migrate`, `migrate:status`, `migrate:rollback [steps]`, `migrate:fresh`
    pub async fn run(mut self) -> Result<(), FrameworkError> {
        let cli = Cli::parse();

        match cli.command.unwrap_or(Commands::Serve { no_migrate: false }) {
            Commands::Serve { no_migrate } => {
                if no_migrate {
                    self.migrate = false;
                }
                self.boot().await?;
                let addr = self.start().await?;
                println!("Server running on http://{}", addr);

                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "cannot listen for shutdown signal");
                }
                self.stop().await
            }
            Commands::Migrate => {
                let db = self.connect().await?;
                println!("Running migrations...");
                M::up(db.inner(), None).await?;
                println!("Migrations completed successfully!");
                Ok(())
            }
            Commands::MigrateStatus => {
                let db = self.connect().await?;
                println!("Migration status:");
                M::status(db.inner()).await?;
                Ok(())
            }
            Commands::MigrateRollback { steps } => {
                let db = self.connect().await?;
                println!("Rolling back {} migration(s)...", steps);
                M::down(db.inner(), Some(steps)).await?;
                println!("Rollback completed successfully!");
                Ok(())
            }
            Commands::MigrateFresh => {
                let db = self.connect().await?;
                println!("WARNING: Dropping all tables and re-running migrations...");
                M::fresh(db.inner()).await?;
                println!("Database refreshed successfully!");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{text, Request, Response};

    async fn hello(_req: Request) -> Response {
        text("hello")
    }

    fn application() -> Application {
        Application::new()
            .database(DatabaseConfig::in_memory())
            .server(ServerConfig::builder().host("127.0.0.1").port(0).build())
            .routes(|_db| Router::new().get("/", hello))
    }

    #[tokio::test]
    async fn test_start_before_boot_is_rejected() {
        let mut app = application();
        let err = app.start().await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot start application in state unconfigured");
        assert_eq!(app.state(), Lifecycle::Unconfigured);
        assert!(app.stop().await.is_err());
    }

    #[tokio::test]
    async fn test_failed_boot_can_be_retried_with_config() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let registered = Arc::new(AtomicUsize::new(0));
        let counter = registered.clone();
        let unreachable = DatabaseConfig::builder()
            .url("mysql://nobody@localhost/none")
            .build();
        let mut app = application().database(unreachable).config(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(app.boot().await.is_err());
        assert_eq!(app.state(), Lifecycle::Unconfigured);
        assert_eq!(registered.load(Ordering::SeqCst), 1);

        let mut app = app.database(DatabaseConfig::in_memory());
        app.boot().await.unwrap();
        assert_eq!(app.state(), Lifecycle::Booted);
        assert_eq!(registered.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_full_lifecycle_with_restart() {
        let mut app = application();
        app.boot().await.unwrap();
        assert_eq!(app.state(), Lifecycle::Booted);
        assert!(app.router().is_some());
        assert!(app.boot().await.is_err());

        let addr = app.start().await.unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(app.state(), Lifecycle::Running);
        assert!(app.start().await.is_err());

        app.stop().await.unwrap();
        assert_eq!(app.state(), Lifecycle::Stopped);

        app.start().await.unwrap();
        app.stop().await.unwrap();
    }
}
