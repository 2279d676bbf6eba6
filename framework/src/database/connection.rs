//! Database connection management

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;

use crate::database::config::DatabaseConfig;
use crate::error::FrameworkError;

/// Wrapper around SeaORM's DatabaseConnection
///
/// A clonable, thread-safe handle. It is created once by the application's
/// boot step and handed explicitly to every repository that needs it.
#[derive(Clone)]
pub struct DbConnection {
    inner: Arc<DatabaseConnection>,
}

impl DbConnection {
    /// Create a new database connection from config
    ///
    /// For file-backed SQLite databases the file (and its parent directory) is
    /// created if missing. In-memory SQLite databases are pinned to a single
    /// pooled connection, since every new connection would see an empty database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, FrameworkError> {
        let url = if config.is_in_memory() {
            config.url.clone()
        } else if config.url.starts_with("sqlite://") {
            let (path, query) = sqlite_path(&config.url);

            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        FrameworkError::database(format!(
                            "Cannot create database directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }

            match query {
                Some(query) => format!("sqlite:{}?{}", path, query),
                None => format!("sqlite:{}?mode=rwc", path),
            }
        } else {
            config.url.clone()
        };

        let (max, min) = if config.is_in_memory() {
            (1, 1)
        } else {
            (config.max_connections, config.min_connections)
        };

        let mut opt = ConnectOptions::new(url);
        opt.max_connections(max)
            .min_connections(min)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .sqlx_logging(config.logging);
        if config.is_in_memory() {
            // Closing the only connection would drop the database with it.
            let forever = Duration::from_secs(60 * 60 * 24 * 365);
            opt.idle_timeout(forever).max_lifetime(forever);
        }

        let conn = Database::connect(opt)
            .await
            .map_err(|e| FrameworkError::database(e.to_string()))?;

        tracing::debug!(url = %config.url, "database connected");

        Ok(Self {
            inner: Arc::new(conn),
        })
    }

    /// Get a reference to the underlying SeaORM connection
    pub fn inner(&self) -> &DatabaseConnection {
        &self.inner
    }
}

/// File path and query string of a `sqlite://` URL
fn sqlite_path(url: &str) -> (&str, Option<&str>) {
    let rest = url.trim_start_matches("sqlite://");
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query).filter(|q| !q.is_empty())),
        None => (rest, None),
    };
    (path.trim_start_matches("./"), query)
}

impl AsRef<DatabaseConnection> for DbConnection {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.inner
    }
}

impl std::ops::Deref for DbConnection {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_path_keeps_query_apart() {
        assert_eq!(sqlite_path("sqlite://./data/app.db"), ("data/app.db", None));
        assert_eq!(
            sqlite_path("sqlite://db.sqlite?mode=ro"),
            ("db.sqlite", Some("mode=ro"))
        );
        assert_eq!(sqlite_path("sqlite://data/app.db?"), ("data/app.db", None));
    }

    #[tokio::test]
    async fn test_connects_to_a_file_with_its_own_query() {
        let dir = std::env::temp_dir().join(format!("listkit-{}", std::process::id()));
        let file = dir.join("nested").join("app.db");
        let config = DatabaseConfig::builder()
            .url(format!("sqlite://{}?mode=rwc", file.display()))
            .build();

        let conn = DbConnection::connect(&config).await.unwrap();
        assert!(file.parent().map(|p| p.is_dir()).unwrap_or(false));

        drop(conn);
        let _ = std::fs::remove_dir_all(dir);
    }
}
