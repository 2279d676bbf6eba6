//! Isolated databases for tests

use super::config::DatabaseConfig;
use super::connection::DbConnection;
use crate::error::FrameworkError;
use sea_orm_migration::MigratorTrait;

/// A private in-memory sqlite database with every migration applied
///
/// ```rust,ignore
/// let db = TestDatabase::fresh::<Migrator>().await?;
/// let lists = Repository::<todo_list::Entity>::new(db.connection());
/// ```
pub struct TestDatabase {
    conn: DbConnection,
}

impl TestDatabase {
    pub async fn fresh<M: MigratorTrait>() -> Result<Self, FrameworkError> {
        let conn = DbConnection::connect(&DatabaseConfig::in_memory()).await?;
        M::up(conn.inner(), None).await?;
        Ok(Self { conn })
    }

    /// A handle to the database, for building repositories
    pub fn connection(&self) -> DbConnection {
        self.conn.clone()
    }
}
