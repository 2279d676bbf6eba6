//! listkit: a small REST and persistence kit for CRUD services
//!
//! Entities describe themselves once (a sea-orm entity plus a [`Resource`]
//! schema), and the kit provides the repository, the JSON
//! `filter`/`where` query language, relation inclusion, the standard REST
//! routes and an application lifecycle around them.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod http;
pub mod logging;
pub mod routing;
pub mod server;
pub mod testing;

pub use app::{Application, Lifecycle, NoMigrator};
pub use config::{AppConfig, Config, Environment, ServerConfig};
pub use database::{
    BelongsTo, DatabaseConfig, DbConnection, Field, Filter, HasMany, Repository, Resource,
    Schema, Where,
};
pub use error::{FrameworkError, ValidationErrors};
pub use http::{json, json_of, no_content, text, HttpResponse, Request, Response, ResponseExt};
pub use logging::LogConfig;
pub use routing::{with_state, Router};
pub use server::{RunningServer, Server};

// Re-exported so applications build entities and migrations against the same versions
pub use async_trait::async_trait;
pub use sea_orm;
pub use sea_orm_migration;
