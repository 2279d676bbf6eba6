//! REST controllers shared by every repository-backed resource
//!
//! `Router::resource("/todo-lists", repo)` registers:
//!
//! | Method | Path             | Result                      |
//! |--------|------------------|-----------------------------|
//! | POST   | `/todo-lists`       | 200, created record      |
//! | GET    | `/todo-lists`       | 200, records (`?filter=`) |
//! | GET    | `/todo-lists/count` | 200, `{count}` (`?where=`) |
//! | PATCH  | `/todo-lists`       | 200, `{count}` (`?where=`) |
//! | GET    | `/todo-lists/{id}`  | 200, record (`?filter=`) |
//! | PATCH  | `/todo-lists/{id}`  | 204                      |
//! | PUT    | `/todo-lists/{id}`  | 204                      |
//! | DELETE | `/todo-lists/{id}`  | 204                      |

use super::router::{with_state, Router};
use crate::database::{Repository, Resource};
use crate::http::{json, json_of, no_content, Request, Response};
use sea_orm::IntoActiveModel;
use serde::Serialize;
use serde_json::Value;

impl Router {
    /// Register the standard CRUD routes for a repository under `path`
    pub fn resource<E>(self, path: &str, repo: Repository<E>) -> Self
    where
        E: Resource + 'static,
        E::Model: Serialize + Sync + IntoActiveModel<E::Active>,
    {
        let item = format!("{}/{{id}}", path);
        self.post(path, with_state(repo.clone(), create::<E>))
            .get(path, with_state(repo.clone(), find::<E>))
            .get(&format!("{}/count", path), with_state(repo.clone(), count::<E>))
            .patch(path, with_state(repo.clone(), update_all::<E>))
            .get(&item, with_state(repo.clone(), find_by_id::<E>))
            .patch(&item, with_state(repo.clone(), update_by_id::<E>))
            .put(&item, with_state(repo.clone(), replace_by_id::<E>))
            .delete(&item, with_state(repo, delete_by_id::<E>))
    }
}

pub async fn create<E>(repo: Repository<E>, req: Request) -> Response
where
    E: Resource,
    E::Model: Serialize + Sync + IntoActiveModel<E::Active>,
{
    let data: Value = req.json()?;
    let created = repo.create(&data).await?;
    json_of(&created)
}

pub async fn find<E>(repo: Repository<E>, req: Request) -> Response
where
    E: Resource,
    E::Model: Serialize + Sync + IntoActiveModel<E::Active>,
{
    let filter = req.filter()?;
    let records = repo.find_with_relations(&filter).await?;
    json_of(&records)
}

pub async fn count<E>(repo: Repository<E>, req: Request) -> Response
where
    E: Resource,
    E::Model: Serialize + Sync + IntoActiveModel<E::Active>,
{
    let where_clause = req.where_clause()?;
    let count = repo.count(where_clause.as_ref()).await?;
    json(serde_json::json!({ "count": count }))
}

pub async fn update_all<E>(repo: Repository<E>, req: Request) -> Response
where
    E: Resource,
    E::Model: Serialize + Sync + IntoActiveModel<E::Active>,
{
    let where_clause = req.where_clause()?;
    let data: Value = req.json()?;
    let count = repo.update_all(&data, where_clause.as_ref()).await?;
    json(serde_json::json!({ "count": count }))
}

pub async fn find_by_id<E>(repo: Repository<E>, req: Request) -> Response
where
    E: Resource,
    E::Model: Serialize + Sync + IntoActiveModel<E::Active>,
{
    let id = req.param_as::<i32>("id")?;
    let filter = req.filter()?;
    let record = repo.find_by_id_with_relations(id, &filter).await?;
    json_of(&record)
}

pub async fn update_by_id<E>(repo: Repository<E>, req: Request) -> Response
where
    E: Resource,
    E::Model: Serialize + Sync + IntoActiveModel<E::Active>,
{
    let id = req.param_as::<i32>("id")?;
    let data: Value = req.json()?;
    repo.update_by_id(id, &data).await?;
    no_content()
}

pub async fn replace_by_id<E>(repo: Repository<E>, req: Request) -> Response
where
    E: Resource,
    E::Model: Serialize + Sync + IntoActiveModel<E::Active>,
{
    let id = req.param_as::<i32>("id")?;
    let data: Value = req.json()?;
    repo.replace_by_id(id, &data).await?;
    no_content()
}

pub async fn delete_by_id<E>(repo: Repository<E>, req: Request) -> Response
where
    E: Resource,
    E::Model: Serialize + Sync + IntoActiveModel<E::Active>,
{
    let id = req.param_as::<i32>("id")?;
    repo.delete_by_id(id).await?;
    no_content()
}
