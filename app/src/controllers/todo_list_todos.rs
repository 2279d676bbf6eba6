//! Todos scoped to one list: `/todo-lists/{id}/todos`

use crate::state::AppState;
use listkit::{json, json_of, FrameworkError, Request, Response, Where};
use serde_json::Value;

fn owned_by(list_id: i32, where_clause: Option<Where>) -> Where {
    let owner = Where::eq("todoListId", list_id);
    match where_clause {
        Some(extra) => Where::And(vec![owner, extra]),
        None => owner,
    }
}

/// `GET /todo-lists/{id}/todos?filter=`
pub async fn find(state: AppState, req: Request) -> Response {
    let id = req.param_as::<i32>("id")?;
    let filter = req.filter()?.and_where(Where::eq("todoListId", id));
    let todos = state.todos.find_with_relations(&filter).await?;
    json_of(&todos)
}

/// `POST /todo-lists/{id}/todos`
pub async fn create(state: AppState, req: Request) -> Response {
    let id = req.param_as::<i32>("id")?;
    let mut data: Value = req.json()?;
    match data.as_object_mut() {
        Some(object) => {
            object.insert("todoListId".to_string(), Value::from(id));
        }
        None => return Err(FrameworkError::bad_request("Request body must be a JSON object").into()),
    }

    let todo = state.todos.create(&data).await?;
    json_of(&todo)
}

/// `PATCH /todo-lists/{id}/todos?where=`
pub async fn update_all(state: AppState, req: Request) -> Response {
    let id = req.param_as::<i32>("id")?;
    let data: Value = req.json()?;
    if data.get("todoListId").is_some() {
        return Err(
            FrameworkError::validation("todoListId", "The todoListId field cannot be changed.")
                .into(),
        );
    }

    let where_clause = owned_by(id, req.where_clause()?);
    let count = state.todos.update_all(&data, Some(&where_clause)).await?;
    json(serde_json::json!({ "count": count }))
}

/// `DELETE /todo-lists/{id}/todos?where=`
pub async fn delete_all(state: AppState, req: Request) -> Response {
    let id = req.param_as::<i32>("id")?;
    let where_clause = owned_by(id, req.where_clause()?);
    let count = state.todos.delete_all(Some(&where_clause)).await?;
    json(serde_json::json!({ "count": count }))
}
