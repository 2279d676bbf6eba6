use crate::state::AppState;
use listkit::{json_of, Request, Response};

/// `GET /todos/{id}/todo-list`
pub async fn todo_list(state: AppState, req: Request) -> Response {
    let id = req.param_as::<i32>("id")?;
    let todo = state.todos.find_by_id(id).await?;
    let list = todo.todo_list(state.db()).await?;
    json_of(&list)
}
