//! Composition root: repositories and routes from an explicit connection

use crate::controllers::{ping, todo, todo_list_todos};
use crate::state::AppState;
use listkit::{with_state, DbConnection, Router};

pub fn register(db: DbConnection) -> Router {
    let state = AppState::new(db);

    Router::new()
        .get("/ping", ping::ping)
        .resource("/todo-lists", state.todo_lists.clone())
        .resource("/todos", state.todos.clone())
        .resource("/notes", state.notes.clone())
        .get(
            "/todo-lists/{id}/todos",
            with_state(state.clone(), todo_list_todos::find),
        )
        .post(
            "/todo-lists/{id}/todos",
            with_state(state.clone(), todo_list_todos::create),
        )
        .patch(
            "/todo-lists/{id}/todos",
            with_state(state.clone(), todo_list_todos::update_all),
        )
        .delete(
            "/todo-lists/{id}/todos",
            with_state(state.clone(), todo_list_todos::delete_all),
        )
        .get("/todos/{id}/todo-list", with_state(state, todo::todo_list))
}
