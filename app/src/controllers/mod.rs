pub mod ping;
pub mod todo;
pub mod todo_list_todos;
