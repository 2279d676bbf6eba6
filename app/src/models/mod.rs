pub mod note;
pub mod todo;
pub mod todo_list;
