//! Repositories shared by the handlers, built once from the connection

use crate::models::{note, todo, todo_list};
use listkit::{DbConnection, Repository};

#[derive(Clone)]
pub struct AppState {
    pub todo_lists: Repository<todo_list::Entity>,
    pub todos: Repository<todo::Entity>,
    pub notes: Repository<note::Entity>,
}

impl AppState {
    pub fn new(db: DbConnection) -> Self {
        Self {
            todo_lists: Repository::new(db.clone()),
            todos: Repository::new(db.clone()),
            notes: Repository::new(db),
        }
    }

    pub fn db(&self) -> &DbConnection {
        self.todos.connection()
    }
}
