//! TodoList model
//!
//! A named list owning zero or more todos. Deleting a list deletes its todos.

use listkit::async_trait;
use listkit::database::RelationResolver;
use listkit::{DbConnection, Field, FrameworkError, HasMany, Resource, Schema};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::todo;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "todo_lists")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::todo::Entity")]
    Todos,
}

impl Related<todo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Todos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl Resource for Entity {
    type Active = ActiveModel;

    fn schema() -> Schema<Column> {
        Schema::new(
            "TodoList",
            vec![
                Field::integer("id", Column::Id).generated(),
                Field::string("title", Column::Title)
                    .required()
                    .unique()
                    .max_length(255),
                Field::string("color", Column::Color).max_length(64),
            ],
        )
    }

    fn primary_key() -> Column {
        Column::Id
    }

    fn relations() -> Vec<Arc<dyn RelationResolver>> {
        vec![HasMany::<todo::Entity>::new("todos", "todoListId")]
    }

    async fn before_delete(db: &DbConnection, ids: &[i32]) -> Result<(), FrameworkError> {
        let result = todo::Entity::delete_many()
            .filter(todo::Column::TodoListId.is_in(ids.to_vec()))
            .exec(db.inner())
            .await?;
        if result.rows_affected > 0 {
            tracing::debug!(lists = ids.len(), todos = result.rows_affected, "cascading delete");
        }
        Ok(())
    }
}

impl Model {
    /// Lists are unique by title
    pub async fn find_by_title(
        db: &DbConnection,
        title: &str,
    ) -> Result<Option<Self>, FrameworkError> {
        Ok(Entity::find()
            .filter(Column::Title.eq(title))
            .one(db.inner())
            .await?)
    }

    pub async fn todos(&self, db: &DbConnection) -> Result<Vec<todo::Model>, FrameworkError> {
        Ok(self.find_related(todo::Entity).all(db.inner()).await?)
    }
}
