//! Todo model

use listkit::async_trait;
use listkit::database::{Format, RelationResolver};
use listkit::{BelongsTo, DbConnection, Field, FrameworkError, Repository, Resource, Schema};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::sync::Arc;

use super::todo_list;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "todos")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_complete: Option<bool>,
    pub todo_list_id: i32,
    /// address,city,zipcode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remind_at_address: Option<String>,
    /// latitude,longitude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remind_at_geo: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::todo_list::Entity",
        from = "Column::TodoListId",
        to = "super::todo_list::Column::Id",
        on_delete = "Cascade"
    )]
    TodoList,
}

impl Related<todo_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TodoList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[async_trait]
impl Resource for Entity {
    type Active = ActiveModel;

    fn schema() -> Schema<Column> {
        Schema::new(
            "Todo",
            vec![
                Field::integer("id", Column::Id).generated(),
                Field::string("title", Column::Title)
                    .required()
                    .max_length(255),
                Field::string("desc", Column::Desc),
                Field::boolean("isComplete", Column::IsComplete),
                Field::integer("todoListId", Column::TodoListId)
                    .required()
                    .foreign_key(),
                Field::string("remindAtAddress", Column::RemindAtAddress),
                Field::string("remindAtGeo", Column::RemindAtGeo).format(Format::GeoPoint),
            ],
        )
    }

    fn primary_key() -> Column {
        Column::Id
    }

    fn relations() -> Vec<Arc<dyn RelationResolver>> {
        vec![BelongsTo::<todo_list::Entity>::new("todoList", "todoListId")]
    }

    /// A todo must point at an existing list
    async fn before_write(db: &DbConnection, data: &Map<String, Json>) -> Result<(), FrameworkError> {
        let list_id = match data.get("todoListId").and_then(Json::as_i64) {
            Some(id) => id,
            None => return Ok(()),
        };

        let exists = match i32::try_from(list_id) {
            Ok(id) => todo_list::Entity::find_by_id(id).count(db.inner()).await? > 0,
            Err(_) => false,
        };
        if !exists {
            return Err(FrameworkError::validation(
                "todoListId",
                "The selected todoListId is invalid.",
            ));
        }
        Ok(())
    }
}

impl Model {
    /// The owning list
    pub async fn todo_list(&self, db: &DbConnection) -> Result<todo_list::Model, FrameworkError> {
        Repository::<todo_list::Entity>::new(db.clone())
            .find_by_id(self.todo_list_id)
            .await
    }
}
