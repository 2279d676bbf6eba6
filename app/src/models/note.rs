//! Note model

use listkit::{Field, Resource, Schema};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notes")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Resource for Entity {
    type Active = ActiveModel;

    fn schema() -> Schema<Column> {
        Schema::new(
            "Note",
            vec![
                Field::integer("id", Column::Id).generated(),
                Field::string("title", Column::Title).required(),
                Field::string("content", Column::Content),
            ],
        )
    }

    fn primary_key() -> Column {
        Column::Id
    }
}
