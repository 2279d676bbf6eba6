use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Todos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Todos::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Todos::Title).string().not_null())
                    .col(ColumnDef::new(Todos::Desc).string().null())
                    .col(ColumnDef::new(Todos::IsComplete).boolean().null())
                    .col(ColumnDef::new(Todos::TodoListId).integer().not_null())
                    .col(ColumnDef::new(Todos::RemindAtAddress).string().null())
                    .col(ColumnDef::new(Todos::RemindAtGeo).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_todos_todo_list_id")
                            .from(Todos::Table, Todos::TodoListId)
                            .to(TodoLists::Table, TodoLists::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_todos_todo_list_id")
                    .table(Todos::Table)
                    .col(Todos::TodoListId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Todos::Table).to_owned())
            .await
    }
}

/// Table and column identifiers for todos
#[derive(DeriveIden)]
enum Todos {
    Table,
    Id,
    Title,
    Desc,
    IsComplete,
    TodoListId,
    RemindAtAddress,
    RemindAtGeo,
}

#[derive(DeriveIden)]
enum TodoLists {
    Table,
    Id,
}
