//! Generic repository over a sea-orm entity
//!
//! ```rust,ignore
//! let lists = Repository::<todo_list::Entity>::new(db.clone());
//!
//! let created = lists.create(&json!({"title": "groceries"})).await?;
//! let red = lists.count(Some(&Where::eq("color", "red"))).await?;
//! lists.update_by_id(created.id, &json!({"color": "green"})).await?;
//! ```

use super::connection::DbConnection;
use super::filter::{Filter, Where};
use super::query::{apply_filter, optional_condition};
use super::relation::{resolve, RelationResolver, WithRelations};
use super::schema::{Mode, Schema};
use crate::error::{FrameworkError, ValidationErrors};
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait,
    IdenStatic, IntoActiveModel, PaginatorTrait, QueryFilter, QuerySelect, SqlErr, Value,
};
use serde::Serialize;
use serde_json::{Map, Value as Json};
use std::marker::PhantomData;
use std::sync::Arc;

/// An entity exposed through [`Repository`]
///
/// Every resource has an integer primary key named `id`.
#[async_trait]
pub trait Resource: EntityTrait {
    type Active: ActiveModelTrait<Entity = Self> + ActiveModelBehavior + Send + Sync;

    /// Field table used for validation and filtering
    fn schema() -> Schema<Self::Column>;

    fn primary_key() -> Self::Column;

    /// Relations available to `include`
    fn relations() -> Vec<Arc<dyn RelationResolver>> {
        Vec::new()
    }

    /// Runs after validation, before a create or update is written
    async fn before_write(
        _db: &DbConnection,
        _data: &Map<String, Json>,
    ) -> Result<(), FrameworkError> {
        Ok(())
    }

    /// Runs before the given ids are deleted
    async fn before_delete(_db: &DbConnection, _ids: &[i32]) -> Result<(), FrameworkError> {
        Ok(())
    }
}

/// CRUD operations for one entity, bound to an explicit connection
pub struct Repository<E> {
    db: DbConnection,
    entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            entity: PhantomData,
        }
    }
}

impl<E> Repository<E> {
    pub fn new(db: DbConnection) -> Self {
        Self {
            db,
            entity: PhantomData,
        }
    }

    pub fn connection(&self) -> &DbConnection {
        &self.db
    }
}

impl<E> Repository<E>
where
    E: Resource,
    E::Model: Serialize + Sync + IntoActiveModel<E::Active>,
{
    pub fn schema(&self) -> Schema<E::Column> {
        E::schema()
    }

    /// Fetch one record, or `EntityNotFound`
    pub async fn find_by_id(&self, id: i32) -> Result<E::Model, FrameworkError> {
        E::find()
            .filter(E::primary_key().eq(id))
            .one(self.db.inner())
            .await?
            .ok_or_else(|| FrameworkError::not_found(E::schema().entity(), id))
    }

    /// Records matching the filter's where, order, limit and skip
    ///
    /// `include` is ignored; see [`Repository::find_with_relations`].
    pub async fn find(&self, filter: &Filter) -> Result<Vec<E::Model>, FrameworkError> {
        let select = apply_filter(E::find(), &E::schema(), filter, E::primary_key())?;
        Ok(select.all(self.db.inner()).await?)
    }

    /// Like [`Repository::find`], with the filter's `include` relations attached
    pub async fn find_with_relations(
        &self,
        filter: &Filter,
    ) -> Result<Vec<WithRelations<E::Model>>, FrameworkError> {
        let models = self.find(filter).await?;
        self.attach(models, filter).await
    }

    /// Like [`Repository::find_by_id`], with the filter's `include` relations attached
    pub async fn find_by_id_with_relations(
        &self,
        id: i32,
        filter: &Filter,
    ) -> Result<WithRelations<E::Model>, FrameworkError> {
        let model = self.find_by_id(id).await?;
        let mut attached = self.attach(vec![model], filter).await?;
        attached
            .pop()
            .ok_or_else(|| FrameworkError::not_found(E::schema().entity(), id))
    }

    async fn attach(
        &self,
        models: Vec<E::Model>,
        filter: &Filter,
    ) -> Result<Vec<WithRelations<E::Model>>, FrameworkError> {
        if filter.include.is_empty() {
            return Ok(models
                .into_iter()
                .map(|record| WithRelations {
                    record,
                    relations: Map::new(),
                })
                .collect());
        }

        let records = models
            .iter()
            .map(to_object)
            .collect::<Result<Vec<_>, _>>()?;
        let relations = resolve(
            &self.db,
            E::schema().entity(),
            &records,
            &filter.include,
            &E::relations(),
        )
        .await?;

        Ok(models
            .into_iter()
            .zip(relations)
            .map(|(record, relations)| WithRelations { record, relations })
            .collect())
    }

    /// Number of records matching `where_clause` (all records when `None`)
    pub async fn count(&self, where_clause: Option<&Where>) -> Result<u64, FrameworkError> {
        let condition = optional_condition(&E::schema(), where_clause)?;
        self.count_matching(condition).await
    }

    async fn count_matching(&self, condition: Condition) -> Result<u64, FrameworkError> {
        Ok(E::find().filter(condition).count(self.db.inner()).await?)
    }

    /// Validate and insert a new record
    pub async fn create(&self, data: &Json) -> Result<E::Model, FrameworkError> {
        let schema = E::schema();
        let data = as_object(data)?;
        let values = schema.validate(data, Mode::Create)?;

        E::before_write(&self.db, data).await?;
        self.check_unique(&schema, &values, None).await?;

        let mut active = <E::Active as ActiveModelBehavior>::new();
        for (column, value) in values.iter().cloned() {
            active.set(column, value);
        }
        let model = active
            .insert(self.db.inner())
            .await
            .map_err(|e| self.constraint_error(&schema, &values, e))?;

        tracing::debug!(entity = schema.entity(), "record created");
        Ok(model)
    }

    /// Patch every record matching `where_clause` with the fields in `data`
    ///
    /// Returns the number of records matched. Empty `data` changes nothing.
    pub async fn update_all(
        &self,
        data: &Json,
        where_clause: Option<&Where>,
    ) -> Result<u64, FrameworkError> {
        let schema = E::schema();
        let data = as_object(data)?;
        let values = schema.validate(data, Mode::Patch)?;
        let condition = optional_condition(&schema, where_clause)?;

        let matched = self.count_matching(condition.clone()).await?;
        if values.is_empty() || matched == 0 {
            return Ok(matched);
        }

        E::before_write(&self.db, data).await?;
        if self.sets_unique(&schema, &values) && matched > 1 {
            return Err(self.conflict(&schema, &values));
        }
        self.check_unique(&schema, &values, Some(condition.clone()))
            .await?;

        let affected = self.write(&schema, values, condition).await?;
        tracing::debug!(entity = schema.entity(), affected, "records updated");
        Ok(affected)
    }

    /// Patch one record; `EntityNotFound` when it does not exist
    pub async fn update_by_id(&self, id: i32, data: &Json) -> Result<(), FrameworkError> {
        self.write_by_id(id, data, Mode::Patch).await
    }

    /// Replace every writable field of one record
    ///
    /// Optional fields missing from `data` are cleared.
    pub async fn replace_by_id(&self, id: i32, data: &Json) -> Result<(), FrameworkError> {
        self.write_by_id(id, data, Mode::Replace).await
    }

    async fn write_by_id(&self, id: i32, data: &Json, mode: Mode) -> Result<(), FrameworkError> {
        let schema = E::schema();
        let data = as_object(data)?;
        let values = schema.validate(data, mode)?;
        self.find_by_id(id).await?;

        if values.is_empty() {
            return Ok(());
        }

        E::before_write(&self.db, data).await?;
        let this = Condition::all().add(E::primary_key().eq(id));
        self.check_unique(&schema, &values, Some(this.clone()))
            .await?;
        self.write(&schema, values, this).await?;

        tracing::debug!(entity = schema.entity(), id, ?mode, "record updated");
        Ok(())
    }

    async fn write(
        &self,
        schema: &Schema<E::Column>,
        values: Vec<(E::Column, Value)>,
        condition: Condition,
    ) -> Result<u64, FrameworkError> {
        let mut update = E::update_many();
        for (column, value) in values.iter().cloned() {
            update = update.col_expr(column, Expr::value(value));
        }
        let result = update
            .filter(condition)
            .exec(self.db.inner())
            .await
            .map_err(|e| self.constraint_error(schema, &values, e))?;
        Ok(result.rows_affected)
    }

    /// Delete one record; `EntityNotFound` when it does not exist
    pub async fn delete_by_id(&self, id: i32) -> Result<(), FrameworkError> {
        let entity = E::schema().entity();
        self.find_by_id(id).await?;
        E::before_delete(&self.db, &[id]).await?;

        let result = E::delete_many()
            .filter(E::primary_key().eq(id))
            .exec(self.db.inner())
            .await?;
        if result.rows_affected == 0 {
            return Err(FrameworkError::not_found(entity, id));
        }

        tracing::debug!(entity, id, "record deleted");
        Ok(())
    }

    /// Delete every record matching `where_clause`; returns how many were deleted
    pub async fn delete_all(&self, where_clause: Option<&Where>) -> Result<u64, FrameworkError> {
        let schema = E::schema();
        let condition = optional_condition(&schema, where_clause)?;

        let ids: Vec<i32> = E::find()
            .select_only()
            .column(E::primary_key())
            .filter(condition)
            .into_tuple::<i32>()
            .all(self.db.inner())
            .await?;
        if ids.is_empty() {
            return Ok(0);
        }

        E::before_delete(&self.db, &ids).await?;
        let result = E::delete_many()
            .filter(E::primary_key().is_in(ids))
            .exec(self.db.inner())
            .await?;

        tracing::debug!(
            entity = schema.entity(),
            deleted = result.rows_affected,
            "records deleted"
        );
        Ok(result.rows_affected)
    }

    fn sets_unique(&self, schema: &Schema<E::Column>, values: &[(E::Column, Value)]) -> bool {
        schema
            .unique_fields()
            .any(|field| assigned(values, field.column).is_some())
    }

    fn conflict(&self, schema: &Schema<E::Column>, values: &[(E::Column, Value)]) -> FrameworkError {
        let mut errors = ValidationErrors::new();
        for field in schema.unique_fields() {
            if assigned(values, field.column).is_some() {
                errors.add(field.name, format!("The {} has already been taken.", field.name));
            }
        }
        FrameworkError::Validation(errors)
    }

    /// Map a constraint the store rejected onto the fields being written
    ///
    /// The checks before a write can race with concurrent writers.
    fn constraint_error(
        &self,
        schema: &Schema<E::Column>,
        values: &[(E::Column, Value)],
        err: DbErr,
    ) -> FrameworkError {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) if self.sets_unique(schema, values) => {
                self.conflict(schema, values)
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                let mut errors = ValidationErrors::new();
                for field in schema.fields().iter().filter(|f| f.foreign_key) {
                    if assigned(values, field.column).is_some() {
                        errors.add(field.name, format!("The selected {} is invalid.", field.name));
                    }
                }
                if errors.is_empty() {
                    err.into()
                } else {
                    FrameworkError::Validation(errors)
                }
            }
            _ => err.into(),
        }
    }

    /// Reject values already used by a record outside `exclude`
    async fn check_unique(
        &self,
        schema: &Schema<E::Column>,
        values: &[(E::Column, Value)],
        exclude: Option<Condition>,
    ) -> Result<(), FrameworkError> {
        let mut errors = ValidationErrors::new();

        for field in schema.unique_fields() {
            let value = match assigned(values, field.column) {
                Some(value) if !is_null(value) => value.clone(),
                _ => continue,
            };

            let mut condition = Condition::all().add(field.column.eq(value));
            if let Some(exclude) = &exclude {
                condition = condition.add(exclude.clone().not());
            }
            if self.count_matching(condition).await? > 0 {
                errors.add(field.name, format!("The {} has already been taken.", field.name));
            }
        }

        errors.into_result()
    }
}

fn assigned<C: IdenStatic>(values: &[(C, Value)], column: C) -> Option<&Value> {
    values
        .iter()
        .find(|(c, _)| c.as_str() == column.as_str())
        .map(|(_, value)| value)
}

fn is_null(value: &Value) -> bool {
    matches!(
        value,
        Value::String(None) | Value::Int(None) | Value::Bool(None)
    )
}

fn as_object(data: &Json) -> Result<&Map<String, Json>, FrameworkError> {
    data.as_object()
        .ok_or_else(|| FrameworkError::bad_request("Request body must be a JSON object"))
}

fn to_object<M: Serialize>(model: &M) -> Result<Map<String, Json>, FrameworkError> {
    match serde_json::to_value(model)? {
        Json::Object(map) => Ok(map),
        _ => Err(FrameworkError::internal("record did not serialize to an object")),
    }
}
