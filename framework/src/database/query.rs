//! Translation of parsed filters into sea-orm queries

use super::filter::{Direction, Filter, Operator, OrderBy, Where};
use super::schema::{Field, Schema};
use crate::error::FrameworkError;
use sea_orm::sea_query::SimpleExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Select,
};
use serde_json::Value as Json;

/// Build a sea-orm condition from a where-clause
///
/// Field names are resolved through the schema; an unknown name fails with
/// `InvalidFilter`.
pub fn condition<C>(schema: &Schema<C>, clause: &Where) -> Result<Condition, FrameworkError>
where
    C: ColumnTrait + Copy,
{
    match clause {
        Where::And(items) => items
            .iter()
            .try_fold(Condition::all(), |acc, item| Ok(acc.add(condition(schema, item)?))),
        Where::Or(items) if items.is_empty() => Err(FrameworkError::invalid_filter(
            "'or' needs at least one clause",
        )),
        Where::Or(items) => items
            .iter()
            .try_fold(Condition::any(), |acc, item| Ok(acc.add(condition(schema, item)?))),
        Where::Field { name, op } => {
            let field = schema.filter_field(name)?;
            Ok(Condition::all().add(expression(schema, field, op)?))
        }
    }
}

/// Condition for an optional where-clause; `None` matches everything
pub fn optional_condition<C>(
    schema: &Schema<C>,
    clause: Option<&Where>,
) -> Result<Condition, FrameworkError>
where
    C: ColumnTrait + Copy,
{
    match clause {
        Some(clause) => condition(schema, clause),
        None => Ok(Condition::all()),
    }
}

fn expression<C>(schema: &Schema<C>, field: &Field<C>, op: &Operator) -> Result<SimpleExpr, FrameworkError>
where
    C: ColumnTrait + Copy,
{
    let col = field.column;
    let value = |v: &Json| schema.coerce(field, v);
    let values = |vs: &[Json]| vs.iter().map(value).collect::<Result<Vec<_>, _>>();

    let expr = match op {
        Operator::Eq(Json::Null) => col.is_null(),
        Operator::Neq(Json::Null) => col.is_not_null(),
        Operator::Eq(v) => col.eq(value(v)?),
        Operator::Neq(v) => col.ne(value(v)?),
        Operator::Gt(v) => col.gt(value(v)?),
        Operator::Gte(v) => col.gte(value(v)?),
        Operator::Lt(v) => col.lt(value(v)?),
        Operator::Lte(v) => col.lte(value(v)?),
        Operator::Inq(vs) => col.is_in(values(vs)?),
        Operator::Nin(vs) => col.is_not_in(values(vs)?),
        Operator::Like(pattern) => col.like(pattern.as_str()),
        Operator::Nlike(pattern) => col.not_like(pattern.as_str()),
        Operator::Between(low, high) => col.between(value(low)?, value(high)?),
    };
    Ok(expr)
}

/// Apply where, order, limit and skip of `filter` to a select
///
/// Without an explicit order, rows come back by `default_order` ascending so
/// that paging is stable.
pub fn apply_filter<E>(
    select: Select<E>,
    schema: &Schema<E::Column>,
    filter: &Filter,
    default_order: E::Column,
) -> Result<Select<E>, FrameworkError>
where
    E: EntityTrait,
    E::Column: Copy,
{
    let mut select =
        select.filter(optional_condition(schema, filter.where_clause.as_ref())?);

    select = apply_order(select, schema, &filter.order)?;
    if filter.order.is_empty() {
        select = select.order_by(default_order, Order::Asc);
    }

    if let Some(limit) = filter.limit {
        select = select.limit(limit);
    }
    if let Some(skip) = filter.skip {
        select = select.offset(skip);
    }
    Ok(select)
}

fn apply_order<E>(
    mut select: Select<E>,
    schema: &Schema<E::Column>,
    order: &[OrderBy],
) -> Result<Select<E>, FrameworkError>
where
    E: EntityTrait,
    E::Column: Copy,
{
    for item in order {
        let field = schema.filter_field(&item.field)?;
        let direction = match item.direction {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        };
        select = select.order_by(field.column, direction);
    }
    Ok(select)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};
    use serde_json::json;

    mod item {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
        #[sea_orm(table_name = "items")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub title: String,
            pub color: Option<String>,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    fn schema() -> Schema<item::Column> {
        Schema::new(
            "Item",
            vec![
                Field::integer("id", item::Column::Id).generated(),
                Field::string("title", item::Column::Title).required(),
                Field::string("color", item::Column::Color),
            ],
        )
    }

    fn sql(filter: serde_json::Value) -> Result<String, FrameworkError> {
        let filter = Filter::from_json(&filter)?;
        let select = apply_filter(item::Entity::find(), &schema(), &filter, item::Column::Id)?;
        Ok(select.build(DbBackend::Sqlite).to_string())
    }

    #[test]
    fn test_equality_and_default_order() {
        let sql = sql(json!({"where": {"color": "red"}})).unwrap();
        assert!(sql.contains(r#""items"."color" = 'red'"#), "{}", sql);
        assert!(sql.ends_with(r#"ORDER BY "items"."id" ASC"#), "{}", sql);
    }

    #[test]
    fn test_null_means_is_null() {
        let sql = sql(json!({"where": {"color": null}})).unwrap();
        assert!(sql.contains(r#""items"."color" IS NULL"#), "{}", sql);
    }

    #[test]
    fn test_or_inq_and_paging() {
        let sql = sql(json!({
            "where": {"or": [{"id": {"inq": ["1", "2"]}}, {"title": {"like": "day%"}}]},
            "order": "title DESC",
            "limit": 2,
            "skip": 1
        }))
        .unwrap();
        assert!(sql.contains(r#""items"."id" IN (1, 2)"#), "{}", sql);
        assert!(sql.contains(" OR "), "{}", sql);
        assert!(sql.contains(r#""items"."title" LIKE 'day%'"#), "{}", sql);
        assert!(sql.contains(r#"ORDER BY "items"."title" DESC"#), "{}", sql);
        assert!(sql.contains("LIMIT 2"), "{}", sql);
        assert!(sql.contains("OFFSET 1"), "{}", sql);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = sql(json!({"where": {"colour": "red"}})).unwrap_err();
        assert_eq!(err.status_code(), 400);
        let err = sql(json!({"order": "colour ASC"})).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let err = sql(json!({"where": {"id": "seven"}})).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
