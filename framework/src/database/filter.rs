//! Structured query filters
//!
//! A [`Filter`] is the parsed form of the JSON `filter` accepted by list
//! endpoints:
//!
//! ```json
//! {
//!     "where": {"color": "red", "or": [{"title": "a"}, {"title": {"like": "b%"}}]},
//!     "include": [{"relation": "todos", "scope": {"order": "title ASC"}}],
//!     "order": ["title DESC"],
//!     "limit": 10,
//!     "skip": 20
//! }
//! ```
//!
//! Parsing only checks shape. Field names and value types are checked
//! against an entity's schema when the filter is translated into a query.

use crate::error::FrameworkError;
use serde_json::{Map, Value};

/// Parsed query filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub where_clause: Option<Where>,
    pub include: Vec<Inclusion>,
    pub order: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
}

/// A where-predicate tree
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    /// Every child must match; an empty list matches everything
    And(Vec<Where>),
    /// At least one child must match
    Or(Vec<Where>),
    /// A comparison on one declared field
    Field { name: String, op: Operator },
}

/// Comparison applied to a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Eq(Value),
    Neq(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    Inq(Vec<Value>),
    Nin(Vec<Value>),
    Like(String),
    Nlike(String),
    Between(Value, Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// An include directive: eagerly attach a named relation
#[derive(Debug, Clone, PartialEq)]
pub struct Inclusion {
    pub relation: String,
    pub scope: Option<Box<Filter>>,
}

impl Inclusion {
    pub fn new(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            scope: None,
        }
    }
}

impl Filter {
    /// Parse a filter object
    pub fn from_json(value: &Value) -> Result<Self, FrameworkError> {
        let object = match value {
            Value::Object(object) => object,
            Value::Null => return Ok(Self::default()),
            _ => return Err(FrameworkError::invalid_filter("filter must be an object")),
        };

        let mut filter = Filter::default();
        for (key, value) in object {
            match key.as_str() {
                "where" => filter.where_clause = Some(Where::from_json(value)?),
                "include" => filter.include = parse_include(value)?,
                "order" => filter.order = parse_order(value)?,
                "limit" => filter.limit = parse_count("limit", value)?,
                "skip" | "offset" => filter.skip = parse_count(key, value)?,
                // Field projection is accepted but not applied.
                "fields" => {}
                other => {
                    return Err(FrameworkError::invalid_filter(format!(
                        "unknown filter key '{}'",
                        other
                    )))
                }
            }
        }
        Ok(filter)
    }

    /// A filter with only a where-clause
    pub fn with_where(where_clause: Where) -> Self {
        Self {
            where_clause: Some(where_clause),
            ..Self::default()
        }
    }

    /// Add `extra` to this filter's where-clause with AND
    pub fn and_where(mut self, extra: Where) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => Where::And(vec![existing, extra]),
            None => extra,
        });
        self
    }
}

impl Where {
    /// Parse a where object
    pub fn from_json(value: &Value) -> Result<Self, FrameworkError> {
        let object = match value {
            Value::Object(object) => object,
            _ => return Err(FrameworkError::invalid_filter("where must be an object")),
        };

        let mut clauses = Vec::with_capacity(object.len());
        for (key, value) in object {
            match key.as_str() {
                "and" | "or" => {
                    let items = as_list(key, value)?
                        .iter()
                        .map(Where::from_json)
                        .collect::<Result<Vec<_>, _>>()?;
                    clauses.push(if key == "and" {
                        Where::And(items)
                    } else {
                        Where::Or(items)
                    });
                }
                field => clauses.push(Where::Field {
                    name: field.to_string(),
                    op: parse_operator(field, value)?,
                }),
            }
        }

        Ok(if clauses.len() == 1 {
            clauses.remove(0)
        } else {
            Where::And(clauses)
        })
    }

    /// Shorthand for `{field: value}`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Where::Field {
            name: field.into(),
            op: Operator::Eq(value.into()),
        }
    }

    /// Shorthand for `{field: {inq: values}}`
    pub fn inq(field: impl Into<String>, values: Vec<Value>) -> Self {
        Where::Field {
            name: field.into(),
            op: Operator::Inq(values),
        }
    }
}

fn parse_operator(field: &str, value: &Value) -> Result<Operator, FrameworkError> {
    let object = match value {
        Value::Object(object) => object,
        other => return Ok(Operator::Eq(other.clone())),
    };

    if object.len() != 1 {
        return Err(FrameworkError::invalid_filter(format!(
            "condition on '{}' must have exactly one operator",
            field
        )));
    }

    let (name, operand) = object.iter().next().ok_or_else(|| {
        FrameworkError::invalid_filter(format!("empty condition on '{}'", field))
    })?;

    let op = match name.as_str() {
        "eq" => Operator::Eq(operand.clone()),
        "neq" => Operator::Neq(operand.clone()),
        "gt" => Operator::Gt(operand.clone()),
        "gte" => Operator::Gte(operand.clone()),
        "lt" => Operator::Lt(operand.clone()),
        "lte" => Operator::Lte(operand.clone()),
        "inq" => Operator::Inq(as_list(name, operand)?.clone()),
        "nin" => Operator::Nin(as_list(name, operand)?.clone()),
        "like" => Operator::Like(as_pattern(field, operand)?),
        "nlike" => Operator::Nlike(as_pattern(field, operand)?),
        "between" => match as_list(name, operand)?.as_slice() {
            [low, high] => Operator::Between(low.clone(), high.clone()),
            _ => {
                return Err(FrameworkError::invalid_filter(format!(
                    "between on '{}' takes exactly two values",
                    field
                )))
            }
        },
        other => {
            return Err(FrameworkError::invalid_filter(format!(
                "unknown operator '{}' on '{}'",
                other, field
            )))
        }
    };
    Ok(op)
}

fn as_list<'a>(key: &str, value: &'a Value) -> Result<&'a Vec<Value>, FrameworkError> {
    value
        .as_array()
        .ok_or_else(|| FrameworkError::invalid_filter(format!("'{}' takes an array", key)))
}

fn as_pattern(field: &str, value: &Value) -> Result<String, FrameworkError> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        FrameworkError::invalid_filter(format!("like pattern on '{}' must be a string", field))
    })
}

fn parse_count(key: &str, value: &Value) -> Result<Option<u64>, FrameworkError> {
    let invalid = || {
        FrameworkError::invalid_filter(format!("'{}' must be a non-negative integer", key))
    };
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_u64().map(Some).ok_or_else(invalid),
        Value::String(s) => s.trim().parse::<u64>().map(Some).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn parse_order(value: &Value) -> Result<Vec<OrderBy>, FrameworkError> {
    match value {
        Value::String(s) => Ok(vec![parse_order_item(s)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| FrameworkError::invalid_filter("order entries must be strings"))
                    .and_then(parse_order_item)
            })
            .collect(),
        _ => Err(FrameworkError::invalid_filter(
            "order must be a string or an array of strings",
        )),
    }
}

fn parse_order_item(item: &str) -> Result<OrderBy, FrameworkError> {
    let mut parts = item.split_whitespace();
    let field = parts
        .next()
        .ok_or_else(|| FrameworkError::invalid_filter("empty order entry"))?;
    let direction = match parts.next().map(str::to_ascii_uppercase).as_deref() {
        None | Some("ASC") => Direction::Asc,
        Some("DESC") => Direction::Desc,
        Some(other) => {
            return Err(FrameworkError::invalid_filter(format!(
                "unknown order direction '{}'",
                other
            )))
        }
    };
    if parts.next().is_some() {
        return Err(FrameworkError::invalid_filter(format!(
            "malformed order entry '{}'",
            item
        )));
    }
    Ok(OrderBy {
        field: field.to_string(),
        direction,
    })
}

fn parse_include(value: &Value) -> Result<Vec<Inclusion>, FrameworkError> {
    match value {
        Value::String(name) => Ok(vec![Inclusion::new(name.clone())]),
        Value::Object(object) => Ok(vec![parse_inclusion_object(object)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(name) => Ok(Inclusion::new(name.clone())),
                Value::Object(object) => parse_inclusion_object(object),
                _ => Err(FrameworkError::invalid_filter(
                    "include entries must be relation names or objects",
                )),
            })
            .collect(),
        _ => Err(FrameworkError::invalid_filter(
            "include must be a string, an object or an array",
        )),
    }
}

fn parse_inclusion_object(object: &Map<String, Value>) -> Result<Inclusion, FrameworkError> {
    let relation = object
        .get("relation")
        .and_then(Value::as_str)
        .ok_or_else(|| FrameworkError::invalid_filter("include entry needs a 'relation' name"))?;
    let scope = match object.get("scope") {
        Some(scope) => Some(Box::new(Filter::from_json(scope)?)),
        None => None,
    };
    Ok(Inclusion {
        relation: relation.to_string(),
        scope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_equality_shorthand() {
        let parsed = Where::from_json(&json!({"color": "red"})).unwrap();
        assert_eq!(parsed, Where::eq("color", "red"));
    }

    #[test]
    fn test_multiple_fields_are_anded() {
        let parsed = Where::from_json(&json!({"color": "red", "title": "a"})).unwrap();
        match parsed {
            Where::And(items) => assert_eq!(items.len(), 2),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_operators() {
        let parsed = Where::from_json(&json!({
            "or": [
                {"id": {"inq": [1, 2]}},
                {"title": {"like": "day%"}},
                {"id": {"between": [3, 9]}}
            ]
        }))
        .unwrap();

        assert_eq!(
            parsed,
            Where::Or(vec![
                Where::inq("id", vec![json!(1), json!(2)]),
                Where::Field {
                    name: "title".into(),
                    op: Operator::Like("day%".into())
                },
                Where::Field {
                    name: "id".into(),
                    op: Operator::Between(json!(3), json!(9))
                },
            ])
        );
    }

    #[test]
    fn test_bad_operators() {
        assert!(Where::from_json(&json!({"id": {"near": 1}})).is_err());
        assert!(Where::from_json(&json!({"id": {"gt": 1, "lt": 3}})).is_err());
        assert!(Where::from_json(&json!({"id": {"between": [1]}})).is_err());
        assert!(Where::from_json(&json!({"and": {"id": 1}})).is_err());
        assert!(Where::from_json(&json!("id")).is_err());
    }

    #[test]
    fn test_full_filter() {
        let filter = Filter::from_json(&json!({
            "where": {"color": "black"},
            "include": [{"relation": "todos", "scope": {"order": "title DESC"}}],
            "order": ["title ASC", "id desc"],
            "limit": 5,
            "offset": "10"
        }))
        .unwrap();

        assert_eq!(filter.where_clause, Some(Where::eq("color", "black")));
        assert_eq!(filter.include.len(), 1);
        assert_eq!(filter.include[0].relation, "todos");
        let scope = filter.include[0].scope.as_ref().unwrap();
        assert_eq!(scope.order[0].direction, Direction::Desc);
        assert_eq!(
            filter.order,
            vec![
                OrderBy { field: "title".into(), direction: Direction::Asc },
                OrderBy { field: "id".into(), direction: Direction::Desc },
            ]
        );
        assert_eq!(filter.limit, Some(5));
        assert_eq!(filter.skip, Some(10));
    }

    #[test]
    fn test_include_shorthands() {
        let a = Filter::from_json(&json!({"include": "todos"})).unwrap();
        let b = Filter::from_json(&json!({"include": ["todos"]})).unwrap();
        let c = Filter::from_json(&json!({"include": [{"relation": "todos"}]})).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_counts() {
        assert!(Filter::from_json(&json!({"sort": "id"})).is_err());
        assert!(Filter::from_json(&json!({"limit": -1})).is_err());
        assert!(Filter::from_json(&json!({"limit": "many"})).is_err());
        assert!(Filter::from_json(&json!({"order": "id sideways"})).is_err());
        assert!(Filter::from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_and_where() {
        let filter = Filter::with_where(Where::eq("color", "red")).and_where(Where::eq("todoListId", 3));
        assert_eq!(
            filter.where_clause,
            Some(Where::And(vec![Where::eq("color", "red"), Where::eq("todoListId", 3)]))
        );
        let filter = Filter::default().and_where(Where::eq("todoListId", 3));
        assert_eq!(filter.where_clause, Some(Where::eq("todoListId", 3)));
    }
}
