//! Per-entity field tables
//!
//! A [`Schema`] maps every JSON field an entity exposes to its sea-orm
//! column, together with the rules applied to incoming data. The same table
//! drives body validation for create/patch/replace and value coercion for
//! where-clauses.
//!
//! ```rust,ignore
//! Schema::new("TodoList", vec![
//!     Field::integer("id", Column::Id).generated(),
//!     Field::string("title", Column::Title).required().unique(),
//!     Field::string("color", Column::Color),
//! ])
//! ```

use crate::error::{FrameworkError, ValidationErrors};
use sea_orm::Value;
use serde_json::{Map, Value as Json};
use validator::ValidateLength;

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Boolean,
}

impl FieldType {
    fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Boolean => "a boolean",
        }
    }

    fn null(self) -> Value {
        match self {
            Self::String => Value::String(None),
            Self::Integer => Value::Int(None),
            Self::Boolean => Value::Bool(None),
        }
    }
}

/// Extra format rules for string fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `"lat,long"` with latitude in [-90, 90] and longitude in [-180, 180]
    GeoPoint,
}

/// How incoming data is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Required fields must be present
    Create,
    /// Only the given fields change; nothing is required
    Patch,
    /// Required fields must be present; absent optional fields are cleared
    Replace,
}

/// One field of an entity
#[derive(Debug, Clone)]
pub struct Field<C> {
    pub name: &'static str,
    pub column: C,
    pub ty: FieldType,
    pub required: bool,
    pub generated: bool,
    pub unique: bool,
    /// References another entity's primary key
    pub foreign_key: bool,
    pub max_length: Option<u64>,
    pub format: Option<Format>,
}

impl<C> Field<C> {
    fn new(name: &'static str, column: C, ty: FieldType) -> Self {
        Self {
            name,
            column,
            ty,
            required: false,
            generated: false,
            unique: false,
            foreign_key: false,
            max_length: None,
            format: None,
        }
    }

    pub fn string(name: &'static str, column: C) -> Self {
        Self::new(name, column, FieldType::String)
    }

    pub fn integer(name: &'static str, column: C) -> Self {
        Self::new(name, column, FieldType::Integer)
    }

    pub fn boolean(name: &'static str, column: C) -> Self {
        Self::new(name, column, FieldType::Boolean)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Assigned by the database; never accepted from clients
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn foreign_key(mut self) -> Self {
        self.foreign_key = true;
        self
    }

    pub fn max_length(mut self, max: u64) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }
}

/// The field table of one entity
#[derive(Debug, Clone)]
pub struct Schema<C> {
    entity: &'static str,
    fields: Vec<Field<C>>,
}

impl<C: Copy> Schema<C> {
    pub fn new(entity: &'static str, fields: Vec<Field<C>>) -> Self {
        Self { entity, fields }
    }

    /// Entity name used in error messages
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn fields(&self) -> &[Field<C>] {
        &self.fields
    }

    /// Look up a field by its JSON name
    pub fn field(&self, name: &str) -> Option<&Field<C>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by name, failing with `InvalidFilter` when unknown
    pub fn filter_field(&self, name: &str) -> Result<&Field<C>, FrameworkError> {
        self.field(name).ok_or_else(|| {
            FrameworkError::invalid_filter(format!(
                "unknown field '{}' on {}",
                name, self.entity
            ))
        })
    }

    /// Fields checked for uniqueness before writes
    pub fn unique_fields(&self) -> impl Iterator<Item = &Field<C>> {
        self.fields.iter().filter(|f| f.unique)
    }

    /// Validate a request body and convert it to column values
    ///
    /// Every problem is collected; the result is either the full list of
    /// column assignments or one `Validation` error keyed by field.
    pub fn validate(
        &self,
        data: &Map<String, Json>,
        mode: Mode,
    ) -> Result<Vec<(C, Value)>, FrameworkError> {
        let mut errors = ValidationErrors::new();

        for key in data.keys() {
            match self.field(key) {
                None => errors.add(key.clone(), format!("The {} field is not allowed.", key)),
                Some(field) if field.generated => {
                    errors.add(key.clone(), format!("The {} field cannot be set.", key))
                }
                Some(_) => {}
            }
        }

        let mut values = Vec::with_capacity(self.fields.len());
        for field in self.fields.iter().filter(|f| !f.generated) {
            match data.get(field.name) {
                None | Some(Json::Null) if field.required && mode != Mode::Patch => {
                    errors.add(field.name, format!("The {} field is required.", field.name));
                }
                Some(Json::Null) if field.required => {
                    errors.add(field.name, format!("The {} field cannot be null.", field.name));
                }
                Some(Json::Null) => values.push((field.column, field.ty.null())),
                None if mode == Mode::Replace => values.push((field.column, field.ty.null())),
                None => {}
                Some(value) => match check(field, value) {
                    Ok(v) => values.push((field.column, v)),
                    Err(message) => errors.add(field.name, message),
                },
            }
        }

        errors.into_result().map(|_| values)
    }

    /// Convert a where-clause operand to a column value
    ///
    /// Query-string operands arrive as strings, so `"3"` is accepted for
    /// integer fields and `"true"`/`"false"` for booleans.
    pub fn coerce(&self, field: &Field<C>, value: &Json) -> Result<Value, FrameworkError> {
        let bad = || {
            FrameworkError::invalid_filter(format!(
                "value for '{}' must be {}",
                field.name,
                field.ty.describe()
            ))
        };

        match (field.ty, value) {
            (ty, Json::Null) => Ok(ty.null()),
            (FieldType::String, Json::String(s)) => Ok(Value::from(s.clone())),
            (FieldType::String, Json::Number(n)) => Ok(Value::from(n.to_string())),
            (FieldType::String, Json::Bool(b)) => Ok(Value::from(b.to_string())),
            (FieldType::Integer, Json::Number(_)) => integer(value).map(Value::from).ok_or_else(bad),
            (FieldType::Integer, Json::String(s)) => {
                s.trim().parse::<i32>().map(Value::from).map_err(|_| bad())
            }
            (FieldType::Boolean, Json::Bool(b)) => Ok(Value::from(*b)),
            (FieldType::Boolean, Json::String(s)) => match s.as_str() {
                "true" | "1" => Ok(Value::from(true)),
                "false" | "0" => Ok(Value::from(false)),
                _ => Err(bad()),
            },
            _ => Err(bad()),
        }
    }
}

fn integer(value: &Json) -> Option<i32> {
    value.as_i64().and_then(|n| i32::try_from(n).ok())
}

/// Strict check of one non-null body value
fn check<C>(field: &Field<C>, value: &Json) -> Result<Value, String> {
    let mismatch = || format!("The {} field must be {}.", field.name, field.ty.describe());

    match (field.ty, value) {
        (FieldType::String, Json::String(s)) => {
            if let Some(max) = field.max_length {
                if !s.validate_length(None, Some(max), None) {
                    return Err(format!(
                        "The {} field must not be longer than {} characters.",
                        field.name, max
                    ));
                }
            }
            if field.format == Some(Format::GeoPoint) && !is_geo_point(s) {
                return Err(format!(
                    "The {} field must be a \"lat,long\" coordinate pair.",
                    field.name
                ));
            }
            Ok(Value::from(s.clone()))
        }
        (FieldType::Integer, Json::Number(_)) => integer(value).map(Value::from).ok_or_else(mismatch),
        (FieldType::Boolean, Json::Bool(b)) => Ok(Value::from(*b)),
        _ => Err(mismatch()),
    }
}

/// Accepts `"lat,long"` with optional whitespace around each part
pub fn is_geo_point(raw: &str) -> bool {
    let mut parts = raw.split(',');
    let (lat, long) = match (parts.next(), parts.next(), parts.next()) {
        (Some(lat), Some(long), None) => (lat.trim(), long.trim()),
        _ => return false,
    };
    match (lat.parse::<f64>(), long.parse::<f64>()) {
        (Ok(lat), Ok(long)) => {
            lat.is_finite()
                && long.is_finite()
                && (-90.0..=90.0).contains(&lat)
                && (-180.0..=180.0).contains(&long)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Col {
        Id,
        Title,
        Done,
        Rank,
        Geo,
    }

    fn schema() -> Schema<Col> {
        Schema::new(
            "Task",
            vec![
                Field::integer("id", Col::Id).generated(),
                Field::string("title", Col::Title).required().max_length(10),
                Field::boolean("done", Col::Done),
                Field::integer("rank", Col::Rank),
                Field::string("geo", Col::Geo).format(Format::GeoPoint),
            ],
        )
    }

    fn body(value: Json) -> Map<String, Json> {
        match value {
            Json::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn errors_of(result: Result<Vec<(Col, Value)>, FrameworkError>) -> ValidationErrors {
        match result {
            Err(FrameworkError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_collects_every_error() {
        let errors = errors_of(schema().validate(
            &body(json!({"id": 4, "done": "yes", "bogus": 1, "geo": "north"})),
            Mode::Create,
        ));

        assert!(errors.has("id"));
        assert!(errors.has("title"));
        assert!(errors.has("done"));
        assert!(errors.has("bogus"));
        assert!(errors.has("geo"));
        assert!(!errors.has("rank"));
        assert_eq!(errors.errors["title"], vec!["The title field is required."]);
    }

    #[test]
    fn test_create_only_sets_given_fields() {
        let values = schema()
            .validate(&body(json!({"title": "milk", "done": false})), Mode::Create)
            .unwrap();
        assert_eq!(
            values,
            vec![
                (Col::Title, Value::from("milk".to_string())),
                (Col::Done, Value::from(false)),
            ]
        );
    }

    #[test]
    fn test_patch_requires_nothing_but_rejects_null_required() {
        let values = schema()
            .validate(&body(json!({"rank": 3})), Mode::Patch)
            .unwrap();
        assert_eq!(values, vec![(Col::Rank, Value::from(3))]);

        let errors = errors_of(schema().validate(&body(json!({"title": null})), Mode::Patch));
        assert_eq!(errors.errors["title"], vec!["The title field cannot be null."]);
    }

    #[test]
    fn test_replace_clears_absent_optionals() {
        let values = schema()
            .validate(&body(json!({"title": "bread"})), Mode::Replace)
            .unwrap();
        assert_eq!(
            values,
            vec![
                (Col::Title, Value::from("bread".to_string())),
                (Col::Done, Value::Bool(None)),
                (Col::Rank, Value::Int(None)),
                (Col::Geo, Value::String(None)),
            ]
        );
    }

    #[test]
    fn test_max_length() {
        let errors = errors_of(
            schema().validate(&body(json!({"title": "far too long a title"})), Mode::Create),
        );
        assert_eq!(
            errors.errors["title"],
            vec!["The title field must not be longer than 10 characters."]
        );
    }

    #[test]
    fn test_integers_must_be_whole_and_in_range() {
        let s = schema();
        assert!(s.validate(&body(json!({"rank": 1.5})), Mode::Patch).is_err());
        assert!(s.validate(&body(json!({"rank": 4_000_000_000i64})), Mode::Patch).is_err());
        assert!(s.validate(&body(json!({"rank": "3"})), Mode::Patch).is_err());
    }

    #[test]
    fn test_geo_points() {
        assert!(is_geo_point("40.7128,-74.0060"));
        assert!(is_geo_point(" 51.5 , 0 "));
        assert!(!is_geo_point("91,0"));
        assert!(!is_geo_point("0,181"));
        assert!(!is_geo_point("1,2,3"));
        assert!(!is_geo_point("NaN,0"));
        assert!(!is_geo_point(""));
    }

    #[test]
    fn test_lenient_coercion() {
        let s = schema();
        let rank = s.filter_field("rank").unwrap();
        let done = s.filter_field("done").unwrap();
        let title = s.filter_field("title").unwrap();

        assert_eq!(s.coerce(rank, &json!("3")).unwrap(), Value::from(3));
        assert_eq!(s.coerce(rank, &json!(7)).unwrap(), Value::from(7));
        assert_eq!(s.coerce(done, &json!("true")).unwrap(), Value::from(true));
        assert_eq!(s.coerce(title, &json!(12)).unwrap(), Value::from("12".to_string()));
        assert_eq!(s.coerce(title, &Json::Null).unwrap(), Value::String(None));
        assert!(s.coerce(rank, &json!("three")).is_err());
        assert!(s.coerce(done, &json!([true])).is_err());
    }

    #[test]
    fn test_unknown_filter_field() {
        let err = schema().filter_field("colour").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
