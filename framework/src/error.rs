//! Framework-wide error types
//!
//! Provides a unified error type that is used by the repository, the query
//! layer and the HTTP layer, and that converts into an HTTP response.

use sea_orm::SqlErr;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field validation errors, keyed by field name
///
/// # Response Format
///
/// ```json
/// {
///     "message": "The given data was invalid.",
///     "errors": {
///         "title": ["The title field is required."]
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    /// Map of field names to their validation error messages
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Create a new empty ValidationErrors
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error for a specific field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check whether a given field has at least one error
    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Turn the collected errors into a `Result`
    pub fn into_result(self) -> Result<(), FrameworkError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(FrameworkError::Validation(self))
        }
    }

    /// Convert to JSON Value for response
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "message": "The given data was invalid.",
            "errors": self.errors
        })
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed: {:?}", self.errors)
    }
}

impl std::error::Error for ValidationErrors {}

/// Framework-wide error type
///
/// Handlers return `Response = Result<HttpResponse, HttpResponse>`, and
/// `HttpResponse: From<FrameworkError>`, so errors propagate with `?`:
///
/// ```rust,ignore
/// pub async fn show(repo: Repository<todo_list::Entity>, req: Request) -> Response {
///     let id = req.param_as::<i32>("id")?;
///     let list = repo.find_by_id(id).await?; // 404 when missing
///     json(serde_json::to_value(list)?)
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum FrameworkError {
    /// Lookup by id found nothing (404 Not Found)
    #[error("Entity not found: {entity} with id {id}")]
    EntityNotFound {
        /// Entity name, e.g. "TodoList"
        entity: &'static str,
        /// The id that was looked up
        id: i64,
    },

    /// Route parameter missing (400 Bad Request)
    #[error("Missing required parameter: {param_name}")]
    ParamError {
        /// The name of the parameter that failed extraction
        param_name: String,
    },

    /// Route parameter could not be parsed (400 Bad Request)
    #[error("Invalid parameter '{param}': expected {expected_type}")]
    ParamParse {
        /// The parameter value that failed to parse
        param: String,
        /// The expected type (e.g., "i32")
        expected_type: &'static str,
    },

    /// Malformed `filter` / `where` input (400 Bad Request)
    #[error("Invalid filter: {message}")]
    InvalidFilter {
        /// What was wrong with the filter
        message: String,
    },

    /// Malformed request body or query string (400 Bad Request)
    #[error("{message}")]
    BadRequest {
        /// The error message
        message: String,
    },

    /// Request body exceeded the configured limit (413 Payload Too Large)
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge {
        /// The configured limit in bytes
        limit: usize,
    },

    /// Field validation errors (422 Unprocessable Entity)
    #[error("Validation failed")]
    Validation(ValidationErrors),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// An application lifecycle method was called in the wrong state
    #[error("Cannot {action} application in state {state}")]
    Lifecycle {
        /// The attempted transition (boot, start, stop)
        action: &'static str,
        /// The state the application was in
        state: String,
    },

    /// Generic internal server error
    #[error("Internal server error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl FrameworkError {
    /// Create an EntityNotFound error (404)
    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        Self::EntityNotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a ParamError for a missing parameter
    pub fn param(name: impl Into<String>) -> Self {
        Self::ParamError {
            param_name: name.into(),
        }
    }

    /// Create a ParamParse error (400)
    pub fn param_parse(param: impl Into<String>, expected_type: &'static str) -> Self {
        Self::ParamParse {
            param: param.into(),
            expected_type,
        }
    }

    /// Create an InvalidFilter error (400)
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    /// Create a BadRequest error (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a single-field validation error (422)
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }

    /// Create a DatabaseError
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EntityNotFound { .. } => 404,
            Self::ParamError { .. } => 400,
            Self::ParamParse { .. } => 400,
            Self::InvalidFilter { .. } => 400,
            Self::BadRequest { .. } => 400,
            Self::PayloadTooLarge { .. } => 413,
            Self::Validation(_) => 422,
            Self::Database(_) => 500,
            Self::Lifecycle { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }

    /// Whether this error is an entity lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EntityNotFound { .. })
    }
}

/// Constraint violations become 422s; everything else is a 500
impl From<sea_orm::DbErr> for FrameworkError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::validation("record", "A record with the same unique value already exists.")
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::validation("record", "A related record does not exist.")
            }
            _ => Self::Database(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for FrameworkError {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(format!("Failed to serialize JSON: {}", e))
    }
}
