use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use homesim_api::models::FieldErrors;

/// Field level validation failures collected before any mutation happens.
#[derive(Debug, Default, Clone, PartialEq, thiserror::Error)]
#[error("Validation error")]
pub struct ValidationErrors {
    fields: FieldErrors,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &FieldErrors {
        &self.fields
    }

    pub fn into_fields(self) -> FieldErrors {
        self.fields
    }

    /// Yields `value` only when no error was recorded.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

/// An unreadable body is reported like any other invalid input.
impl From<JsonRejection> for ValidationErrors {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "The request must be sent as application/json.",
            _ => "The request body must be a valid JSON document.",
        };

        let mut errors = ValidationErrors::new();
        errors.add("body", message);
        errors
    }
}
