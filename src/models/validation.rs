//! Field-level validation for request payloads

use std::fmt;

use serde::Serialize;

/// One rejected field and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every problem found in a payload, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Payload checks that serde alone cannot express.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

pub(crate) fn check_text(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.push(field, format!("{} cannot be empty", field));
    } else {
        check_length(errors, field, value, max);
    }
}

pub(crate) fn check_length(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(
            field,
            format!("{} exceeds maximum length of {} characters", field, max),
        );
    }
}

pub(crate) fn not_null(errors: &mut ValidationErrors, field: &'static str) {
    errors.push(field, format!("{} may not be null", field));
}
