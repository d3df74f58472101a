//! Field-level rules shared by every write path.
//!
//! The pure checks (`check_year`, `is_valid_slug`) take everything they depend
//! on as arguments; the `validate_*` adapters plug them into `validator`
//! derives on the write DTOs.

use chrono::{Datelike, Utc};
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::sync::LazyLock;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Upper bound for `name` fields on categories, genres and titles.
pub const NAME_MAX_LEN: u64 = 200;

static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap_or_else(|e| panic!("slug pattern: {e}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{value} is not a valid year: it is later than {current_year}")]
pub struct YearInFuture {
    pub value: i32,
    pub current_year: i32,
}

/// Current calendar year in UTC.
#[must_use]
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Fails iff `value` is later than `current_year`. There is no lower bound here.
pub const fn check_year(value: i32, current_year: i32) -> Result<(), YearInFuture> {
    if value > current_year {
        return Err(YearInFuture {
            value,
            current_year,
        });
    }
    Ok(())
}

#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

pub fn validate_year(value: i32) -> Result<(), ValidationError> {
    check_year(value, current_year()).map_err(|e| {
        let mut err = ValidationError::new("year_in_future").with_message(e.to_string().into());
        err.add_param(Cow::from("value"), &e.value);
        err.add_param(Cow::from("current_year"), &e.current_year);
        err
    })
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(ValidationError::new("slug").with_message(
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens".into(),
        ))
    }
}

/// Rejects strings that are empty once surrounding whitespace is trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("This field may not be blank".into()));
    }
    Ok(())
}

/// A validation failure attributed to one field of a write request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens `validator` output into field-attributed messages, sorted by field.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|e| FieldError::new(&path, describe(e))));
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let number = |key: &str| error.params.get(key).and_then(serde_json::Value::as_f64);
    let param = |key: &str| number(key).map(format_bound);

    match error.code.as_ref() {
        "range" => match (number("value"), number("min"), number("max")) {
            (Some(v), Some(min), _) if v < min => {
                format!("Ensure this value is greater than or equal to {}", format_bound(min))
            }
            (Some(v), _, Some(max)) if v > max => {
                format!("Ensure this value is less than or equal to {}", format_bound(max))
            }
            _ => "Value is out of range".to_string(),
        },
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("Length must be between {min} and {max} characters"),
            (Some(min), None) => format!("Length must be at least {min} characters"),
            (None, Some(max)) => format!("Length must be at most {max} characters"),
            (None, None) => "Invalid length".to_string(),
        },
        "required" => "This field is required".to_string(),
        code => format!("Invalid value ({code})"),
    }
}

/// Renders whole-number bounds without a fractional part.
#[allow(clippy::cast_possible_truncation)]
fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
