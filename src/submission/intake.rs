use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::{EscapedSubmission, Submission};

use super::escape::{escape_html, escape_multiline};

const FIELDS: [&str; 4] = ["name", "email", "phone", "message"];

/// Check a parsed request body against the four-field contact schema.
/// `name`, `email` and `message` must be non-empty strings; `phone` may be
/// absent, null or empty. Unknown keys are ignored.
pub fn validate(raw: &Value) -> Result<Submission, AppError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| AppError::Validation("body is not an object".to_string()))?;

    let unknown: Vec<&str> = obj
        .keys()
        .map(String::as_str)
        .filter(|k| !FIELDS.contains(k))
        .collect();
    if !unknown.is_empty() {
        tracing::debug!("Ignoring unknown contact fields: {unknown:?}");
    }

    Ok(Submission {
        name: required(obj, "name")?,
        email: required(obj, "email")?,
        phone: optional(obj, "phone")?,
        message: required(obj, "message")?,
    })
}

fn required(obj: &Map<String, Value>, field: &str) -> Result<String, AppError> {
    optional(obj, field)?
        .ok_or_else(|| AppError::Validation(format!("Missing required field: {field}")))
}

fn optional(obj: &Map<String, Value>, field: &str) -> Result<Option<String>, AppError> {
    match obj.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(Some(s.clone())),
        Some(Value::String(_)) | Some(Value::Null) | None => Ok(None),
        Some(_) => Err(AppError::Validation(format!("Field is not a string: {field}"))),
    }
}

impl Submission {
    /// HTML-safe variants of each field. The raw values are left untouched for
    /// the plain-text body and the sheet row.
    pub fn escaped(&self) -> EscapedSubmission {
        EscapedSubmission {
            name: escape_html(&self.name),
            email: escape_html(&self.email),
            phone: self.phone.as_deref().map(escape_html),
            message: escape_multiline(&self.message),
        }
    }
}
