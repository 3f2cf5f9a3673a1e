use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

use crate::error::ApiError;

/// Accumulates per-field constraint violations for one payload, so a single
/// response can name every offending field path.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Ok(()) when clean, otherwise the uniform validation failure.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_fields("Validation failed", self.errors))
        }
    }
}

/// Distinguishes an omitted field from an explicit null in PATCH payloads:
/// omitted deserializes to `None` (via `#[serde(default)]`), null to
/// `Some(None)`, and a value to `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Basic email shape check: one '@', non-empty local and domain, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return false;
    }
    let domain = parts[1];
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Require a non-empty trimmed string, recording a field error otherwise.
pub fn require_str(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "required");
    }
}

/// Coerce a date-like string (YYYY-MM-DD) into a date value.
pub fn parse_date(errors: &mut FieldErrors, field: &str, value: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "not a valid date (expected YYYY-MM-DD)");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("a x.com"));
        assert!(!is_valid_email("a@.com."));
    }

    #[test]
    fn date_coercion() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            parse_date(&mut errors, "start_date", "2021-06-01"),
            NaiveDate::from_ymd_opt(2021, 6, 1)
        );
        assert!(errors.is_empty());

        assert_eq!(parse_date(&mut errors, "start_date", "01/06/2021"), None);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn field_errors_collect_and_convert() {
        let mut errors = FieldErrors::new();
        require_str(&mut errors, "title", "   ");
        require_str(&mut errors, "content", "hello");
        errors.add("email", "not a valid email");

        let err = errors.into_result().unwrap_err();
        match err {
            ApiError::Validation {
                field_errors: Some(fields),
                ..
            } => {
                assert_eq!(fields.get("title").map(String::as_str), Some("required"));
                assert_eq!(
                    fields.get("email").map(String::as_str),
                    Some("not a valid email")
                );
                assert!(!fields.contains_key("content"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[derive(Debug, Deserialize)]
    struct PatchProbe {
        #[serde(default, deserialize_with = "double_option")]
        description: Option<Option<String>>,
    }

    #[test]
    fn double_option_distinguishes_null_from_omitted() {
        let omitted: PatchProbe = serde_json::from_str("{}").unwrap();
        assert_eq!(omitted.description, None);

        let null: PatchProbe = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(null.description, Some(None));

        let set: PatchProbe = serde_json::from_str(r#"{"description": "x"}"#).unwrap();
        assert_eq!(set.description, Some(Some("x".to_string())));
    }
}
