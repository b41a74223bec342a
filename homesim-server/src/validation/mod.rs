//! Request body validation.
//!
//! Bodies arrive as raw JSON so that every failing field can be reported at
//! once, keyed by its path (`name`, `devices.0.type`), before any typed
//! request is built.

mod device;
mod preset;

pub use device::{validate_create_device, validate_update_device};
pub use preset::{validate_create_preset, validate_update_preset};

use homesim_api::models::{DeviceTemplate, DeviceType, Settings};
use serde_json::Value;

use crate::errors::ValidationErrors;

pub const MAX_STRING_LENGTH: usize = 255;

fn attribute(path: &str) -> String {
    path.replace('_', " ")
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Looks up `key` and records a "required" failure when it is missing or blank.
fn required<'v>(
    body: &'v Value,
    key: &str,
    path: &str,
    errors: &mut ValidationErrors,
) -> Option<&'v Value> {
    match body.get(key) {
        Some(value) if !is_blank(value) => Some(value),
        _ => {
            errors.add(path, format!("The {} field is required.", attribute(path)));
            None
        }
    }
}

/// Like [`required`] but only applies when the key is present at all.
fn sometimes<'v>(
    body: &'v Value,
    key: &str,
    path: &str,
    errors: &mut ValidationErrors,
) -> Option<&'v Value> {
    body.get(key)?;
    required(body, key, path, errors)
}

fn device_type(value: &Value, path: &str, errors: &mut ValidationErrors) -> Option<DeviceType> {
    match value.as_str().map(str::parse::<DeviceType>) {
        Some(Ok(device_type)) => Some(device_type),
        _ => {
            errors.add(path, format!("The selected {} is invalid.", attribute(path)));
            None
        }
    }
}

fn string(value: &Value, path: &str, errors: &mut ValidationErrors) -> Option<String> {
    let Some(text) = value.as_str() else {
        errors.add(path, format!("The {} field must be a string.", attribute(path)));
        return None;
    };

    if text.chars().count() > MAX_STRING_LENGTH {
        errors.add(
            path,
            format!(
                "The {} field must not be greater than {} characters.",
                attribute(path),
                MAX_STRING_LENGTH
            ),
        );
        return None;
    }

    Some(text.to_string())
}

fn settings(value: &Value, path: &str, errors: &mut ValidationErrors) -> Option<Settings> {
    match value {
        Value::Object(map) => Some(map.clone()),
        _ => {
            errors.add(path, format!("The {} field must be an object.", attribute(path)));
            None
        }
    }
}

fn nullable_string(value: &Value, path: &str, errors: &mut ValidationErrors) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(text) => Some(Some(text.clone())),
        _ => {
            errors.add(path, format!("The {} field must be a string.", attribute(path)));
            None
        }
    }
}

fn nullable_integer(value: &Value, path: &str, errors: &mut ValidationErrors) -> Option<Option<i32>> {
    if value.is_null() {
        return Some(None);
    }

    match value.as_i64().and_then(|n| i32::try_from(n).ok()) {
        Some(n) => Some(Some(n)),
        None => {
            errors.add(path, format!("The {} field must be an integer.", attribute(path)));
            None
        }
    }
}

/// Validates a `{type, name, settings}` object whose fields live under `prefix`.
fn template(body: &Value, prefix: &str, errors: &mut ValidationErrors) -> Option<DeviceTemplate> {
    let path = |key: &str| format!("{prefix}{key}");

    let device_type = required(body, "type", &path("type"), errors)
        .and_then(|value| device_type(value, &path("type"), errors));
    let name = required(body, "name", &path("name"), errors)
        .and_then(|value| string(value, &path("name"), errors));
    let settings = required(body, "settings", &path("settings"), errors)
        .and_then(|value| settings(value, &path("settings"), errors));

    Some(DeviceTemplate {
        device_type: device_type?,
        name: name?,
        settings: settings?,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_blank_values_fail_required() {
        for value in [json!(null), json!(""), json!("   "), json!([]), json!({})] {
            let body = json!({ "name": value });
            let mut errors = ValidationErrors::new();

            assert!(required(&body, "name", "name", &mut errors).is_none());
            assert_eq!(errors.fields()["name"], vec!["The name field is required."]);
        }
    }

    #[test]
    fn test_string_length_counts_characters() {
        let mut errors = ValidationErrors::new();
        let accented = "é".repeat(MAX_STRING_LENGTH);

        assert_eq!(string(&json!(accented), "name", &mut errors), Some(accented.clone()));
        assert!(string(&json!(format!("{accented}e")), "name", &mut errors).is_none());
        assert_eq!(
            errors.fields()["name"],
            vec!["The name field must not be greater than 255 characters."]
        );
    }

    #[test]
    fn test_nullable_integer() {
        let mut errors = ValidationErrors::new();

        assert_eq!(nullable_integer(&json!(null), "position_x", &mut errors), Some(None));
        assert_eq!(nullable_integer(&json!(-40), "position_x", &mut errors), Some(Some(-40)));
        assert!(nullable_integer(&json!(1.5), "position_x", &mut errors).is_none());
        assert!(nullable_integer(&json!(i64::MAX), "position_x", &mut errors).is_none());
        assert_eq!(
            errors.fields()["position_x"],
            vec![
                "The position x field must be an integer.",
                "The position x field must be an integer."
            ]
        );
    }

    #[test]
    fn test_template_reports_every_field() {
        let mut errors = ValidationErrors::new();
        let body = json!({ "type": "heater", "settings": "bright" });

        assert!(template(&body, "devices.2.", &mut errors).is_none());
        assert!(errors.contains("devices.2.type"));
        assert!(errors.contains("devices.2.name"));
        assert!(errors.contains("devices.2.settings"));
        assert_eq!(
            errors.fields()["devices.2.type"],
            vec!["The selected devices.2.type is invalid."]
        );
    }
}
