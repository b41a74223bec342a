use homesim_api::models::{CreateDeviceRequest, UpdateDeviceRequest};
use serde_json::Value;

use super::*;

pub fn validate_create_device(body: &Value) -> Result<CreateDeviceRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let template = template(body, "", &mut errors);
    let position_x = body
        .get("position_x")
        .and_then(|value| nullable_integer(value, "position_x", &mut errors));
    let position_y = body
        .get("position_y")
        .and_then(|value| nullable_integer(value, "position_y", &mut errors));

    match template {
        Some(template) if errors.is_empty() => Ok(CreateDeviceRequest {
            device_type: template.device_type,
            name: template.name,
            settings: template.settings,
            position_x: position_x.flatten(),
            position_y: position_y.flatten(),
        }),
        _ => Err(errors),
    }
}

/// Only the keys present in `body` are validated; each one is held to the
/// create rules, except that coordinates may be `null`.
pub fn validate_update_device(body: &Value) -> Result<UpdateDeviceRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let device_type = sometimes(body, "type", "type", &mut errors)
        .and_then(|value| device_type(value, "type", &mut errors));
    let name = sometimes(body, "name", "name", &mut errors)
        .and_then(|value| string(value, "name", &mut errors));
    let settings = sometimes(body, "settings", "settings", &mut errors)
        .and_then(|value| settings(value, "settings", &mut errors));
    let position_x = body
        .get("position_x")
        .and_then(|value| nullable_integer(value, "position_x", &mut errors));
    let position_y = body
        .get("position_y")
        .and_then(|value| nullable_integer(value, "position_y", &mut errors));

    errors.finish(|| UpdateDeviceRequest {
        device_type,
        name,
        settings,
        position_x,
        position_y,
    })
}

#[cfg(test)]
mod tests {
    use homesim_api::models::DeviceType;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_valid_create() {
        let request = validate_create_device(&json!({
            "type": "fan",
            "name": "Ceiling Fan",
            "settings": { "power": true, "speed": 40 },
            "position_x": 10,
        }))
        .unwrap();

        assert_eq!(request.device_type, DeviceType::Fan);
        assert_eq!(request.position_x, Some(10));
        assert_eq!(request.position_y, None);
        assert_eq!(request.settings["speed"], json!(40));
    }

    #[test]
    fn test_create_rejects_unknown_type_and_empty_settings() {
        let errors = validate_create_device(&json!({
            "type": "heater",
            "name": "Space Heater",
            "settings": {},
            "position_y": "top",
        }))
        .unwrap_err();

        assert_eq!(errors.fields()["type"], vec!["The selected type is invalid."]);
        assert_eq!(errors.fields()["settings"], vec!["The settings field is required."]);
        assert_eq!(errors.fields()["position_y"], vec!["The position y field must be an integer."]);
        assert!(!errors.contains("name"));
    }

    #[test]
    fn test_create_requires_fields_on_non_object_body() {
        let errors = validate_create_device(&json!([1, 2, 3])).unwrap_err();

        assert!(errors.contains("type"));
        assert!(errors.contains("name"));
        assert!(errors.contains("settings"));
    }

    #[test]
    fn test_update_validates_only_present_fields() {
        let request = validate_update_device(&json!({ "settings": { "brightness": 5 } })).unwrap();
        assert_eq!(request.device_type, None);
        assert_eq!(request.name, None);
        assert_eq!(request.position_x, None);
        assert!(request.settings.is_some());

        let request = validate_update_device(&json!({ "position_x": null, "position_y": 7 })).unwrap();
        assert_eq!(request.position_x, Some(None));
        assert_eq!(request.position_y, Some(Some(7)));

        let errors = validate_update_device(&json!({ "name": "", "type": null })).unwrap_err();
        assert_eq!(errors.fields()["name"], vec!["The name field is required."]);
        assert_eq!(errors.fields()["type"], vec!["The type field is required."]);
    }
}
