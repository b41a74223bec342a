use homesim_api::models::{CreatePresetRequest, DeviceTemplate, UpdatePresetRequest};
use serde_json::Value;

use super::*;

fn devices(value: &Value, errors: &mut ValidationErrors) -> Option<Vec<DeviceTemplate>> {
    let Some(items) = value.as_array() else {
        errors.add("devices", "The devices field must be an array.");
        return None;
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| template(item, &format!("devices.{index}."), errors))
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

pub fn validate_create_preset(body: &Value) -> Result<CreatePresetRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = required(body, "name", "name", &mut errors)
        .and_then(|value| string(value, "name", &mut errors));
    let description = body
        .get("description")
        .and_then(|value| nullable_string(value, "description", &mut errors));
    let devices = required(body, "devices", "devices", &mut errors)
        .and_then(|value| devices(value, &mut errors));

    match (name, devices) {
        (Some(name), Some(devices)) if errors.is_empty() => Ok(CreatePresetRequest {
            name,
            description: description.flatten(),
            devices,
        }),
        _ => Err(errors),
    }
}

pub fn validate_update_preset(body: &Value) -> Result<UpdatePresetRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = sometimes(body, "name", "name", &mut errors)
        .and_then(|value| string(value, "name", &mut errors));
    let description = body
        .get("description")
        .and_then(|value| nullable_string(value, "description", &mut errors));
    let devices = sometimes(body, "devices", "devices", &mut errors)
        .and_then(|value| devices(value, &mut errors));

    errors.finish(|| UpdatePresetRequest {
        name,
        description,
        devices,
    })
}
