use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::Settings;

pub const POWER: &str = "power";
pub const BRIGHTNESS: &str = "brightness";
pub const COLOR_TEMP: &str = "colorTemp";
pub const SPEED: &str = "speed";

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTemp {
    #[default]
    Warm,
    Neutral,
    Cool,
    Pink,
    Blue,
    Purple,
}

impl ColorTemp {
    pub const ALL: [ColorTemp; 6] = [
        ColorTemp::Warm,
        ColorTemp::Neutral,
        ColorTemp::Cool,
        ColorTemp::Pink,
        ColorTemp::Blue,
        ColorTemp::Purple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTemp::Warm => "warm",
            ColorTemp::Neutral => "neutral",
            ColorTemp::Cool => "cool",
            ColorTemp::Pink => "pink",
            ColorTemp::Blue => "blue",
            ColorTemp::Purple => "purple",
        }
    }

    /// Display color used to render the light.
    pub fn hex(&self) -> &'static str {
        match self {
            ColorTemp::Warm => "#FFD700",
            ColorTemp::Neutral => "#FFFFFF",
            ColorTemp::Cool => "#B0E0E6",
            ColorTemp::Pink => "#FFB6C1",
            ColorTemp::Blue => "#87CEEB",
            ColorTemp::Purple => "#DDA0DD",
        }
    }
}

impl fmt::Display for ColorTemp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorTemp {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ColorTemp::ALL
            .into_iter()
            .find(|color| color.as_str() == value)
            .ok_or(())
    }
}

/// Typed view over a light's settings map.
///
/// Reading is lenient: a missing or malformed key falls back to its default,
/// so a hand-edited settings map never prevents a light from rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightSettings {
    pub power: bool,
    /// Brightness percentage in `0..=100`
    pub brightness: u8,
    pub color_temp: ColorTemp,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            power: false,
            brightness: 100,
            color_temp: ColorTemp::Warm,
        }
    }
}

impl LightSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        let default = Self::default();

        Self {
            power: read_bool(settings, POWER).unwrap_or(default.power),
            brightness: read_percent(settings, BRIGHTNESS).unwrap_or(default.brightness),
            color_temp: settings
                .get(COLOR_TEMP)
                .and_then(Value::as_str)
                .and_then(|value| value.parse().ok())
                .unwrap_or(default.color_temp),
        }
    }

    pub fn to_settings(&self) -> Settings {
        let mut settings = Settings::new();
        settings.insert(POWER.into(), json!(self.power));
        settings.insert(BRIGHTNESS.into(), json!(self.brightness));
        settings.insert(COLOR_TEMP.into(), json!(self.color_temp.as_str()));
        settings
    }
}

/// Typed view over a fan's settings map.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanSettings {
    pub power: bool,
    /// Speed percentage in `0..=100`
    pub speed: u8,
}

impl FanSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            power: read_bool(settings, POWER).unwrap_or(false),
            speed: read_percent(settings, SPEED).unwrap_or(0),
        }
    }

    pub fn to_settings(&self) -> Settings {
        let mut settings = Settings::new();
        settings.insert(POWER.into(), json!(self.power));
        settings.insert(SPEED.into(), json!(self.speed));
        settings
    }
}

fn read_bool(settings: &Settings, key: &str) -> Option<bool> {
    settings.get(key).and_then(Value::as_bool)
}

fn read_percent(settings: &Settings, key: &str) -> Option<u8> {
    let value = settings.get(key)?;
    let number = value
        .as_i64()
        .or_else(|| value.as_f64().map(|float| float.round() as i64))?;

    Some(number.clamp(0, 100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(value: Value) -> Settings {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_light_settings_lenient_read() {
        let light = LightSettings::from_settings(&settings(json!({
            "brightness": 80,
            "colorTemp": "cool",
        })));

        assert!(!light.power);
        assert_eq!(light.brightness, 80);
        assert_eq!(light.color_temp, ColorTemp::Cool);

        let odd = LightSettings::from_settings(&settings(json!({
            "power": true,
            "brightness": 250,
            "colorTemp": "ultraviolet",
        })));

        assert!(odd.power);
        assert_eq!(odd.brightness, 100);
        assert_eq!(odd.color_temp, ColorTemp::Warm);
    }

    #[test]
    fn test_fan_settings_roundtrip_matches_defaults() {
        let fan = FanSettings { power: true, speed: 42 };
        assert_eq!(FanSettings::from_settings(&fan.to_settings()), fan);
        assert_eq!(
            Value::Object(FanSettings::default().to_settings()),
            json!({ "power": false, "speed": 0 })
        );
    }
}
