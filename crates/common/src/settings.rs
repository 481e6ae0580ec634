use serde::{Deserialize, Serialize};

/// Upper bound of the rotation speed and light intensity sliders.
pub const SCALE_MAX: f32 = 2.0;
/// Slider step for the scalar settings.
pub const SCALE_STEP: f32 = 0.1;

/// Errors from validating a settings snapshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("{field} must be >= 0, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

/// User-facing render settings. A full snapshot travels on every change.
///
/// Serialized with camelCase keys; every field is optional in a settings file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlSettings {
    /// Multiplier applied to every object's angular velocity.
    pub rotation_speed: f32,
    /// Multiplier applied to every light's intensity.
    pub light_intensity: f32,
    /// Objects spin only while this is set.
    pub auto_rotate: bool,
    /// Draw the five objects as line wireframes.
    pub wireframe: bool,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            rotation_speed: 1.0,
            light_intensity: 1.0,
            auto_rotate: true,
            wireframe: false,
        }
    }
}

impl ControlSettings {
    /// Check the scalar fields are finite and non-negative.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_scale("rotationSpeed", self.rotation_speed)?;
        check_scale("lightIntensity", self.light_intensity)?;
        Ok(())
    }
}

fn check_scale(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if !value.is_finite() {
        return Err(SettingsError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(SettingsError::Negative { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let s = ControlSettings::default();
        assert_eq!(s.rotation_speed, 1.0);
        assert_eq!(s.light_intensity, 1.0);
        assert!(s.auto_rotate);
        assert!(!s.wireframe);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn negative_speed_rejected() {
        let s = ControlSettings {
            rotation_speed: -0.5,
            ..ControlSettings::default()
        };
        assert_eq!(
            s.validate(),
            Err(SettingsError::Negative {
                field: "rotationSpeed",
                value: -0.5
            })
        );
    }

    #[test]
    fn nan_intensity_rejected() {
        let s = ControlSettings {
            light_intensity: f32::NAN,
            ..ControlSettings::default()
        };
        assert_eq!(
            s.validate(),
            Err(SettingsError::NotFinite {
                field: "lightIntensity"
            })
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let s: ControlSettings = serde_json::from_str(r#"{"wireframe": true}"#).unwrap();
        assert!(s.wireframe);
        assert_eq!(s.rotation_speed, 1.0);
        assert!(s.auto_rotate);
    }

    #[test]
    fn json_uses_camel_case() {
        let json = serde_json::to_string(&ControlSettings::default()).unwrap();
        assert!(json.contains("rotationSpeed"));
        assert!(json.contains("autoRotate"));
    }
}
