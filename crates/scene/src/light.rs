//! Light definitions for the scene.

use glam::{Mat4, Vec3};
use orbitscene_common::Rgb;
use serde::{Deserialize, Serialize};

/// Orthographic shadow camera and map resolution for a directional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowParams {
    /// Shadow map edge length in texels.
    pub map_size: u32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            map_size: 2048,
            left: -20.0,
            right: 20.0,
            top: 20.0,
            bottom: -20.0,
            near: 0.5,
            far: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    /// Uniform light from every direction.
    Ambient,
    /// Parallel rays from `position` toward the origin.
    Directional {
        position: Vec3,
        shadow: Option<ShadowParams>,
    },
    /// Omnidirectional light at `position`.
    Point { position: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub kind: LightKind,
    pub color: Rgb,
    pub intensity: f32,
}

impl Light {
    pub fn ambient(color: Rgb, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity,
        }
    }

    pub fn directional(color: Rgb, intensity: f32, position: Vec3) -> Self {
        Self {
            kind: LightKind::Directional {
                position,
                shadow: None,
            },
            color,
            intensity,
        }
    }

    pub fn point(color: Rgb, intensity: f32, position: Vec3) -> Self {
        Self {
            kind: LightKind::Point { position },
            color,
            intensity,
        }
    }

    /// Enable shadow casting. Only directional lights cast shadows; other
    /// kinds are returned unchanged.
    pub fn with_shadow(mut self, params: ShadowParams) -> Self {
        if let LightKind::Directional { shadow, .. } = &mut self.kind {
            *shadow = Some(params);
        }
        self
    }

    /// Linear-light color premultiplied by intensity and an external scale.
    pub fn radiance(&self, scale: f32) -> [f32; 3] {
        let k = self.intensity * scale;
        self.color.to_linear().map(|c| c * k)
    }

    /// View-projection of the shadow camera, if this light casts shadows.
    pub fn shadow_view_projection(&self) -> Option<Mat4> {
        let LightKind::Directional {
            position,
            shadow: Some(s),
        } = self.kind
        else {
            return None;
        };
        let view = Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y);
        let proj = Mat4::orthographic_rh(s.left, s.right, s.bottom, s.top, s.near, s.far);
        Some(proj * view)
    }
}

/// Ambient + directional + point light. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingRig {
    ambient: Light,
    directional: Light,
    point: Light,
}

impl LightingRig {
    /// The demo rig: white ambient fill, a white shadow-casting key light
    /// and a cyan point light in front of the objects.
    pub fn standard() -> Self {
        Self {
            ambient: Light::ambient(Rgb::WHITE, 0.6),
            directional: Light::directional(Rgb::WHITE, 0.8, Vec3::new(10.0, 10.0, 10.0))
                .with_shadow(ShadowParams::default()),
            point: Light::point(Rgb(0x00ffff), 0.5, Vec3::new(0.0, 5.0, 5.0)),
        }
    }

    pub fn ambient(&self) -> &Light {
        &self.ambient
    }

    pub fn directional(&self) -> &Light {
        &self.directional
    }

    pub fn point(&self) -> &Light {
        &self.point
    }

    /// All lights in a stable order: ambient, directional, point.
    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        [&self.ambient, &self.directional, &self.point].into_iter()
    }
}

impl Default for LightingRig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rig_has_three_lights() {
        let rig = LightingRig::standard();
        assert_eq!(rig.iter().count(), 3);
        assert!(matches!(rig.ambient().kind, LightKind::Ambient));
        assert!(matches!(rig.point().kind, LightKind::Point { .. }));
    }

    #[test]
    fn only_directional_casts_shadows() {
        let rig = LightingRig::standard();
        assert!(rig.directional().shadow_view_projection().is_some());
        assert!(rig.ambient().shadow_view_projection().is_none());
        let p = Light::point(Rgb::WHITE, 1.0, Vec3::ZERO).with_shadow(ShadowParams::default());
        assert!(matches!(p.kind, LightKind::Point { .. }));
    }

    #[test]
    fn shadow_camera_sees_origin() {
        let vp = LightingRig::standard()
            .directional()
            .shadow_view_projection()
            .unwrap();
        let clip = vp.project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn radiance_scales_with_intensity() {
        let l = Light::ambient(Rgb::WHITE, 0.6);
        assert_eq!(l.radiance(1.0), [0.6, 0.6, 0.6]);
        assert_eq!(l.radiance(0.0), [0.0, 0.0, 0.0]);
        let doubled = l.radiance(2.0);
        assert!((doubled[0] - 1.2).abs() < 1e-6);
    }
}
