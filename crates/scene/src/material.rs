use orbitscene_common::Rgb;
use serde::{Deserialize, Serialize};

/// Surface shading parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Material {
    /// Blinn-Phong: diffuse color, self-illumination and specular exponent.
    Phong {
        color: Rgb,
        emissive: Rgb,
        shininess: f32,
    },
    /// Roughness/metalness description, shaded with a Phong approximation.
    Standard {
        color: Rgb,
        roughness: f32,
        metalness: f32,
    },
}

impl Material {
    pub fn color(&self) -> Rgb {
        match self {
            Material::Phong { color, .. } | Material::Standard { color, .. } => *color,
        }
    }

    pub fn emissive(&self) -> Rgb {
        match self {
            Material::Phong { emissive, .. } => *emissive,
            Material::Standard { .. } => Rgb::BLACK,
        }
    }

    /// Specular exponent used by the lit shader.
    pub fn shininess(&self) -> f32 {
        match self {
            Material::Phong { shininess, .. } => *shininess,
            Material::Standard { roughness, .. } => {
                let smooth = (1.0 - roughness).clamp(0.0, 1.0);
                2.0 + smooth * smooth * 126.0
            }
        }
    }

    /// Strength of the specular highlight in [0, 1].
    pub fn specular(&self) -> f32 {
        match self {
            // 0x111111, the usual default specular color for Phong surfaces
            Material::Phong { .. } => 0x11 as f32 / 255.0,
            Material::Standard {
                roughness,
                metalness,
                ..
            } => (0.04 + 0.5 * metalness) * (1.0 - roughness).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_material_is_dull() {
        let ground = Material::Standard {
            color: Rgb(0x2d3561),
            roughness: 0.8,
            metalness: 0.2,
        };
        let phong = Material::Phong {
            color: Rgb(0xff6b6b),
            emissive: Rgb(0x330000),
            shininess: 100.0,
        };
        assert!(ground.shininess() < phong.shininess());
        assert_eq!(ground.emissive(), Rgb::BLACK);
        assert!(ground.specular() < 0.1);
    }
}
