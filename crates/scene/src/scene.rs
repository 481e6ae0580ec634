use glam::Vec3;
use orbitscene_common::{Rgb, Transform};
use serde::{Deserialize, Serialize};

use crate::geometry::{Geometry, GeometryKind};
use crate::light::LightingRig;
use crate::material::Material;

/// Number of animated objects in every scene.
pub const OBJECT_COUNT: usize = 5;

/// One animated primitive.
///
/// The object knows its slot in the root's child array and nothing else
/// about the tree; the root owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    index: usize,
    kind: GeometryKind,
    geometry: Geometry,
    material: Material,
    /// Position at build time. Bounded bobbing oscillates around this.
    rest_position: Vec3,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl SceneObject {
    fn new(
        index: usize,
        kind: GeometryKind,
        geometry: Geometry,
        material: Material,
        position: Vec3,
    ) -> Self {
        Self {
            index,
            kind,
            geometry,
            material,
            rest_position: position,
            transform: Transform::from_position(position),
            cast_shadow: true,
            receive_shadow: true,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn rest_position(&self) -> Vec3 {
        self.rest_position
    }
}

/// Static ground plane under the objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundPlane {
    pub geometry: Geometry,
    pub material: Material,
    pub transform: Transform,
    pub receive_shadow: bool,
}

impl GroundPlane {
    fn standard() -> Self {
        Self {
            geometry: Geometry::Plane {
                width: 50.0,
                height: 50.0,
            },
            material: Material::Standard {
                color: Rgb(0x2d3561),
                roughness: 0.8,
                metalness: 0.2,
            },
            transform: Transform {
                position: Vec3::new(0.0, -6.0, 0.0),
                rotation: Vec3::new(-std::f32::consts::FRAC_PI_2, 0.0, 0.0),
                scale: Vec3::ONE,
            },
            receive_shadow: true,
        }
    }
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: Rgb,
    pub near: f32,
    pub far: f32,
}

/// Root scene node. Exclusively owns the objects, the ground and the lights.
///
/// The object array has a fixed length, so the object count cannot change
/// for the lifetime of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    background: Rgb,
    fog: Fog,
    objects: [SceneObject; OBJECT_COUNT],
    ground: GroundPlane,
    lights: LightingRig,
}

impl Scene {
    /// Build the demo scene. Deterministic: every call returns an equal scene.
    pub fn build() -> Self {
        let background = Rgb(0x1a1a2e);
        let scene = Self {
            background,
            fog: Fog {
                color: background,
                near: 100.0,
                far: 1000.0,
            },
            objects: build_objects(),
            ground: GroundPlane::standard(),
            lights: LightingRig::standard(),
        };
        tracing::debug!(
            objects = OBJECT_COUNT,
            lights = scene.lights.iter().count(),
            "scene built"
        );
        scene
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn fog(&self) -> &Fog {
        &self.fog
    }

    pub fn objects(&self) -> &[SceneObject; OBJECT_COUNT] {
        &self.objects
    }

    /// Mutable access to the objects. The slice length is fixed.
    pub fn objects_mut(&mut self) -> &mut [SceneObject; OBJECT_COUNT] {
        &mut self.objects
    }

    pub fn object(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn ground(&self) -> &GroundPlane {
        &self.ground
    }

    pub fn lights(&self) -> &LightingRig {
        &self.lights
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::build()
    }
}

fn phong(color: u32, emissive: u32) -> Material {
    Material::Phong {
        color: Rgb(color),
        emissive: Rgb(emissive),
        shininess: 100.0,
    }
}

fn build_objects() -> [SceneObject; OBJECT_COUNT] {
    [
        SceneObject::new(
            0,
            GeometryKind::Cube,
            Geometry::Box {
                width: 2.0,
                height: 2.0,
                depth: 2.0,
            },
            phong(0xff6b6b, 0x330000),
            Vec3::new(-4.0, 0.0, 0.0),
        ),
        SceneObject::new(
            1,
            GeometryKind::Sphere,
            Geometry::Sphere {
                radius: 1.5,
                width_segments: 32,
                height_segments: 32,
            },
            phong(0x4ecdc4, 0x003333),
            Vec3::new(0.0, 0.0, 0.0),
        ),
        SceneObject::new(
            2,
            GeometryKind::Tetrahedron,
            Geometry::Tetrahedron {
                radius: 1.5,
                detail: 0,
            },
            phong(0xffd93d, 0x332200),
            Vec3::new(4.0, 0.0, 0.0),
        ),
        SceneObject::new(
            3,
            GeometryKind::Torus,
            Geometry::Torus {
                radius: 2.0,
                tube: 0.4,
                radial_segments: 16,
                tubular_segments: 100,
            },
            phong(0xa8edea, 0x001a1a),
            Vec3::new(-2.0, 3.0, 0.0),
        ),
        SceneObject::new(
            4,
            GeometryKind::Icosahedron,
            Geometry::Icosahedron {
                radius: 1.2,
                detail: 4,
            },
            phong(0xff006e, 0x330011),
            Vec3::new(2.0, 3.0, 0.0),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_has_five_objects_in_index_order() {
        let scene = Scene::build();
        assert_eq!(scene.object_count(), OBJECT_COUNT);
        for (i, obj) in scene.objects().iter().enumerate() {
            assert_eq!(obj.index(), i);
            assert!(obj.cast_shadow && obj.receive_shadow);
        }
    }

    #[test]
    fn kinds_are_distinct_and_ordered() {
        let scene = Scene::build();
        let kinds: Vec<GeometryKind> = scene.objects().iter().map(|o| o.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                GeometryKind::Cube,
                GeometryKind::Sphere,
                GeometryKind::Tetrahedron,
                GeometryKind::Torus,
                GeometryKind::Icosahedron,
            ]
        );
    }

    #[test]
    fn stored_kind_matches_geometry() {
        let scene = Scene::build();
        for obj in scene.objects() {
            assert_eq!(obj.geometry().kind(), Some(obj.kind()), "object {}", obj.index());
        }
    }

    #[test]
    fn build_is_deterministic() {
        assert_eq!(Scene::build(), Scene::build());
    }

    #[test]
    fn objects_start_at_rest() {
        let scene = Scene::build();
        for obj in scene.objects() {
            assert_eq!(obj.transform.position, obj.rest_position());
            assert_eq!(obj.transform.rotation, Vec3::ZERO);
        }
        assert_eq!(
            scene.object(3).unwrap().rest_position(),
            Vec3::new(-2.0, 3.0, 0.0)
        );
        assert!(scene.object(OBJECT_COUNT).is_none());
    }

    #[test]
    fn ground_faces_up_below_objects() {
        let scene = Scene::build();
        let ground = scene.ground();
        assert_eq!(ground.transform.position.y, -6.0);
        assert!(ground.geometry.kind().is_none());
        let normal = ground.transform.matrix().transform_vector3(Vec3::Z);
        assert!(normal.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn fog_matches_background() {
        let scene = Scene::build();
        assert_eq!(scene.fog().color, scene.background());
        assert!(scene.fog().near < scene.fog().far);
    }
}
