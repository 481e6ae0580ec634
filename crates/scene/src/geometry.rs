use serde::{Deserialize, Serialize};

/// The five animated primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Cube,
    Sphere,
    Tetrahedron,
    Torus,
    Icosahedron,
}

impl GeometryKind {
    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Cube => "cube",
            GeometryKind::Sphere => "sphere",
            GeometryKind::Tetrahedron => "tetrahedron",
            GeometryKind::Torus => "torus",
            GeometryKind::Icosahedron => "icosahedron",
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parametric geometry description. Meshes are generated from this by the
/// render layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// Regular tetrahedron inscribed in a sphere; `detail` subdivides faces.
    Tetrahedron { radius: f32, detail: u32 },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    /// Regular icosahedron inscribed in a sphere; `detail` subdivides faces.
    Icosahedron { radius: f32, detail: u32 },
    /// Flat rectangle in the XY plane facing +Z.
    Plane { width: f32, height: f32 },
}

impl Geometry {
    /// The primitive kind, or `None` for the ground plane.
    pub fn kind(&self) -> Option<GeometryKind> {
        match self {
            Geometry::Box { .. } => Some(GeometryKind::Cube),
            Geometry::Sphere { .. } => Some(GeometryKind::Sphere),
            Geometry::Tetrahedron { .. } => Some(GeometryKind::Tetrahedron),
            Geometry::Torus { .. } => Some(GeometryKind::Torus),
            Geometry::Icosahedron { .. } => Some(GeometryKind::Icosahedron),
            Geometry::Plane { .. } => None,
        }
    }
}
