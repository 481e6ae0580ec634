//! Procedural CPU meshes for every [`Geometry`] variant.
//!
//! All generators emit counter-clockwise triangles when seen from outside.

use glam::Vec3;
use orbitscene_scene::Geometry;
use std::collections::HashSet;
use std::f32::consts::{PI, TAU};

/// Triangle mesh with per-vertex normals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        index
    }

    /// Line-list indices covering each distinct triangle edge once.
    pub fn edge_indices(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut lines = Vec::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    lines.push(a);
                    lines.push(b);
                }
            }
        }
        lines
    }
}

/// Generate the mesh for a geometry description.
pub fn build(geometry: &Geometry) -> MeshData {
    let mesh = match *geometry {
        Geometry::Box {
            width,
            height,
            depth,
        } => box_mesh(width, height, depth),
        Geometry::Sphere {
            radius,
            width_segments,
            height_segments,
        } => sphere_mesh(radius, width_segments, height_segments),
        Geometry::Tetrahedron { radius, detail } => {
            polyhedron_mesh(&TETRAHEDRON_VERTICES, &TETRAHEDRON_FACES, radius, detail)
        }
        Geometry::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        } => torus_mesh(radius, tube, radial_segments, tubular_segments),
        Geometry::Icosahedron { radius, detail } => {
            polyhedron_mesh(&icosahedron_vertices(), &ICOSAHEDRON_FACES, radius, detail)
        }
        Geometry::Plane { width, height } => plane_mesh(width, height),
    };
    tracing::trace!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "mesh generated"
    );
    mesh
}

fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
    #[rustfmt::skip]
    let faces: [([[f32; 3]; 4], [f32; 3]); 6] = [
        // +Z face
        ([[-x, -y,  z], [ x, -y,  z], [ x,  y,  z], [-x,  y,  z]], [0.0, 0.0, 1.0]),
        // -Z face
        ([[ x, -y, -z], [-x, -y, -z], [-x,  y, -z], [ x,  y, -z]], [0.0, 0.0, -1.0]),
        // +X face
        ([[ x, -y,  z], [ x, -y, -z], [ x,  y, -z], [ x,  y,  z]], [1.0, 0.0, 0.0]),
        // -X face
        ([[-x, -y, -z], [-x, -y,  z], [-x,  y,  z], [-x,  y, -z]], [-1.0, 0.0, 0.0]),
        // +Y face
        ([[-x,  y,  z], [ x,  y,  z], [ x,  y, -z], [-x,  y, -z]], [0.0, 1.0, 0.0]),
        // -Y face
        ([[-x, -y, -z], [ x, -y, -z], [ x, -y,  z], [-x, -y,  z]], [0.0, -1.0, 0.0]),
    ];

    let mut mesh = MeshData::default();
    for (corners, normal) in faces {
        let n = Vec3::from_array(normal);
        let base = mesh.positions.len() as u32;
        for c in corners {
            mesh.push(Vec3::from_array(c), n);
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

fn sphere_mesh(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);
    let mut mesh = MeshData::default();

    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let dir = Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            mesh.push(dir * radius, dir);
        }
    }

    let row = w + 1;
    for iy in 0..h {
        for ix in 0..w {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            // The pole rows collapse to single triangles.
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

fn torus_mesh(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);
    let mut mesh = MeshData::default();

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let ring = radius + tube * v.cos();
            let position = Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            mesh.push(position, (position - center).normalize());
        }
    }

    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

fn plane_mesh(width: f32, height: f32) -> MeshData {
    let (x, y) = (width / 2.0, height / 2.0);
    let mut mesh = MeshData::default();
    for p in [[-x, y], [x, y], [-x, -y], [x, -y]] {
        mesh.push(Vec3::new(p[0], p[1], 0.0), Vec3::Z);
    }
    mesh.indices.extend_from_slice(&[0, 2, 1, 2, 3, 1]);
    mesh
}

const TETRAHEDRON_VERTICES: [[f32; 3]; 4] = [
    [1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
];

const TETRAHEDRON_FACES: [[usize; 3]; 4] = [[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]];

fn icosahedron_vertices() -> [[f32; 3]; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ]
}

#[rustfmt::skip]
const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

/// Subdivide each base face into `(detail + 1)^2` triangles and project the
/// result onto a sphere of `radius`.
///
/// Triangles are not shared between faces. At detail 0 normals are per face
/// (faceted solid); above that they point away from the center.
fn polyhedron_mesh(
    vertices: &[[f32; 3]],
    faces: &[[usize; 3]],
    radius: f32,
    detail: u32,
) -> MeshData {
    let cols = detail as usize + 1;
    let mut mesh = MeshData::default();

    for face in faces {
        let [a, b, c] = face.map(|i| Vec3::from_array(vertices[i]));

        // grid[i][j]: row i runs from the a-c edge to the b-c edge
        let mut grid: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);
        for i in 0..=cols {
            let t = i as f32 / cols as f32;
            let aj = a.lerp(c, t);
            let bj = b.lerp(c, t);
            let rows = cols - i;
            let row = (0..=rows)
                .map(|j| {
                    if rows == 0 {
                        aj
                    } else {
                        aj.lerp(bj, j as f32 / rows as f32)
                    }
                })
                .collect();
            grid.push(row);
        }

        for i in 0..cols {
            for j in 0..(2 * (cols - i) - 1) {
                let k = j / 2;
                let tri = if j % 2 == 0 {
                    [grid[i][k + 1], grid[i + 1][k], grid[i][k]]
                } else {
                    [grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]
                };
                push_sphere_triangle(&mut mesh, tri, radius, detail == 0);
            }
        }
    }
    mesh
}

fn push_sphere_triangle(mesh: &mut MeshData, tri: [Vec3; 3], radius: f32, flat: bool) {
    let mut p = tri.map(|v| v.normalize() * radius);
    let mut face_normal = (p[1] - p[0]).cross(p[2] - p[0]).normalize();
    let centroid = (p[0] + p[1] + p[2]) / 3.0;
    if face_normal.dot(centroid) < 0.0 {
        p.swap(1, 2);
        face_normal = -face_normal;
    }
    for v in p {
        let normal = if flat { face_normal } else { v / radius };
        let index = mesh.push(v, normal);
        mesh.indices.push(index);
    }
}
