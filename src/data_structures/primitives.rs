//! Built-in shapes used whenever an object has no custom model, or its custom
//! model could not be loaded.
//!
//! All shapes are unit sized around the origin (the pyramid and cylinder stand on
//! the ground plane) and tinted white; the per-object colour is applied by the
//! renderer.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::model::{MeshData, MeshVertex};

const SEGMENTS: u32 = 16;

/// Name of a built-in primitive as referenced by an object's `model` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Cube,
    Sphere,
    Cylinder,
    Pyramid,
}

impl Primitive {
    pub const ALL: [Primitive; 4] = [
        Primitive::Cube,
        Primitive::Sphere,
        Primitive::Cylinder,
        Primitive::Pyramid,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cube" => Some(Primitive::Cube),
            "sphere" => Some(Primitive::Sphere),
            "cylinder" => Some(Primitive::Cylinder),
            "pyramid" => Some(Primitive::Pyramid),
            _ => None,
        }
    }

    /// Like [`from_name`](Self::from_name) but unknown names draw as a cube.
    pub fn from_name_or_cube(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Primitive::Cube)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Cube => "cube",
            Primitive::Sphere => "sphere",
            Primitive::Cylinder => "cylinder",
            Primitive::Pyramid => "pyramid",
        }
    }

    pub fn mesh_data(&self) -> MeshData {
        match self {
            Primitive::Cube => cube(),
            Primitive::Sphere => sphere(SEGMENTS),
            Primitive::Cylinder => cylinder(SEGMENTS),
            Primitive::Pyramid => pyramid(),
        }
    }
}

fn vertex(position: [f32; 3], normal: [f32; 3]) -> MeshVertex {
    MeshVertex {
        position,
        color: MeshVertex::WHITE,
        normal,
        tex_coords: [0.0; 2],
    }
}

fn flat_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let a: Vector3<f32> = a.into();
    let b: Vector3<f32> = b.into();
    let c: Vector3<f32> = c.into();
    (b - a).cross(c - a).normalize().into()
}

/// Pushes a quad (two triangles) sharing a single normal.
fn quad(mesh: &mut MeshData, corners: [[f32; 3]; 4], normal: [f32; 3]) {
    let base = mesh.vertices.len() as u32;
    mesh.vertices
        .extend(corners.iter().map(|&corner| vertex(corner, normal)));
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
}

pub fn cube() -> MeshData {
    let mut mesh = MeshData {
        name: "cube".to_string(),
        ..Default::default()
    };
    let h = 0.5;
    // front, back, top, bottom, right, left
    quad(&mut mesh, [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]], [0.0, 0.0, 1.0]);
    quad(&mut mesh, [[-h, -h, -h], [-h, h, -h], [h, h, -h], [h, -h, -h]], [0.0, 0.0, -1.0]);
    quad(&mut mesh, [[-h, h, -h], [-h, h, h], [h, h, h], [h, h, -h]], [0.0, 1.0, 0.0]);
    quad(&mut mesh, [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]], [0.0, -1.0, 0.0]);
    quad(&mut mesh, [[h, -h, -h], [h, h, -h], [h, h, h], [h, -h, h]], [1.0, 0.0, 0.0]);
    quad(&mut mesh, [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]], [-1.0, 0.0, 0.0]);
    mesh
}

/// Flat ground quad of the given extent, facing up.
pub fn plane(width: f32, depth: f32) -> MeshData {
    let mut mesh = MeshData {
        name: "plane".to_string(),
        ..Default::default()
    };
    let (hw, hd) = (width / 2.0, depth / 2.0);
    quad(
        &mut mesh,
        [[-hw, 0.0, -hd], [hw, 0.0, -hd], [hw, 0.0, hd], [-hw, 0.0, hd]],
        MeshVertex::UP,
    );
    mesh
}

pub fn pyramid() -> MeshData {
    let mut mesh = MeshData {
        name: "pyramid".to_string(),
        ..Default::default()
    };
    let apex = [0.0, 1.0, 0.0];
    let b = 0.5;
    let base = [[-b, 0.0, b], [b, 0.0, b], [b, 0.0, -b], [-b, 0.0, -b]];
    for side in 0..4 {
        let (left, right) = (base[side], base[(side + 1) % 4]);
        let normal = flat_normal(apex, left, right);
        let first = mesh.vertices.len() as u32;
        mesh.vertices.extend([
            vertex(apex, normal),
            vertex(left, normal),
            vertex(right, normal),
        ]);
        mesh.indices.extend_from_slice(&[first, first + 1, first + 2]);
    }
    quad(
        &mut mesh,
        [base[3], base[2], base[1], base[0]],
        [0.0, -1.0, 0.0],
    );
    mesh
}

pub fn cylinder(segments: u32) -> MeshData {
    let mut mesh = MeshData {
        name: "cylinder".to_string(),
        ..Default::default()
    };
    let radius = 0.5;
    let height = 1.0;
    let ring = |i: u32| {
        let angle = 2.0 * PI * i as f32 / segments as f32;
        (angle.cos(), angle.sin())
    };

    for i in 0..segments {
        let (c1, s1) = ring(i);
        let (c2, s2) = ring(i + 1);
        let base = mesh.vertices.len() as u32;
        mesh.vertices.extend([
            vertex([c1 * radius, 0.0, s1 * radius], [c1, 0.0, s1]),
            vertex([c2 * radius, 0.0, s2 * radius], [c2, 0.0, s2]),
            vertex([c2 * radius, height, s2 * radius], [c2, 0.0, s2]),
            vertex([c1 * radius, height, s1 * radius], [c1, 0.0, s1]),
        ]);
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    // caps: top winds counter-clockwise seen from above, bottom from below
    for (y, normal) in [(height, MeshVertex::UP), (0.0, [0.0, -1.0, 0.0])] {
        let center = mesh.vertices.len() as u32;
        mesh.vertices.push(vertex([0.0, y, 0.0], normal));
        for i in 0..segments {
            let (c1, s1) = ring(i);
            let (c2, s2) = ring(i + 1);
            let first = mesh.vertices.len() as u32;
            let (a, b) = if y > 0.0 {
                ([c1 * radius, y, s1 * radius], [c2 * radius, y, s2 * radius])
            } else {
                ([c2 * radius, y, s2 * radius], [c1 * radius, y, s1 * radius])
            };
            mesh.vertices.extend([vertex(a, normal), vertex(b, normal)]);
            mesh.indices.extend_from_slice(&[center, first, first + 1]);
        }
    }
    mesh
}

pub fn sphere(segments: u32) -> MeshData {
    let mut mesh = MeshData {
        name: "sphere".to_string(),
        ..Default::default()
    };
    let radius = 0.5;
    let (rings, sectors) = (segments, segments);

    for r in 0..=rings {
        let phi = PI * r as f32 / rings as f32;
        let y = phi.cos() * radius;
        let ring_radius = phi.sin() * radius;
        for s in 0..=sectors {
            let theta = 2.0 * PI * s as f32 / sectors as f32;
            let x = theta.cos() * ring_radius;
            let z = theta.sin() * ring_radius;
            mesh.vertices
                .push(vertex([x, y, z], [x / radius, y / radius, z / radius]));
        }
    }

    for r in 0..rings {
        for s in 0..sectors {
            let current = r * (sectors + 1) + s;
            let next = current + sectors + 1;
            mesh.indices.extend_from_slice(&[
                current,
                next,
                current + 1,
                current + 1,
                next,
                next + 1,
            ]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_in_range(mesh: &MeshData) {
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n), "{} has a dangling index", mesh.name);
        assert_eq!(mesh.indices.len() % 3, 0);
    }

    #[test]
    fn every_primitive_is_well_formed() {
        for primitive in Primitive::ALL {
            let mesh = primitive.mesh_data();
            assert!(!mesh.vertices.is_empty());
            assert_indices_in_range(&mesh);
        }
        assert_indices_in_range(&plane(10.0, 4.0));
    }

    #[test]
    fn cube_has_twelve_triangles() {
        assert_eq!(cube().triangle_count(), 12);
    }

    #[test]
    fn pyramid_side_normals_point_outwards() {
        let mesh = pyramid();
        // first side spans the +z edge of the base
        assert!(mesh.vertices[0].normal[2] > 0.0);
        assert!(mesh.vertices[0].normal[1] > 0.0);
    }

    #[test]
    fn unknown_names_fall_back_to_cube() {
        assert_eq!(Primitive::from_name("Sphere"), Some(Primitive::Sphere));
        assert_eq!(Primitive::from_name("teapot"), None);
        assert_eq!(Primitive::from_name_or_cube("teapot"), Primitive::Cube);
    }

    #[test]
    fn names_round_trip() {
        for primitive in Primitive::ALL {
            assert_eq!(Primitive::from_name(primitive.name()), Some(primitive));
        }
    }
}
