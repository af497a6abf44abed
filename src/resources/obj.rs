//! Wavefront OBJ parsing.
//!
//! Only geometry is read: `v`, `vt`, `vn`, `f` and the `o`/`g` grouping
//! statements. Material statements are recognised and skipped, everything else
//! is ignored. Malformed lines are logged with their line number and dropped;
//! they never abort the whole file.
//!
//! Vertices are emitted per face corner (three per triangle) with sequential
//! indices, so every mesh can be drawn with a plain index buffer.

use std::io::BufRead;

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::model::{Aabb, MeshData, MeshVertex};

/// CPU side result of parsing an OBJ file: one [`MeshData`] per non-empty
/// object or group, plus the bounds of every emitted vertex.
#[derive(Clone, Debug)]
pub struct ParsedModel {
    pub name: String,
    pub meshes: Vec<MeshData>,
    pub bounds: Aabb,
}

/// One resolved face corner. Indices are zero based and already range checked
/// for positions; texture and normal indices are checked when used.
#[derive(Clone, Copy, Debug)]
struct Corner {
    position: usize,
    tex: Option<usize>,
    normal: Option<usize>,
}

#[derive(Debug)]
struct Group {
    name: String,
    triangles: Vec<[Corner; 3]>,
}

impl Group {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            triangles: Vec::new(),
        }
    }
}

#[derive(Default)]
struct Attributes {
    positions: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
}

/// Model name derived from a path: the file name without its extension.
pub fn model_name(path: &str) -> &str {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    }
}

/// Parses OBJ text. Returns `None` when the input holds no faces at all, or
/// when reading fails part way. Bytes that are not valid UTF-8 are replaced.
pub fn parse<R: BufRead>(mut reader: R, source_name: &str) -> Option<ParsedModel> {
    let mut attributes = Attributes::default();
    let mut groups = Vec::new();
    let mut current = Group::new("default");

    let mut buffer = Vec::new();
    let mut line_number = 0;
    loop {
        buffer.clear();
        line_number += 1;
        match reader.read_until(b'\n', &mut buffer) {
            Ok(0) => break,
            Ok(_) => (),
            Err(e) => {
                log::warn!("Failed to read {} at line {}: {}", source_name, line_number, e);
                return None;
            }
        }
        // invalid UTF-8 is replaced, not rejected
        let decoded = String::from_utf8_lossy(&buffer);
        let line = decoded.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        let args: Vec<&str> = tokens.collect();

        match keyword {
            "v" => match parse_floats::<3>(&args) {
                Some(position) => attributes.positions.push(position),
                None => log::warn!("{}:{}: malformed vertex: {}", source_name, line_number, line),
            },
            "vt" => match parse_floats::<2>(&args) {
                Some(tex) => attributes.tex_coords.push(tex),
                None => log::warn!(
                    "{}:{}: malformed texture coordinate: {}",
                    source_name,
                    line_number,
                    line
                ),
            },
            "vn" => match parse_floats::<3>(&args) {
                Some(normal) => attributes.normals.push(normalize(normal)),
                None => log::warn!("{}:{}: malformed normal: {}", source_name, line_number, line),
            },
            "f" => parse_face(&args, &attributes, &mut current, source_name, line_number),
            "o" | "g" => {
                if let Some(name) = args.first() {
                    let next = Group::new(name);
                    let finished = std::mem::replace(&mut current, next);
                    if !finished.triangles.is_empty() {
                        groups.push(finished);
                    }
                    log::debug!("New object/group: {}", name);
                }
            }
            "mtllib" | "usemtl" => {
                if let Some(name) = args.first() {
                    log::debug!("Ignoring material statement {} {}", keyword, name);
                }
            }
            "s" => (),
            other => log::trace!("Ignoring OBJ directive: {}", other),
        }
    }
    if !current.triangles.is_empty() {
        groups.push(current);
    }

    if groups.is_empty() {
        log::warn!("No mesh data found in OBJ file: {}", source_name);
        return None;
    }

    let mut bounds = Aabb::empty();
    let meshes: Vec<MeshData> = groups
        .iter()
        .map(|group| build_mesh(group, &attributes, &mut bounds))
        .collect();

    let name = model_name(source_name).to_string();
    log::info!("Loaded OBJ model '{}' with {} mesh(es)", name, meshes.len());
    Some(ParsedModel {
        name,
        meshes,
        bounds,
    })
}

/// Parses the first `N` arguments as floats. Extra arguments (such as the
/// optional `w` component) are ignored.
fn parse_floats<const N: usize>(args: &[&str]) -> Option<[f32; N]> {
    if args.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.parse().ok()?;
    }
    Some(out)
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let v: Vector3<f32> = v.into();
    if v.magnitude2() == 0.0 {
        return v.into();
    }
    v.normalize().into()
}

/// Resolves a 1-based OBJ index (negative counts back from the end) against a
/// list of `len` elements. Zero and out-of-range indices resolve to `None`.
fn resolve_index(raw: i64, len: usize) -> Option<usize> {
    let resolved = if raw < 0 { len as i64 + raw } else { raw - 1 };
    (0..len as i64)
        .contains(&resolved)
        .then_some(resolved as usize)
}

/// Parses one `pos[/tex][/normal]` face corner.
///
/// `Err` means the token itself is malformed. `Ok(None)` means the position
/// index does not name a known vertex, so the corner is dropped.
fn parse_corner(
    token: &str,
    attributes: &Attributes,
) -> Result<Option<Corner>, std::num::ParseIntError> {
    let mut parts = token.split('/');
    let position = parts.next().unwrap_or("").parse::<i64>()?;

    let mut optional = |len: usize| -> Result<Option<usize>, std::num::ParseIntError> {
        match parts.next() {
            Some(part) if !part.is_empty() => Ok(resolve_index(part.parse()?, len)),
            _ => Ok(None),
        }
    };
    let tex = optional(attributes.tex_coords.len())?;
    let normal = optional(attributes.normals.len())?;

    Ok(resolve_index(position, attributes.positions.len()).map(|position| Corner {
        position,
        tex,
        normal,
    }))
}

fn parse_face(
    args: &[&str],
    attributes: &Attributes,
    group: &mut Group,
    source_name: &str,
    line_number: usize,
) {
    if args.len() < 3 {
        log::warn!("{}:{}: face with less than 3 vertices", source_name, line_number);
        return;
    }

    let mut corners = Vec::with_capacity(args.len());
    for token in args {
        match parse_corner(token, attributes) {
            Ok(Some(corner)) => corners.push(corner),
            Ok(None) => log::warn!(
                "{}:{}: face index out of range: {}",
                source_name,
                line_number,
                token
            ),
            Err(e) => {
                log::warn!(
                    "{}:{}: malformed face vertex {}: {}",
                    source_name,
                    line_number,
                    token,
                    e
                );
                return;
            }
        }
    }

    if corners.len() < 3 {
        log::warn!("{}:{}: face has less than 3 usable vertices", source_name, line_number);
        return;
    }
    // fan around the first corner
    for i in 1..corners.len() - 1 {
        group.triangles.push([corners[0], corners[i], corners[i + 1]]);
    }
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let a: Vector3<f32> = a.into();
    let b: Vector3<f32> = b.into();
    let c: Vector3<f32> = c.into();
    let n = (b - a).cross(c - a);
    if n.magnitude2() <= f32::EPSILON * f32::EPSILON {
        return MeshVertex::UP;
    }
    n.normalize().into()
}

fn build_mesh(group: &Group, attributes: &Attributes, bounds: &mut Aabb) -> MeshData {
    let mut vertices = Vec::with_capacity(group.triangles.len() * 3);
    let mut all_textured = true;

    for triangle in &group.triangles {
        let positions = triangle.map(|corner| attributes.positions[corner.position]);
        let needs_face_normal = triangle
            .iter()
            .any(|corner| corner.normal.is_none());
        let flat = needs_face_normal.then(|| face_normal(positions[0], positions[1], positions[2]));

        for (corner, position) in triangle.iter().zip(positions) {
            bounds.include(position);
            let normal = corner
                .normal
                .map(|n| attributes.normals[n])
                .or(flat)
                .unwrap_or(MeshVertex::UP);
            let tex_coords = match corner.tex.map(|t| attributes.tex_coords[t]) {
                // OBJ puts v = 0 at the bottom, wgpu samples from the top
                Some([u, v]) => [u, 1.0 - v],
                None => {
                    all_textured = false;
                    [0.0, 0.0]
                }
            };
            vertices.push(MeshVertex {
                position,
                color: MeshVertex::WHITE,
                normal,
                tex_coords,
            });
        }
    }

    let indices = (0..vertices.len() as u32).collect();
    MeshData {
        name: group.name.clone(),
        vertices,
        indices,
        has_tex_coords: all_textured,
    }
}
