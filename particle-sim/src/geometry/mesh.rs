// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Indexed triangle meshes and Wavefront OBJ loading
//!
//! Only geometry is read: `v` statements for vertex positions and `f`
//! statements for faces. Texture coordinates, normals, groups, materials and
//! every other statement are ignored. Polygons with more than three corners
//! are fan-triangulated around their first corner.

use super::primitives::{Aabb, Triangle};
use crate::error::MeshError;
use glam::Vec3;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Shared vertex buffer plus a flat index buffer, three indices per triangle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
}

impl TriangleMesh {
    /// Mesh with no triangles
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a mesh from raw buffers
    ///
    /// Returns `None` if the index count is not a multiple of three or an
    /// index points past the vertex buffer.
    pub fn from_buffers(vertices: Vec<Vec3>, indices: Vec<u32>) -> Option<Self> {
        if indices.len() % 3 != 0 || indices.iter().any(|&i| i as usize >= vertices.len()) {
            return None;
        }
        Some(TriangleMesh { vertices, indices })
    }

    /// Read an OBJ file from disk
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| MeshError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mesh = Self::from_obj_reader(BufReader::new(file))?;
        log::info!(
            "Loaded mesh {}: {} vertices, {} triangles",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Parse OBJ text from any buffered reader
    pub fn from_obj_reader<R: BufRead>(reader: R) -> Result<Self, MeshError> {
        let mut mesh = TriangleMesh::empty();
        let mut corners: Vec<u32> = Vec::with_capacity(4);

        for (line_index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = line_index + 1;
            let mut tokens = line.split_whitespace();

            match tokens.next() {
                Some("v") => {
                    let mut coords = [0.0f32; 3];
                    for coord in coords.iter_mut() {
                        let token = tokens.next().ok_or_else(|| MeshError::Parse {
                            line: line_no,
                            message: "vertex needs three coordinates".to_string(),
                        })?;
                        *coord = parse_float(token, line_no)?;
                    }
                    mesh.vertices.push(Vec3::from_array(coords));
                }
                Some("f") => {
                    corners.clear();
                    for token in tokens {
                        corners.push(resolve_index(token, mesh.vertices.len(), line_no)?);
                    }
                    if corners.len() < 3 {
                        return Err(MeshError::Parse {
                            line: line_no,
                            message: format!("face needs at least 3 vertices, found {}", corners.len()),
                        });
                    }
                    for k in 1..corners.len() - 1 {
                        mesh.indices
                            .extend_from_slice(&[corners[0], corners[k], corners[k + 1]]);
                    }
                }
                _ => {}
            }
        }

        Ok(mesh)
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex buffer
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Index buffer
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Triangle `index`, or `None` past the end
    pub fn triangle(&self, index: usize) -> Option<Triangle> {
        let tri = self.indices.get(index * 3..index * 3 + 3)?;
        Some(Triangle::new(
            *self.vertices.get(tri[0] as usize)?,
            *self.vertices.get(tri[1] as usize)?,
            *self.vertices.get(tri[2] as usize)?,
        ))
    }

    /// Iterate over all triangles
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).filter_map(move |i| self.triangle(i))
    }

    /// Bounds of the referenced vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.triangles().flat_map(|t| [t.a, t.b, t.c]))
    }
}

fn parse_float(token: &str, line: usize) -> Result<f32, MeshError> {
    token.parse::<f32>().map_err(|_| MeshError::Parse {
        line,
        message: format!("invalid number '{}'", token),
    })
}

/// Turn an OBJ face corner (`i`, `i/t`, `i//n`, `i/t/n`, negative = relative)
/// into a zero-based vertex index
fn resolve_index(token: &str, vertex_count: usize, line: usize) -> Result<u32, MeshError> {
    let raw = token.split('/').next().unwrap_or(token);
    let index: i64 = raw.parse().map_err(|_| MeshError::Parse {
        line,
        message: format!("invalid face index '{}'", token),
    })?;

    let resolved = if index > 0 {
        index - 1
    } else {
        vertex_count as i64 + index
    };

    if index == 0 || resolved < 0 || resolved >= vertex_count as i64 || resolved > u32::MAX as i64 {
        return Err(MeshError::IndexOutOfRange {
            line,
            index,
            vertex_count,
        });
    }
    Ok(resolved as u32)
}
