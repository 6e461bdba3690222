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
//! Octree over static mesh triangles
//!
//! The tree is built once and never mutated, so a shared `Arc<MeshOctree>`
//! can be queried from any number of threads without locking.
//!
//! # Construction
//!
//! The root box is the mesh bounds, inflated slightly so flat meshes still
//! have volume. A node is split into its eight octants while it holds more
//! than [`OctreeSettings::max_triangles_per_leaf`] triangles and is shallower
//! than [`OctreeSettings::max_depth`]. A triangle is stored in every octant
//! its bounding box touches; octants that receive nothing are not created.
//! A node stays a leaf when splitting would hand every octant its full
//! triangle list.
//!
//! # Queries
//!
//! Sphere queries descend only into children whose box overlaps the sphere
//! and test triangles at the leaves, stopping at the first hit.

use super::mesh::TriangleMesh;
use super::primitives::Aabb;
use glam::Vec3;

const ROOT_MARGIN: f32 = 1e-3;

/// Deepest tree [`SimulationConfig::validate`](crate::SimulationConfig::validate) accepts
pub const MAX_OCTREE_DEPTH: usize = 16;

/// Tree construction limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeSettings {
    /// Split a node while it holds more triangles than this
    pub max_triangles_per_leaf: usize,
    /// Never split below this depth (root is depth 0)
    pub max_depth: usize,
}

impl Default for OctreeSettings {
    fn default() -> Self {
        OctreeSettings {
            max_triangles_per_leaf: 8,
            max_depth: 8,
        }
    }
}

#[derive(Debug)]
enum NodeKind {
    Leaf(Vec<u32>),
    Branch(Vec<OctreeNode>),
}

#[derive(Debug)]
struct OctreeNode {
    bounds: Aabb,
    kind: NodeKind,
}

impl OctreeNode {
    fn build(
        bounds: Aabb,
        triangles: Vec<u32>,
        tri_bounds: &[Aabb],
        depth: usize,
        settings: &OctreeSettings,
    ) -> Self {
        if triangles.len() <= settings.max_triangles_per_leaf || depth >= settings.max_depth {
            return OctreeNode {
                bounds,
                kind: NodeKind::Leaf(triangles),
            };
        }

        let split: Vec<(Aabb, Vec<u32>)> = (0..8)
            .map(|octant| {
                let child_bounds = bounds.octant(octant);
                let members: Vec<u32> = triangles
                    .iter()
                    .copied()
                    .filter(|&t| tri_bounds[t as usize].intersects(&child_bounds))
                    .collect();
                (child_bounds, members)
            })
            .filter(|(_, members)| !members.is_empty())
            .collect();

        // Triangles covering the whole node land in every octant; splitting
        // further would only copy them.
        if split.iter().all(|(_, members)| members.len() == triangles.len()) {
            return OctreeNode {
                bounds,
                kind: NodeKind::Leaf(triangles),
            };
        }

        let children = split
            .into_iter()
            .map(|(child_bounds, members)| {
                OctreeNode::build(child_bounds, members, tri_bounds, depth + 1, settings)
            })
            .collect();

        OctreeNode {
            bounds,
            kind: NodeKind::Branch(children),
        }
    }

    fn hits_sphere(&self, mesh: &TriangleMesh, center: Vec3, radius: f32) -> bool {
        if !self.bounds.intersects_sphere(center, radius) {
            return false;
        }
        match &self.kind {
            NodeKind::Leaf(triangles) => triangles.iter().any(|&t| {
                mesh.triangle(t as usize)
                    .map_or(false, |tri| tri.intersects_sphere(center, radius))
            }),
            NodeKind::Branch(children) => children
                .iter()
                .any(|child| child.hits_sphere(mesh, center, radius)),
        }
    }

    fn stats(&self, depth: usize, out: &mut OctreeStats) {
        out.nodes += 1;
        out.depth = out.depth.max(depth);
        match &self.kind {
            NodeKind::Leaf(triangles) => {
                out.leaves += 1;
                out.triangle_refs += triangles.len();
            }
            NodeKind::Branch(children) => {
                for child in children {
                    child.stats(depth + 1, out);
                }
            }
        }
    }
}

/// Shape summary of a built tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OctreeStats {
    /// Total nodes, including the root
    pub nodes: usize,
    /// Leaf nodes
    pub leaves: usize,
    /// Deepest leaf (root is 0)
    pub depth: usize,
    /// Triangle references summed over leaves; triangles straddling octant
    /// boundaries are counted once per leaf
    pub triangle_refs: usize,
}

/// Read-only collision index over a triangle mesh
///
/// # Examples
///
/// ```
/// use particle_sim::geometry::{MeshOctree, TriangleMesh};
/// use glam::Vec3;
///
/// let floor = TriangleMesh::from_buffers(
///     vec![Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0)],
///     vec![0, 1, 2],
/// ).unwrap();
/// let octree = MeshOctree::build(floor);
///
/// assert!(octree.check_collision(Vec3::new(0.0, 0.05, 0.0), 0.1));
/// assert!(!octree.check_collision(Vec3::new(0.0, 1.0, 0.0), 0.1));
/// ```
#[derive(Debug)]
pub struct MeshOctree {
    mesh: TriangleMesh,
    root: Option<OctreeNode>,
    settings: OctreeSettings,
}

impl MeshOctree {
    /// Build with default settings
    pub fn build(mesh: TriangleMesh) -> Self {
        Self::with_settings(mesh, OctreeSettings::default())
    }

    /// Build with explicit limits
    pub fn with_settings(mesh: TriangleMesh, settings: OctreeSettings) -> Self {
        let tri_bounds: Vec<Aabb> = mesh.triangles().map(|t| t.bounds()).collect();
        let root = mesh.bounds().map(|bounds| {
            let all: Vec<u32> = (0..tri_bounds.len() as u32).collect();
            OctreeNode::build(bounds.inflated(ROOT_MARGIN), all, &tri_bounds, 0, &settings)
        });

        let tree = MeshOctree { mesh, root, settings };
        let stats = tree.stats();
        log::debug!(
            "Octree built over {} triangles: {} nodes, {} leaves, depth {}",
            tree.mesh.triangle_count(),
            stats.nodes,
            stats.leaves,
            stats.depth
        );
        tree
    }

    /// True if a sphere at `position` with `radius` touches any triangle
    ///
    /// Always false for an empty mesh.
    pub fn check_collision(&self, position: Vec3, radius: f32) -> bool {
        if !position.is_finite() {
            return false;
        }
        self.root
            .as_ref()
            .map_or(false, |root| root.hits_sphere(&self.mesh, position, radius))
    }

    /// The indexed mesh
    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// Root bounds, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_ref().map(|r| r.bounds)
    }

    /// Limits the tree was built with
    pub fn settings(&self) -> OctreeSettings {
        self.settings
    }

    /// Node, leaf and depth counts
    pub fn stats(&self) -> OctreeStats {
        let mut stats = OctreeStats::default();
        if let Some(root) = &self.root {
            root.stats(0, &mut stats);
        }
        stats
    }
}
