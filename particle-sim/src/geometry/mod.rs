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
//! Static scenery for particle collision
//!
//! This module provides:
//! - Triangle meshes and an OBJ reader ([`TriangleMesh`])
//! - A read-only octree answering sphere queries ([`MeshOctree`])
//! - The box and triangle primitives both are built on
//!
//! Static geometry is optional. When no mesh is available the simulation
//! skips the static collision stage instead of failing.

mod mesh;
mod octree;
mod primitives;

pub use mesh::TriangleMesh;
pub use octree::{MeshOctree, OctreeSettings, OctreeStats, MAX_OCTREE_DEPTH};
pub use primitives::{Aabb, Triangle};
