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
//! Error types for the simulation core and mesh loading
//!
//! Two families of failure exist:
//!
//! - [`SimError`] is returned by construction (bad configuration) and by
//!   [`Simulation::step`](crate::Simulation::step) when an internal invariant
//!   is broken. A failed step leaves the particle buffer unspecified.
//! - [`MeshError`] is returned by mesh loading. The simulation treats it as
//!   recoverable and simply runs without static collision.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised by the simulation engine.
#[derive(Debug, Error)]
pub enum SimError {
    /// A configuration value is outside its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A particle index produced during the step does not address the buffer.
    #[error("particle index {index} out of range for buffer of {len} particles")]
    ParticleIndexOutOfRange {
        /// Offending index
        index: usize,
        /// Length of the particle buffer
        len: usize,
    },

    /// The spatial index was built from a buffer of a different length.
    #[error("spatial index built from {indexed} particles but the buffer holds {len}")]
    StaleIndex {
        /// Buffer length the index was built from
        indexed: usize,
        /// Current buffer length
        len: usize,
    },
}

/// Errors raised while reading a triangle mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The mesh file could not be opened or read.
    #[error("failed to read mesh {path}: {source}")]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An I/O error raised by a reader without an associated path.
    #[error(transparent)]
    Read(#[from] std::io::Error),

    /// A statement could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// A face references a vertex that does not exist.
    #[error("line {line}: vertex index {index} out of range ({vertex_count} vertices)")]
    IndexOutOfRange {
        /// 1-based line number
        line: usize,
        /// Index as written in the file
        index: i64,
        /// Number of vertices declared so far
        vertex_count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_error_display() {
        let e = SimError::ParticleIndexOutOfRange { index: 12, len: 10 };
        let msg = e.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("10 particles"));

        let e = SimError::InvalidConfig("drag_coefficient must be in [0, 1]".to_string());
        assert!(e.to_string().starts_with("invalid configuration"));
    }

    #[test]
    fn test_mesh_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let e: MeshError = io.into();
        assert!(matches!(e, MeshError::Read(_)));
        assert!(e.to_string().contains("truncated"));
    }
}
