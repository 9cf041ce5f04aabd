//! Error types for malformed construction options and mesh buffers.

/// Invalid construction options for a patch or sphere.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum QuadError {
    /// Segment count must be odd and at least 3 so every patch has a centre sample.
    #[error("segment count must be odd and >= 3, got {0}")]
    InvalidSegments(u32),

    /// Patch or sphere radius must be finite and positive.
    #[error("radius must be finite and positive, got {0}")]
    InvalidRadius(f64),

    /// Welding precision or neighbour tolerance must be finite and positive.
    #[error("{name} must be finite and positive, got {value}")]
    InvalidTolerance {
        /// Which setting was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Split factor must be positive and hysteresis at least 1.
    #[error("invalid LOD policy: split factor {split_factor}, unify hysteresis {unify_hysteresis}")]
    InvalidLodPolicy {
        split_factor: f64,
        unify_hysteresis: f64,
    },
}

/// Mesh buffers whose lengths or indices do not describe a triangle mesh.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MeshError {
    /// A flat buffer's length is not a multiple of its component count.
    #[error("{buffer} buffer length {len} is not a multiple of {stride}")]
    BadStride {
        /// Buffer name.
        buffer: &'static str,
        /// Actual length.
        len: usize,
        /// Expected component count.
        stride: usize,
    },

    /// A per-vertex attribute buffer does not have one entry per vertex.
    #[error("{buffer} buffer has {actual} entries, expected {expected}")]
    CountMismatch {
        /// Buffer name.
        buffer: &'static str,
        /// Entries found.
        actual: usize,
        /// Vertex count.
        expected: usize,
    },

    /// A triangle refers to a vertex that does not exist.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index.
        index: u32,
        /// Vertex count.
        vertex_count: usize,
    },

    /// Welding precision must be finite and positive.
    #[error("weld precision must be finite and positive, got {0}")]
    InvalidPrecision(f64),
}
