//! Flat mesh buffers and vertex welding.

use rustc_hash::FxHashMap;

use crate::error::MeshError;

/// CPU-side mesh ready for upload.
///
/// Positions and normals are packed `xyz` triples, UVs packed `uv` pairs, and
/// indices form counter-clockwise triangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub vertices: Vec<f32>,
    /// Triangle indices.
    pub indices: Vec<u32>,
    /// Per-vertex normals.
    pub normals: Vec<f32>,
    /// Per-vertex texture coordinates.
    pub uvs: Vec<f32>,
}

impl MeshData {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of vertex `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn position(&self, i: usize) -> [f32; 3] {
        [
            self.vertices[i * 3],
            self.vertices[i * 3 + 1],
            self.vertices[i * 3 + 2],
        ]
    }

    /// Appends one vertex.
    pub fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) {
        self.vertices.extend_from_slice(&position);
        self.normals.extend_from_slice(&normal);
        self.uvs.extend_from_slice(&uv);
    }

    /// Appends `other`, offsetting its indices past the existing vertices.
    pub fn append(&mut self, other: &MeshData) {
        let offset = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices
            .extend(other.indices.iter().map(|&i| i + offset));
    }

    /// Checks that the buffers describe a valid indexed triangle mesh.
    pub fn validate(&self) -> Result<(), MeshError> {
        check_stride("vertices", self.vertices.len(), 3)?;
        check_stride("normals", self.normals.len(), 3)?;
        check_stride("uvs", self.uvs.len(), 2)?;
        check_stride("indices", self.indices.len(), 3)?;

        let vertex_count = self.vertex_count();
        if self.normals.len() / 3 != vertex_count {
            return Err(MeshError::CountMismatch {
                buffer: "normals",
                actual: self.normals.len() / 3,
                expected: vertex_count,
            });
        }
        if self.uvs.len() / 2 != vertex_count {
            return Err(MeshError::CountMismatch {
                buffer: "uvs",
                actual: self.uvs.len() / 2,
                expected: vertex_count,
            });
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Position buffer as raw bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Normal buffer as raw bytes.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// UV buffer as raw bytes.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }
}

fn check_stride(buffer: &'static str, len: usize, stride: usize) -> Result<(), MeshError> {
    if len % stride == 0 {
        Ok(())
    } else {
        Err(MeshError::BadStride {
            buffer,
            len,
            stride,
        })
    }
}

/// Weld vertices whose positions round to the same `precision`-sized bucket.
///
/// The first vertex seen in each bucket is kept together with its normal and
/// UV. Triangle indices are remapped to the surviving vertices, and triangles
/// that collapse to fewer than three distinct indices are dropped; these are
/// expected where patches meet.
pub fn merge_vertices(mesh: &MeshData, precision: f64) -> Result<MeshData, MeshError> {
    mesh.validate()?;
    if !(precision.is_finite() && precision > 0.0) {
        return Err(MeshError::InvalidPrecision(precision));
    }

    let vertex_count = mesh.vertex_count();
    let mut buckets: FxHashMap<[i64; 3], u32> = FxHashMap::default();
    let mut remap = Vec::with_capacity(vertex_count);
    let mut out = MeshData::new();

    for i in 0..vertex_count {
        let position = mesh.position(i);
        let key = position.map(|c| (f64::from(c) / precision).round() as i64);
        let index = *buckets.entry(key).or_insert_with(|| {
            let next = out.vertex_count() as u32;
            out.push_vertex(
                position,
                [
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                ],
                [mesh.uvs[i * 2], mesh.uvs[i * 2 + 1]],
            );
            next
        });
        remap.push(index);
    }

    let mut dropped = 0usize;
    for tri in mesh.indices.chunks_exact(3) {
        let a = remap[tri[0] as usize];
        let b = remap[tri[1] as usize];
        let c = remap[tri[2] as usize];
        if a == b || b == c || a == c {
            dropped += 1;
            continue;
        }
        out.indices.extend_from_slice(&[a, b, c]);
    }

    if dropped > 0 {
        tracing::trace!(dropped, "dropped degenerate triangles after welding");
    }
    tracing::trace!(
        before = vertex_count,
        after = out.vertex_count(),
        "welded mesh vertices"
    );
    Ok(out)
}
