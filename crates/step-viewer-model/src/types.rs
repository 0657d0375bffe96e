// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for loaded pieces

use crate::{LoadError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognized CAD file formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CadFormat {
    /// ISO 10303-21 exchange file (`.stp` / `.step`)
    Step,
}

impl CadFormat {
    /// Detect the format from a path's extension (case-insensitive)
    pub fn from_path(path: &str) -> Option<Self> {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let (_, ext) = file_name.rsplit_once('.')?;
        [CadFormat::Step]
            .into_iter()
            .find(|format| format.extensions().iter().any(|e| ext.eq_ignore_ascii_case(e)))
    }

    /// File extensions for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            CadFormat::Step => &["stp", "step"],
        }
    }
}

/// A requested piece file
///
/// Bytes are filled in once fetched and dropped together with the source
/// after mesh extraction.
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// Path or URI as requested
    pub path: String,
    /// Format tag derived from the extension
    pub format: CadFormat,
    /// Raw payload, empty until fetched
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Create a source for a path with a recognized extension
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let format = CadFormat::from_path(&path).ok_or_else(|| LoadError::unsupported(&path))?;
        Ok(Self {
            path,
            format,
            bytes: Vec::new(),
        })
    }

    /// Attach fetched bytes
    pub fn with_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.bytes = bytes;
        self
    }

    /// File name component of the path
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("model.stp")
    }
}

/// Kind of a catalog entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Face,
    Edge,
    Error,
}

impl EntityKind {
    /// Capitalized display label
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Face => "Face",
            EntityKind::Edge => "Edge",
            EntityKind::Error => "Error",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Face => "face",
            EntityKind::Edge => "edge",
            EntityKind::Error => "error",
        };
        f.write_str(name)
    }
}

/// Numeric metadata attached to an entity
///
/// Areas are in square millimetres and lengths in millimetres by convention;
/// values are kernel-native and never converted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triangles: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piece_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntityMetadata {
    /// Metadata for a triangulated face
    pub fn face(area: f64, triangles: u32) -> Self {
        Self {
            area: Some(area),
            triangles: Some(triangles),
            ..Default::default()
        }
    }

    /// Metadata for an edge
    pub fn edge(length: f64) -> Self {
        Self {
            length: Some(length),
            ..Default::default()
        }
    }

    /// Metadata for an error record
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Tag metadata with the piece it belongs to
    pub fn with_piece_index(mut self, piece_index: u32) -> Self {
        self.piece_index = Some(piece_index);
        self
    }
}

/// A selectable entity of a model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique within its model (`face_3`, `edge_0`, ...)
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub metadata: EntityMetadata,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: EntityKind, metadata: EntityMetadata) -> Self {
        Self {
            id: id.into(),
            kind,
            metadata,
        }
    }

    pub fn is_face(&self) -> bool {
        self.kind == EntityKind::Face
    }
}

/// Axis-aligned bounds of a mesh
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshBounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl MeshBounds {
    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    pub fn size(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn diagonal(&self) -> f32 {
        let [x, y, z] = self.size();
        (x * x + y * y + z * z).sqrt()
    }
}

/// Renderable mesh buffers
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions as flattened [x, y, z, x, y, z, ...]
    pub positions: Vec<f32>,
    /// Vertex normals as flattened [nx, ny, nz, nx, ny, nz, ...]
    pub normals: Vec<f32>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create mesh with pre-allocated capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Append a vertex with its normal, returning its index
    pub fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3]) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.extend_from_slice(&position);
        self.normals.extend_from_slice(&normal);
        index
    }

    /// Append a triangle by vertex indices
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Check if mesh is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Merge another mesh into this one
    pub fn merge(&mut self, other: &MeshData) {
        let vertex_offset = self.vertex_count() as u32;

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|i| i + vertex_offset));
    }

    /// Check buffer invariants
    ///
    /// Positions and normals are parallel xyz triples, indices form whole
    /// triangles and never point past the last vertex.
    pub fn validate(&self) -> Result<()> {
        if self.positions.len() % 3 != 0 {
            return Err(LoadError::geometry(format!(
                "position buffer length {} is not a multiple of 3",
                self.positions.len()
            )));
        }
        if self.positions.len() != self.normals.len() {
            return Err(LoadError::geometry(format!(
                "{} positions but {} normals",
                self.positions.len(),
                self.normals.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(LoadError::geometry(format!(
                "index buffer length {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        let vertex_count = self.vertex_count();
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(LoadError::geometry(format!(
                "index {} out of range for {} vertices",
                bad, vertex_count
            )));
        }
        Ok(())
    }

    /// Axis-aligned bounds, `None` for an empty mesh
    pub fn bounds(&self) -> Option<MeshBounds> {
        let mut chunks = self.positions.chunks_exact(3);
        let first = chunks.next()?;
        let mut min = [first[0], first[1], first[2]];
        let mut max = min;
        for p in chunks {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Some(MeshBounds { min, max })
    }

    /// Bounding sphere (center, radius) around the bounds center
    pub fn bounding_sphere(&self) -> Option<([f32; 3], f32)> {
        let center = self.bounds()?.center();
        let radius_sq = self
            .positions
            .chunks_exact(3)
            .map(|p| {
                let dx = p[0] - center[0];
                let dy = p[1] - center[1];
                let dz = p[2] - center[2];
                dx * dx + dy * dy + dz * dz
            })
            .fold(0.0f32, f32::max);
        Some((center, radius_sq.sqrt()))
    }
}

/// One loaded piece: mesh buffers plus its entity catalog
#[derive(Clone, Debug)]
pub struct Model {
    pub geometry: MeshData,
    /// Entities in extraction order (faces first, then edges)
    pub entities: Vec<Entity>,
    pub source_path: String,
    /// Placeholder geometry stands in for the real shape
    pub is_fallback: bool,
    /// Piece number parsed from the path, set on placeholders
    pub piece_index: Option<u32>,
    /// Why the placeholder was produced
    pub failure: Option<LoadError>,
}

impl Model {
    /// Create a model from real extracted geometry
    pub fn new(geometry: MeshData, entities: Vec<Entity>, source_path: impl Into<String>) -> Self {
        Self {
            geometry,
            entities,
            source_path: source_path.into(),
            is_fallback: false,
            piece_index: None,
            failure: None,
        }
    }

    /// Iterate face entities
    pub fn faces(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.kind == EntityKind::Face)
    }

    /// Iterate edge entities
    pub fn edges(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.kind == EntityKind::Edge)
    }
}

/// Coarse status of a load request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Result of one load request: one model per requested path, in input order
#[derive(Clone, Debug, Default)]
pub struct LoadBatch {
    pub models: Vec<Model>,
    pub status: LoadStatus,
}

impl LoadBatch {
    /// Batch for an empty request
    pub fn idle() -> Self {
        Self::default()
    }

    /// Wrap loaded models, deriving the status from how many are valid
    pub fn from_models(models: Vec<Model>) -> Self {
        let status = if models.iter().any(|m| m.geometry.validate().is_ok()) {
            LoadStatus::Success
        } else {
            LoadStatus::Error
        };
        Self { models, status }
    }

    /// Number of placeholder models in the batch
    pub fn fallback_count(&self) -> usize {
        self.models.iter().filter(|m| m.is_fallback).count()
    }
}
