// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`GeometryKernel`] implementation over truck
//!
//! Scratch buffers are plain in-process copies of the file bytes. Reading
//! parses the exchange structure, converts every shell to topology and
//! tessellates it face by face.

use crate::shape::{TruckEdge, TruckFace, TruckShape};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use step_viewer_model::{
    GeometryKernel, KernelShape, LoadError, MeshingParams, Result, ScratchId,
};
use truck_meshalgo::prelude::*;
use truck_stepio::r#in::{ruststep, Table};

/// Tolerance used when a relative or invalid tolerance cannot be resolved
const FALLBACK_TOLERANCE: f64 = 0.01;

struct Scratch {
    file_name: String,
    bytes: Arc<[u8]>,
}

/// Pure Rust B-rep kernel, ready as soon as it is constructed
///
/// Only the linear deflection of [`MeshingParams`] is honored; truck has no
/// angular bound. With `relative` set, the deflection is taken as a fraction
/// of the shell's bounding box diameter.
#[derive(Default)]
pub struct TruckKernel {
    scratch: Mutex<FxHashMap<u64, Scratch>>,
    next_id: AtomicU64,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scratch buffers not yet released
    pub fn outstanding(&self) -> usize {
        self.buffers().len()
    }

    fn buffers(&self) -> MutexGuard<'_, FxHashMap<u64, Scratch>> {
        self.scratch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GeometryKernel for TruckKernel {
    fn allocate(&self, file_name: &str, bytes: &[u8]) -> Result<ScratchId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.buffers().insert(
            id,
            Scratch {
                file_name: file_name.to_string(),
                bytes: Arc::from(bytes),
            },
        );
        Ok(ScratchId(id))
    }

    fn read(&self, scratch: ScratchId, params: &MeshingParams) -> Result<Box<dyn KernelShape>> {
        let (file_name, bytes) = {
            let buffers = self.buffers();
            let entry = buffers
                .get(&scratch.0)
                .ok_or_else(|| LoadError::geometry(format!("unknown scratch buffer {}", scratch.0)))?;
            (entry.file_name.clone(), Arc::clone(&entry.bytes))
        };
        read_step(&file_name, &bytes, params).map(|shape| Box::new(shape) as Box<dyn KernelShape>)
    }

    fn release(&self, scratch: ScratchId) {
        self.buffers().remove(&scratch.0);
    }
}

/// Parse and tessellate a STEP file held in memory
pub fn read_step(file_name: &str, bytes: &[u8], params: &MeshingParams) -> Result<TruckShape> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| LoadError::parse(file_name, format!("not a text file: {}", e)))?;
    let exchange = ruststep::parser::parse(text)
        .map_err(|e| LoadError::parse(file_name, format!("invalid exchange structure: {}", e)))?;
    let Some(data) = exchange.data.first() else {
        return Err(LoadError::parse(file_name, "no data section"));
    };
    let table = Table::from_data_section(data);

    let mut shells: Vec<_> = table.shell.iter().collect();
    shells.sort_by_key(|(id, _)| **id);

    let mut shape = TruckShape::default();
    for (id, holder) in shells {
        let compressed = table.to_compressed_shell(holder).map_err(|e| {
            LoadError::parse(file_name, format!("shell #{} has no usable topology: {}", id, e))
        })?;

        let tolerance = if params.relative {
            let coarse = compressed.robust_triangulation(FALLBACK_TOLERANCE).to_polygon();
            coarse.bounding_box().diameter() * params.linear_deflection
        } else {
            params.linear_deflection
        };
        let tolerance = if tolerance.is_normal() && tolerance > 0.0 {
            tolerance
        } else {
            FALLBACK_TOLERANCE
        };

        let meshed = compressed.robust_triangulation(tolerance);
        let face_start = shape.faces.len();
        for face in &meshed.faces {
            let oriented = face.surface.as_ref().map(|surface| {
                if face.orientation {
                    surface.clone()
                } else {
                    surface.inverse()
                }
            });
            shape.faces.push(match oriented {
                Some(mesh) => TruckFace::from_mesh(&mesh),
                None => TruckFace::default(),
            });
        }
        shape
            .edges
            .extend(meshed.edges.iter().map(|edge| TruckEdge::from_polyline(&edge.curve.0)));

        log::debug!(
            "[Truck] {}: shell #{} gave {} faces at tolerance {}",
            file_name,
            id,
            shape.faces.len() - face_start,
            tolerance
        );
    }

    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_parts::cube_step;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use step_viewer_model::{KernelEdge, KernelFace, ScratchGuard};

    #[test]
    fn test_cube_faces_and_edges() {
        let step = cube_step(10.0);
        let shape = read_step("cube.stp", step.as_bytes(), &MeshingParams::default()).unwrap();

        assert!(!shape.is_null());
        assert_eq!(shape.faces().count(), 6);
        assert_eq!(shape.edges().count(), 12);
        for face in shape.faces() {
            assert_relative_eq!(face.surface_area(), 100.0, epsilon = 1e-6);
            let triangulation = face.triangulation().unwrap();
            assert!(triangulation.triangle_count() >= 2);
            let normal = face.normal_at(&triangulation.nodes[0]);
            assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-6);
        }
        for edge in shape.edges() {
            assert_relative_eq!(edge.length(), 10.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_planar_faces_have_one_normal() {
        let step = cube_step(2.0);
        let shape = read_step("cube.stp", step.as_bytes(), &MeshingParams::default()).unwrap();

        for face in shape.faces() {
            let triangulation = face.triangulation().unwrap();
            let first = face.normal_at(&triangulation.nodes[0]);
            let axis_aligned = [Vector3::x(), Vector3::y(), Vector3::z()]
                .iter()
                .any(|axis| (first.dot(axis).abs() - 1.0).abs() < 1e-6);
            assert!(axis_aligned);
            for node in &triangulation.nodes {
                assert_relative_eq!(face.normal_at(node), first, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_relative_tolerance_reads_same_topology() {
        let step = cube_step(10.0);
        let params = MeshingParams {
            relative: true,
            ..MeshingParams::with_tolerance(0.001)
        };
        let shape = read_step("cube.stp", step.as_bytes(), &params).unwrap();
        assert_eq!(shape.faces().count(), 6);
    }

    #[test]
    fn test_rejects_non_step_content() {
        let err = read_step("Part1.stp", b"solid cube\nendsolid", &MeshingParams::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::ParseFailure { ref path, .. } if path == "Part1.stp"));

        let err = read_step("Part1.stp", &[0xff, 0xfe, 0x00], &MeshingParams::default()).unwrap_err();
        assert!(err.to_string().contains("not a text file"));
    }

    #[test]
    fn test_scratch_lifecycle() {
        let kernel = TruckKernel::new();
        let step = cube_step(1.0);
        {
            let guard = ScratchGuard::allocate(&kernel, "cube.stp", step.as_bytes()).unwrap();
            assert_eq!(kernel.outstanding(), 1);
            let shape = kernel.read(guard.id(), &MeshingParams::default()).unwrap();
            assert_eq!(shape.faces().count(), 6);
        }
        assert_eq!(kernel.outstanding(), 0);

        let err = kernel
            .read(ScratchId(99), &MeshingParams::default())
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::Geometry(_)));
    }
}
