// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry kernel boundary
//!
//! Parsing, meshing and topology queries are performed by an external B-rep
//! kernel. These traits describe the capability the viewer needs from it:
//!
//! - [`KernelProvider`] - readiness check returning a usable kernel handle
//! - [`GeometryKernel`] - scratch allocation and file reading
//! - [`KernelShape`], [`KernelFace`], [`KernelEdge`] - shape queries
//!
//! Kernel-side buffers are acquired through [`ScratchGuard`], which releases
//! them when dropped so that both success and error paths free them.

use crate::Result;
use nalgebra::{Matrix4, Point3, Vector3};
use std::sync::Arc;

/// Identifier of a kernel-side scratch buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScratchId(pub u64);

/// Meshing parameters handed to the kernel when reading a file
#[derive(Clone, Debug, PartialEq)]
pub struct MeshingParams {
    /// Maximum chordal deviation of the triangulation
    pub linear_deflection: f64,
    /// Maximum angular deviation (radians)
    pub angular_deflection: f64,
    /// Whether deflection is relative to edge size
    pub relative: bool,
    /// Allow the kernel to mesh faces in parallel
    pub parallel: bool,
}

impl MeshingParams {
    /// Parameters for a given linear tolerance, angular set to 5x linear
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            linear_deflection: tolerance,
            angular_deflection: tolerance * 5.0,
            relative: false,
            parallel: true,
        }
    }
}

impl Default for MeshingParams {
    fn default() -> Self {
        Self::with_tolerance(0.1)
    }
}

/// Triangulated representation of one face
#[derive(Clone, Debug, Default)]
pub struct FaceTriangulation {
    /// Mesh nodes in face-local coordinates
    pub nodes: Vec<Point3<f64>>,
    /// Triangles as 0-based indices into `nodes`
    pub triangles: Vec<[u32; 3]>,
    /// Face placement, `None` for identity
    pub placement: Option<Matrix4<f64>>,
}

impl FaceTriangulation {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Placement if it is present and not the identity
    pub fn effective_placement(&self) -> Option<&Matrix4<f64>> {
        self.placement
            .as_ref()
            .filter(|m| **m != Matrix4::identity())
    }
}

/// A face of a parsed shape
pub trait KernelFace {
    /// Triangulation produced by the kernel's mesher, `None` if the face has none
    fn triangulation(&self) -> Option<FaceTriangulation>;

    /// Surface property mass (area, kernel units squared)
    fn surface_area(&self) -> f64;

    /// Surface normal at a face-local point
    fn normal_at(&self, point: &Point3<f64>) -> Vector3<f64>;
}

/// An edge of a parsed shape
pub trait KernelEdge {
    /// Linear property mass (length, kernel units)
    fn length(&self) -> f64;
}

/// Read-only view of a parsed B-rep shape
pub trait KernelShape {
    /// Whether the kernel produced an empty shape
    fn is_null(&self) -> bool;

    /// Faces in traversal order
    fn faces(&self) -> Box<dyn Iterator<Item = &dyn KernelFace> + '_>;

    /// Edges in traversal order
    fn edges(&self) -> Box<dyn Iterator<Item = &dyn KernelEdge> + '_>;
}

/// Geometry kernel capability
///
/// Implementations wrap a native or WASM kernel. File content must first be
/// copied into kernel scratch memory with [`allocate`](Self::allocate); the
/// returned id is passed to [`read`](Self::read) and must eventually be given
/// back through [`release`](Self::release).
pub trait GeometryKernel: Send + Sync {
    /// Copy a file name and its bytes into kernel memory
    fn allocate(&self, file_name: &str, bytes: &[u8]) -> Result<ScratchId>;

    /// Parse and mesh the file held in a scratch buffer
    fn read(&self, scratch: ScratchId, params: &MeshingParams) -> Result<Box<dyn KernelShape>>;

    /// Free a scratch buffer
    fn release(&self, scratch: ScratchId);

    /// Tear down kernel-wide state once the handle is no longer needed
    fn shutdown(&self) {}
}

/// Readiness signal for a kernel that may still be initializing
pub trait KernelProvider: Send + Sync {
    /// Non-blocking check; returns a handle once the kernel is usable
    fn try_acquire(&self) -> Option<Arc<dyn GeometryKernel>>;
}

/// Provider for a kernel that is ready from the start
pub struct ReadyKernel(pub Arc<dyn GeometryKernel>);

impl KernelProvider for ReadyKernel {
    fn try_acquire(&self) -> Option<Arc<dyn GeometryKernel>> {
        Some(Arc::clone(&self.0))
    }
}

/// Provider for environments without a geometry kernel
#[derive(Clone, Copy, Debug, Default)]
pub struct NoKernel;

impl KernelProvider for NoKernel {
    fn try_acquire(&self) -> Option<Arc<dyn GeometryKernel>> {
        None
    }
}

/// Scoped kernel scratch buffer, released on drop
pub struct ScratchGuard<'k> {
    kernel: &'k dyn GeometryKernel,
    id: ScratchId,
}

impl<'k> ScratchGuard<'k> {
    /// Allocate a scratch buffer holding `bytes`
    pub fn allocate(kernel: &'k dyn GeometryKernel, file_name: &str, bytes: &[u8]) -> Result<Self> {
        let id = kernel.allocate(file_name, bytes)?;
        Ok(Self { kernel, id })
    }

    pub fn id(&self) -> ScratchId {
        self.id
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        self.kernel.release(self.id);
    }
}
