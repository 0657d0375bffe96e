// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # STEP Viewer Geometry
//!
//! Turns kernel shapes into renderable [`Model`](step_viewer_model::Model)s and builds the placeholder
//! geometry shown when a piece cannot be loaded.
//!
//! ## Overview
//!
//! - **Extraction**: walk a [`KernelShape`](step_viewer_model::KernelShape)'s faces and edges, flatten face
//!   triangulations into mesh buffers and record one entity per face/edge
//! - **Primitives**: box, sphere, cylinder, torus and cone meshes
//! - **Fallbacks**: placeholder models with a synthetic entity catalog
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use step_viewer_geometry::{extract_model, placeholder_model};
//!
//! let model = match kernel.read(scratch, &params) {
//!     Ok(shape) => extract_model(shape.as_ref(), path)?,
//!     Err(e) => placeholder_model(path, 1, Some(e)),
//! };
//! println!("{} triangles", model.geometry.triangle_count());
//! ```

pub mod extract;
pub mod fallback;
pub mod primitives;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use extract::extract_model;
pub use fallback::{
    placeholder_model, synthetic_catalog, unsupported_model, PLACEHOLDER_EDGE_COUNT,
    PLACEHOLDER_FACE_COUNT,
};
pub use primitives::{box_mesh, cone_mesh, cylinder_mesh, sphere_mesh, torus_mesh, PlaceholderShape};
