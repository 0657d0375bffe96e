// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP Viewer Model - Shared types and kernel traits for the piece viewer
//!
//! This crate defines the data that flows between the loader, the mesh
//! extraction adapter and the viewer shell, plus the traits behind which the
//! external geometry kernel and file sources live.
//!
//! # Architecture
//!
//! - [`Model`] - Renderable mesh buffers plus the entity catalog of one piece
//! - [`Entity`] - A face, edge or error record with numeric metadata
//! - [`KernelProvider`] / [`GeometryKernel`] - Injected geometry kernel capability
//! - [`KernelShape`] - Read-only view of a parsed B-rep shape
//! - [`FileSource`] - Asynchronous byte fetch by path
//!
//! # Example
//!
//! ```ignore
//! use step_viewer_model::{GeometryKernel, MeshingParams};
//!
//! let kernel = provider.try_acquire().ok_or(...)?;
//! let scratch = kernel.allocate("Part1.stp", &bytes)?;
//! let shape = kernel.read(scratch, &MeshingParams::default());
//! kernel.release(scratch);
//! ```

pub mod error;
pub mod kernel;
pub mod source;
pub mod types;

// Re-export all public types
pub use error::*;
pub use kernel::*;
pub use source::*;
pub use types::*;
