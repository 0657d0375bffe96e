// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP Viewer Loader - turns a list of piece paths into models
//!
//! The loader never fails hard. Every requested path yields exactly one
//! [`Model`](step_viewer_model::Model), in input order:
//!
//! - a real model when fetch, kernel read and extraction succeed
//! - a keyed placeholder when any of those steps fails for that file
//! - keyed placeholders for every path when the kernel never becomes ready
//! - a unit-cube error placeholder for paths without a CAD extension
//!
//! # Example
//!
//! ```ignore
//! use step_viewer_loader::{FsSource, Liveness, LoaderConfig, ModelLoader};
//! use step_viewer_model::NoKernel;
//!
//! let loader = ModelLoader::new(FsSource::new("assets"), NoKernel, LoaderConfig::default());
//! let liveness = Liveness::new();
//! if let Some(batch) = loader.load(&paths, &liveness).await {
//!     println!("{:?}: {} models", batch.status, batch.models.len());
//! }
//! ```

pub mod config;
pub mod kernel;
pub mod loader;
pub mod piece;
pub mod source;

pub use config::LoaderConfig;
pub use kernel::{wait_for_kernel, KernelHandle};
pub use loader::{Liveness, ModelLoader};
pub use piece::parse_piece_index;
pub use source::{FsSource, MemorySource};
