// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # STEP Viewer Truck
//!
//! A [`GeometryKernel`](step_viewer_model::GeometryKernel) backed by the pure
//! Rust [truck](https://github.com/ricosjp/truck) B-rep crates.
//!
//! ## Overview
//!
//! - **Parsing**: ISO 10303-21 exchange structures through `truck-stepio`
//! - **Topology**: every shell in the data section, in entity id order
//! - **Tessellation**: per-face meshes from `truck-meshalgo`
//! - **Properties**: face area from the mesh, edge length from its polyline
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use step_viewer_model::ReadyKernel;
//! use step_viewer_truck::TruckKernel;
//!
//! let kernels = ReadyKernel(Arc::new(TruckKernel::new()));
//! let loader = ModelLoader::new(FsSource::new("assets"), kernels, LoaderConfig::default());
//! ```

pub mod kernel;
pub mod shape;

pub use kernel::{read_step, TruckKernel};
pub use shape::{TruckEdge, TruckFace, TruckShape};


#[cfg(test)]
mod tests {
    use super::test_parts::cube_step;
    use super::*;
    use std::sync::Arc;
    use step_viewer_loader::{Liveness, LoaderConfig, MemorySource, ModelLoader};
    use step_viewer_model::{EntityKind, LoadStatus, ReadyKernel};

    fn loader(source: MemorySource, kernel: Arc<TruckKernel>) -> ModelLoader {
        ModelLoader::new(source, ReadyKernel(kernel), LoaderConfig::default())
    }

    #[tokio::test]
    async fn test_loads_real_model() {
        let kernel = Arc::new(TruckKernel::new());
        let source = MemorySource::new().with_file("/assets/Part1.stp", cube_step(10.0));
        let batch = loader(source, Arc::clone(&kernel))
            .load(&["/assets/Part1.stp".to_string()], &Liveness::new())
            .await
            .unwrap();

        assert_eq!(batch.status, LoadStatus::Success);
        let model = &batch.models[0];
        assert!(!model.is_fallback);
        assert!(model.failure.is_none());
        assert!(model.geometry.validate().is_ok());
        assert_eq!(model.faces().count(), 6);
        assert_eq!(model.edges().count(), 12);
        assert!(model.entities.iter().all(|e| e.kind != EntityKind::Error));

        let bounds = model.geometry.bounds().unwrap();
        assert_eq!(bounds.size(), [10.0, 10.0, 10.0]);
        assert_eq!(kernel.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_bad_file_falls_back_next_to_real_one() {
        let kernel = Arc::new(TruckKernel::new());
        let source = MemorySource::new()
            .with_file("/assets/Part1.stp", cube_step(5.0))
            .with_file("/assets/Part2.stp", "not a step file");
        let paths = vec!["/assets/Part1.stp".to_string(), "/assets/Part2.stp".to_string()];
        let batch = loader(source, Arc::clone(&kernel))
            .load(&paths, &Liveness::new())
            .await
            .unwrap();

        assert!(!batch.models[0].is_fallback);
        assert!(batch.models[1].is_fallback);
        assert_eq!(batch.models[1].piece_index, Some(2));
        assert_eq!(kernel.outstanding(), 0);
    }
}
