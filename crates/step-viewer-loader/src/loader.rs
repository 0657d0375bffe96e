// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch model loading

use crate::kernel::wait_for_kernel;
use crate::piece::parse_piece_index;
use crate::LoaderConfig;
use futures_util::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use step_viewer_geometry::{extract_model, placeholder_model, unsupported_model};
use step_viewer_model::{
    FileSource, GeometryKernel, KernelProvider, LoadBatch, MeshingParams, Model, Result,
    ScratchGuard, SourceFile,
};

/// Tracks whether the consumer of a load is still around
///
/// Clones share state; tearing down any clone marks all of them dead, and
/// results finishing after that are discarded.
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn tear_down(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads piece files through an injected file source and kernel provider
pub struct ModelLoader {
    source: Arc<dyn FileSource>,
    kernels: Arc<dyn KernelProvider>,
    config: LoaderConfig,
}

impl ModelLoader {
    pub fn new(
        source: impl FileSource + 'static,
        kernels: impl KernelProvider + 'static,
        config: LoaderConfig,
    ) -> Self {
        Self::from_shared(Arc::new(source), Arc::new(kernels), config)
    }

    pub fn from_shared(
        source: Arc<dyn FileSource>,
        kernels: Arc<dyn KernelProvider>,
        config: LoaderConfig,
    ) -> Self {
        Self {
            source,
            kernels,
            config,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load every path, returning one model per path in input order
    ///
    /// Files are fetched and processed concurrently but the batch is only
    /// returned once complete. Returns `None` when `liveness` was torn down
    /// before the batch finished.
    pub async fn load(&self, paths: &[String], liveness: &Liveness) -> Option<LoadBatch> {
        if paths.is_empty() {
            return Some(LoadBatch::idle());
        }

        log::info!("[Loader] Loading {} pieces", paths.len());
        let models = match wait_for_kernel(
            self.kernels.as_ref(),
            self.config.poll_interval(),
            self.config.kernel_timeout(),
        )
        .await
        {
            Ok(kernel) => {
                let params = self.config.meshing_params();
                let models = join_all(
                    paths
                        .iter()
                        .map(|path| self.load_one(&*kernel, path, &params)),
                )
                .await;
                kernel.release();
                models
            }
            Err(e) => {
                log::warn!("[Loader] {}; using placeholders for all pieces", e);
                paths
                    .iter()
                    .map(|path| placeholder_model(path, parse_piece_index(path), Some(e.clone())))
                    .collect()
            }
        };

        if !liveness.is_alive() {
            log::debug!("[Loader] Consumer gone, discarding {} models", models.len());
            return None;
        }

        let batch = LoadBatch::from_models(models);
        log::info!(
            "[Loader] Finished: {:?}, {} models ({} placeholders)",
            batch.status,
            batch.models.len(),
            batch.fallback_count()
        );
        Some(batch)
    }

    async fn load_one(&self, kernel: &dyn GeometryKernel, path: &str, params: &MeshingParams) -> Model {
        let source = match SourceFile::new(path) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("[Loader] {}; skipping", e);
                return unsupported_model(path);
            }
        };

        match self.load_source(kernel, source, params).await {
            Ok(model) => model,
            Err(e) => {
                log::warn!("[Loader] {}", e);
                placeholder_model(path, parse_piece_index(path), Some(e))
            }
        }
    }

    async fn load_source(
        &self,
        kernel: &dyn GeometryKernel,
        source: SourceFile,
        params: &MeshingParams,
    ) -> Result<Model> {
        let bytes = self.source.fetch(&source.path).await?;
        let source = source.with_bytes(bytes);

        // Scratch memory is released when the guard drops, on every path out
        let scratch = ScratchGuard::allocate(kernel, source.file_name(), &source.bytes)?;
        let shape = kernel.read(scratch.id(), params)?;
        let model = extract_model(shape.as_ref(), &source.path)?;
        model.geometry.validate()?;

        if model.geometry.is_empty() {
            log::warn!("[Loader] {} produced no triangulated faces", source.path);
        }
        Ok(model)
    }
}
