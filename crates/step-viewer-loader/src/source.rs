// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! File sources: local filesystem and in-memory

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use step_viewer_model::{FileSource, LoadError, Result};

/// Reads piece files from disk
///
/// Paths are resolved against `root`; a leading `/` is treated as relative to
/// the root, the way a web server maps `/assets/...`.
#[derive(Clone, Debug, Default)]
pub struct FsSource {
    root: Option<PathBuf>,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Resolve paths as given, relative to the working directory
    pub fn unrooted() -> Self {
        Self::default()
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(path),
        }
    }
}

impl FileSource for FsSource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        async move {
            let resolved = self.resolve(path);
            let bytes = tokio::fs::read(&resolved)
                .await
                .map_err(|e| LoadError::fetch(path, format!("{}: {}", resolved.display(), e)))?;
            log::debug!("[Loader] Fetched {} ({} bytes)", path, bytes.len());
            Ok(bytes)
        }
        .boxed()
    }
}

/// Serves piece files from memory
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    pub fn with_file(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl FileSource for MemorySource {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        let result = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::fetch(path, "404 Not Found"));
        futures_util::future::ready(result).boxed()
    }
}
