// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Asynchronous byte sources for piece files

use crate::Result;
use futures_util::future::BoxFuture;

/// Fetches raw file bytes by path
///
/// Implementations may read from disk, memory or the network. Failures are
/// reported as [`LoadError::FetchFailure`](crate::LoadError::FetchFailure).
pub trait FileSource: Send + Sync {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;
}
