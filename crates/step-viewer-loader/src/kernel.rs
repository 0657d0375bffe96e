// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Kernel readiness wait and handle lifecycle
//!
//! construct provider -> [`wait_for_kernel`] (bounded poll) -> [`KernelHandle`]
//! -> [`KernelHandle::release`] (or drop)

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use step_viewer_model::{GeometryKernel, KernelProvider, LoadError, Result};
use tokio::time::Instant;

/// Usable kernel handle, shut down when released or dropped
pub struct KernelHandle {
    kernel: Arc<dyn GeometryKernel>,
}

impl KernelHandle {
    pub fn new(kernel: Arc<dyn GeometryKernel>) -> Self {
        Self { kernel }
    }

    /// Explicitly release the kernel
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for KernelHandle {
    type Target = dyn GeometryKernel;

    fn deref(&self) -> &Self::Target {
        self.kernel.as_ref()
    }
}

impl Drop for KernelHandle {
    fn drop(&mut self) {
        self.kernel.shutdown();
    }
}

/// Poll a provider until it hands out a kernel or the timeout passes
///
/// The first check happens immediately; later checks run every `interval`.
/// The last check lands on the deadline, never after it.
pub async fn wait_for_kernel(
    provider: &dyn KernelProvider,
    interval: Duration,
    timeout: Duration,
) -> Result<KernelHandle> {
    let started = Instant::now();
    let deadline = started + timeout;
    let mut next_check = started;

    loop {
        if let Some(kernel) = provider.try_acquire() {
            log::debug!("[Loader] Kernel ready after {:?}", started.elapsed());
            return Ok(KernelHandle::new(kernel));
        }

        if Instant::now() >= deadline {
            let waited = started.elapsed();
            log::warn!("[Loader] Kernel not ready after {:?}, giving up", waited);
            return Err(LoadError::KernelUnavailable { waited });
        }

        next_check = (next_check + interval).min(deadline);
        tokio::time::sleep_until(next_check).await;
    }
}
