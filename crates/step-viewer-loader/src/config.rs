// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loader configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use step_viewer_model::MeshingParams;

/// Loader settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Interval between kernel readiness checks (ms)
    pub poll_interval_ms: u64,
    /// Give up waiting for the kernel after this long (ms)
    pub kernel_timeout_ms: u64,
    /// Linear deflection handed to the kernel mesher
    pub mesh_tolerance: f64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            kernel_timeout_ms: 10_000,
            mesh_tolerance: 0.1,
        }
    }
}

impl LoaderConfig {
    pub fn poll_interval(&self) -> Duration {
        // A zero interval would make tokio's interval panic
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn kernel_timeout(&self) -> Duration {
        Duration::from_millis(self.kernel_timeout_ms)
    }

    pub fn meshing_params(&self) -> MeshingParams {
        MeshingParams::with_tolerance(self.mesh_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.kernel_timeout(), Duration::from_secs(10));
        assert_eq!(config.meshing_params(), MeshingParams::default());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = LoaderConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
