// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model loading

use std::time::Duration;
use thiserror::Error;

/// Result type alias for loading operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors that can occur while turning a source file into a model
///
/// None of these reach the viewer as a hard failure: the loader converts every
/// per-file error into a placeholder model and keeps the error on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Network or filesystem error while fetching bytes
    #[error("Failed to fetch {path}: {reason}")]
    FetchFailure { path: String, reason: String },

    /// Geometry kernel did not become ready in time
    #[error("Geometry kernel unavailable after {waited:?}")]
    KernelUnavailable { waited: Duration },

    /// Kernel rejected the file or produced a null shape
    #[error("Failed to read {path}: {reason}")]
    ParseFailure { path: String, reason: String },

    /// Path does not carry a recognized CAD extension
    #[error("Unsupported file format: {path}")]
    UnsupportedFormat { path: String },

    /// Mesh buffers violate their invariants
    #[error("Geometry error: {0}")]
    Geometry(String),
}

impl LoadError {
    /// Create a fetch error
    pub fn fetch(path: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadError::FetchFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse(path: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadError::ParseFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported format error
    pub fn unsupported(path: impl Into<String>) -> Self {
        LoadError::UnsupportedFormat { path: path.into() }
    }

    /// Create a geometry error
    pub fn geometry(msg: impl Into<String>) -> Self {
        LoadError::Geometry(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LoadError::fetch("/assets/Part1.stp", "404 Not Found");
        assert_eq!(
            err.to_string(),
            "Failed to fetch /assets/Part1.stp: 404 Not Found"
        );

        let err = LoadError::parse("Part2.stp", "null shape");
        assert_eq!(err.to_string(), "Failed to read Part2.stp: null shape");
    }

    #[test]
    fn test_kernel_timeout_message() {
        let timeout = LoadError::KernelUnavailable {
            waited: Duration::from_secs(10),
        };
        assert!(timeout.to_string().contains("10s"));
    }
}
