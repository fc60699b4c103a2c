// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.
//
// "No document found" is not an error: detection returns `Option::None`.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Rectification errors --
    #[error("degenerate document corners: {0}")]
    Geometry(String),

    #[error("image encoding failed: {0}")]
    Encoding(String),

    #[error("resource limit exceeded: {0}")]
    Resource(String),

    // -- Setup --
    #[error("invalid configuration: {0}")]
    Configuration(String),

    // -- Input --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScanError {
    /// Whether the same call could succeed if repeated with the same input.
    ///
    /// Nothing inside the core retries; this only informs the host loop.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;
