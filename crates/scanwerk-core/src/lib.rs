// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — Core geometry, configuration, and error definitions shared by
// the scanning pipeline and its hosts.

pub mod config;
pub mod error;
pub mod geometry;
pub mod human_errors;

pub use config::{
    DetectionConfig, FramingConfig, OutputFormat, RectifyOptions, ScanConfig, ScoreThresholds,
};
pub use error::{Result, ScanError};
pub use geometry::{BoundingBox, DocumentCorners, Point};
