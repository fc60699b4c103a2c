// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document — Document image processing for the Scanwerk scanner.
//
// Finds the outline of a photographed page (edge and threshold stages sharing
// one approximator and scorer), warps it flat onto an A-series canvas,
// optionally binarizes it into a clean scan, and judges live preview framing.

pub mod image;
pub mod scan;

// Re-export the primary entry points so callers can use `scanwerk_document::rectify` etc.
pub use crate::image::processor::ImageProcessor;
pub use scan::detect::{BoundaryDetector, Detection, Stage, detect_boundary};
pub use scan::enhance::ScanEnhancer;
pub use scan::framing::{FramingVerdict, evaluate_framing};
pub use scan::live::{FrameFeedback, PreviewGate};
pub use scan::rectify::{Rectifier, rectify};
