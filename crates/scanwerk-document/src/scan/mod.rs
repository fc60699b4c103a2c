// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — contour extraction, quadrilateral approximation,
// candidate scoring, boundary detection, perspective rectification, scan
// enhancement, and live framing feedback.

pub mod contours;
pub mod detect;
pub mod enhance;
pub mod framing;
pub mod live;
pub mod quad;
pub mod rectify;
pub mod score;

pub use contours::{Contour, Segmentation, extract_contours};
pub use detect::{BoundaryDetector, Detection, Stage, detect_boundary, edge_stage, threshold_stage};
pub use enhance::ScanEnhancer;
pub use framing::{FramingVerdict, assess_framing, evaluate_framing};
pub use live::{FrameFeedback, PreviewGate};
pub use quad::{Quad, QuadSource, approximate_quad};
pub use rectify::{Rectifier, rectify};
pub use score::{Candidate, Preference, Rejection, score_candidate};
