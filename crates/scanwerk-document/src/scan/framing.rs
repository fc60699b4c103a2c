// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Framing evaluation — judges whether a live candidate is centred and sized
// well enough to trigger auto-capture.

use scanwerk_core::FramingConfig;
use scanwerk_core::geometry::DocumentCorners;
use serde::{Deserialize, Serialize};

use super::quad::quad_area;

/// Why a frame is or is not ready for capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FramingVerdict {
    WellFramed,
    /// A corner lies inside the edge margin or outside the frame.
    TouchingEdge,
    TooSmall,
    TooLarge,
}

impl FramingVerdict {
    pub fn is_well_framed(self) -> bool {
        self == Self::WellFramed
    }

    /// Short guidance for a preview overlay.
    pub fn guidance(self) -> &'static str {
        match self {
            Self::WellFramed => "Hold still",
            Self::TouchingEdge => "Move back so the whole page fits",
            Self::TooSmall => "Move closer to the page",
            Self::TooLarge => "Move back a little",
        }
    }
}

/// Classify the framing of `corners` within a `frame_width` x `frame_height`
/// frame. Edge contact is reported before size.
pub fn assess_framing(
    corners: &DocumentCorners,
    frame_width: u32,
    frame_height: u32,
    config: &FramingConfig,
) -> FramingVerdict {
    let (w, h) = (frame_width as f64, frame_height as f64);
    let margin = config.margin_px;

    let inside = corners.points().iter().all(|p| {
        p.x >= margin && p.x <= w - margin && p.y >= margin && p.y <= h - margin
    });
    if !inside {
        return FramingVerdict::TouchingEdge;
    }

    let frame_area = w * h;
    if frame_area <= 0.0 {
        return FramingVerdict::TooSmall;
    }
    let ratio = quad_area(&corners.ordered().points()) / frame_area;
    if ratio < config.min_area_ratio {
        FramingVerdict::TooSmall
    } else if ratio > config.max_area_ratio {
        FramingVerdict::TooLarge
    } else {
        FramingVerdict::WellFramed
    }
}

/// `true` when the document is ready for capture under default rules.
pub fn evaluate_framing(corners: &DocumentCorners, frame_width: u32, frame_height: u32) -> bool {
    assess_framing(corners, frame_width, frame_height, &FramingConfig::default()).is_well_framed()
}
