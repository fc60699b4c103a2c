// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boundary detection — finds the quadrilateral that best matches a
// photographed document's outline.
//
// Two stages run in order and share the approximator and scorer:
//
// 1. Edge stage: Canny contours scored with strict thresholds. A valid
//    candidate here ends detection.
// 2. Threshold stage: Otsu contours in both polarities, pre-filtered by raw
//    area and scored with relaxed thresholds.
//
// Not finding a document is an ordinary outcome and yields `None`.

use image::{DynamicImage, GrayImage};
use scanwerk_core::error::Result;
use scanwerk_core::geometry::DocumentCorners;
use scanwerk_core::{DetectionConfig, ScoreThresholds};
use tracing::{debug, info, instrument};

use super::contours::{Contour, Segmentation, extract_contours};
use super::quad::approximate_quad;
use super::score::{Candidate, Preference, score_candidate};
use crate::image::processor::ImageProcessor;

/// Detection strategy that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Edge,
    Threshold,
}

/// A detected boundary with its provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Winning candidate, in source image coordinates.
    pub candidate: Candidate,
    pub stage: Stage,
}

impl Detection {
    pub fn corners(&self) -> DocumentCorners {
        self.candidate.corners
    }
}

type StageFn = fn(&GrayImage, &DetectionConfig) -> Option<Candidate>;

/// Stages in the order they are attempted.
const STAGES: [(Stage, StageFn); 2] = [
    (Stage::Edge, edge_stage),
    (Stage::Threshold, threshold_stage),
];

/// Per-stage rules for picking a candidate.
#[derive(Debug, Clone, Copy)]
struct Selection<'a> {
    thresholds: &'a ScoreThresholds,
    /// Contours enclosing less than this fraction of the frame are skipped
    /// before approximation.
    min_raw_area_ratio: Option<f64>,
    /// Pixels each quad edge is moved inward before scoring.
    inset: f64,
}

/// Edge-based detection with strict scoring.
///
/// Contours trace the outside of the dilated edge ring, so each quad is
/// pulled back by the dilation radius plus the one-pixel edge width.
pub fn edge_stage(gray: &GrayImage, config: &DetectionConfig) -> Option<Candidate> {
    let contours = extract_contours(gray, Segmentation::Edge, config);
    let selection = Selection {
        thresholds: &config.strict,
        min_raw_area_ratio: None,
        inset: f64::from(config.dilate_radius) + 1.0,
    };
    best_candidate(&contours, gray.dimensions(), config, selection)
}

/// Threshold-based detection with relaxed scoring and an area pre-filter.
pub fn threshold_stage(gray: &GrayImage, config: &DetectionConfig) -> Option<Candidate> {
    let contours = extract_contours(gray, Segmentation::Threshold, config);
    let selection = Selection {
        thresholds: &config.relaxed,
        min_raw_area_ratio: Some(config.stage2_min_area_ratio),
        inset: 0.0,
    };
    best_candidate(&contours, gray.dimensions(), config, selection)
}

/// Highest-scoring valid candidate; earlier contours win ties.
fn best_candidate(
    contours: &[Contour],
    (width, height): (u32, u32),
    config: &DetectionConfig,
    selection: Selection<'_>,
) -> Option<Candidate> {
    let frame_area = width as f64 * height as f64;
    let preference = Preference::from_config(config);

    let mut best: Option<Candidate> = None;
    for contour in contours {
        if let Some(min_ratio) = selection.min_raw_area_ratio {
            if contour.area() / frame_area < min_ratio {
                continue;
            }
        }
        let Some(quad) = approximate_quad(contour, &config.epsilon_fractions) else {
            continue;
        };
        let quad = quad.inset(selection.inset);
        let candidate = score_candidate(
            quad.points,
            quad.area(),
            width,
            height,
            selection.thresholds,
            &preference,
        );
        debug!(
            source = ?quad.source,
            area_ratio = candidate.area_ratio,
            valid = candidate.valid,
            score = candidate.score,
            "Candidate scored"
        );
        if candidate.valid && best.is_none_or(|b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }
    best
}

/// Document boundary detector.
///
/// Stateless apart from its configuration; a single detector may be shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct BoundaryDetector {
    config: DetectionConfig,
}

impl BoundaryDetector {
    /// Create a detector, rejecting invalid configuration up front.
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Corners of the most plausible document, or `None`.
    pub fn detect(&self, image: &DynamicImage) -> Option<DocumentCorners> {
        self.detect_detailed(image).map(|d| d.corners())
    }

    /// Like [`detect`](Self::detect) but also reports the stage and score.
    ///
    /// Inputs larger than `max_detection_dimension` are processed at reduced
    /// resolution; the returned corners are always in source coordinates.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect_detailed(&self, image: &DynamicImage) -> Option<Detection> {
        if image.width() == 0 || image.height() == 0 {
            return None;
        }

        let source_longest = image.width().max(image.height());
        let gray = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(image.to_luma8()))
            .bound_longest_side(self.config.max_detection_dimension)
            .into_dynamic()
            .into_luma8();
        let scale = source_longest as f64 / gray.width().max(gray.height()) as f64;

        let mut detection = self.detect_gray(&gray)?;
        if scale != 1.0 {
            detection.candidate.corners = detection.candidate.corners.scaled(scale);
        }
        Some(detection)
    }

    /// Run the stages on an already-prepared grayscale frame.
    pub fn detect_gray(&self, gray: &GrayImage) -> Option<Detection> {
        for (stage, run) in STAGES {
            if let Some(candidate) = run(gray, &self.config) {
                info!(
                    ?stage,
                    score = candidate.score,
                    area_ratio = candidate.area_ratio,
                    "Document boundary found"
                );
                return Some(Detection { candidate, stage });
            }
            debug!(?stage, "No valid candidate");
        }
        info!("No document boundary found");
        None
    }
}

/// Detect a document boundary with default settings.
pub fn detect_boundary(image: &DynamicImage) -> Option<DocumentCorners> {
    BoundaryDetector::default().detect(image)
}
