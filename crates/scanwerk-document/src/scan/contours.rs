// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour extraction — turns a grayscale frame into closed outer contours
// using either edge-based or threshold-based segmentation.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::median_filter;
use imageproc::geometry::{arc_length, contour_area};
use imageproc::morphology::{close, dilate};
use imageproc::point::Point as PixelPoint;
use scanwerk_core::DetectionConfig;
use tracing::{debug, instrument};

/// A closed boundary traced in a segmented image, in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<PixelPoint<i32>>,
}

impl Contour {
    pub fn new(points: Vec<PixelPoint<i32>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[PixelPoint<i32>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area.
    pub fn area(&self) -> f64 {
        contour_area(&self.points)
    }

    /// Length of the closed boundary.
    pub fn perimeter(&self) -> f64 {
        arc_length(&self.points, true)
    }
}

/// Segmentation used to produce contours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segmentation {
    /// Denoise, Canny, dilate.
    Edge,
    /// Otsu binarization in both polarities, then closing.
    Threshold,
}

/// Which side of the Otsu level counts as foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Pixels brighter than the level (document lighter than background).
    Normal,
    /// Pixels at or below the level (document darker than background).
    Inverted,
}

/// Extract outer contours from `gray` with the requested segmentation.
///
/// Empty or featureless images yield no contours.
pub fn extract_contours(
    gray: &GrayImage,
    segmentation: Segmentation,
    config: &DetectionConfig,
) -> Vec<Contour> {
    if gray.width() == 0 || gray.height() == 0 {
        return Vec::new();
    }
    match segmentation {
        Segmentation::Edge => edge_contours(gray, config),
        Segmentation::Threshold => threshold_contours(gray, config),
    }
}

#[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
fn edge_contours(gray: &GrayImage, config: &DetectionConfig) -> Vec<Contour> {
    let denoised = median_filter(gray, config.denoise_radius, config.denoise_radius);
    let edges = canny(&denoised, config.canny_low, config.canny_high);
    let bridged = if config.dilate_radius > 0 {
        dilate(&edges, Norm::LInf, config.dilate_radius)
    } else {
        edges
    };

    let contours = outer_contours(&bridged);
    debug!(count = contours.len(), "Edge contours extracted");
    contours
}

#[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
fn threshold_contours(gray: &GrayImage, config: &DetectionConfig) -> Vec<Contour> {
    let level = otsu_level(gray);
    debug!(level, "Otsu level computed");

    let mut contours = Vec::new();
    for polarity in [Polarity::Normal, Polarity::Inverted] {
        let binary = binarize(gray, level, polarity);
        let closed = if config.close_radius > 0 {
            close(&binary, Norm::LInf, config.close_radius)
        } else {
            binary
        };
        let found = outer_contours(&closed);
        debug!(?polarity, count = found.len(), "Threshold contours extracted");
        contours.extend(found);
    }
    contours
}

/// Global binarization at `level`; foreground is 255.
pub fn binarize(gray: &GrayImage, level: u8, polarity: Polarity) -> GrayImage {
    let kind = match polarity {
        Polarity::Normal => ThresholdType::Binary,
        Polarity::Inverted => ThresholdType::BinaryInverted,
    };
    threshold(gray, level, kind)
}

/// Outer borders of the foreground regions of a binary image.
fn outer_contours(binary: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.points.len() >= 3)
        .map(|c| Contour::new(c.points))
        .collect()
}
