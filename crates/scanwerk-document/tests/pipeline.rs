// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end tests: detect a synthetic page, rectify it, check framing.

use image::{DynamicImage, GenericImageView, GrayImage, Luma, Rgb, RgbImage};
use scanwerk_core::geometry::cross;
use scanwerk_core::{
    DetectionConfig, DocumentCorners, OutputFormat, Point, RectifyOptions, ScanError,
};
use scanwerk_document::scan::{edge_stage, threshold_stage};
use scanwerk_document::{BoundaryDetector, Stage, detect_boundary, evaluate_framing, rectify};

/// White rectangle (100,100)-(900,1300) on black, 1000x1400.
fn white_page_on_black() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(1000, 1400, |x, y| {
        if (100..900).contains(&x) && (100..1300).contains(&y) {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    }))
}

/// Filled convex quadrilateral (clockwise on screen) on a dark background.
fn skewed_page(w: u32, h: u32, corners: [Point; 4]) -> DynamicImage {
    let edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    DynamicImage::ImageLuma8(GrayImage::from_fn(w, h, |x, y| {
        let p = Point::new(x as f64, y as f64);
        if edges.iter().all(|&(a, b)| cross(a, b, p) >= 0.0) {
            Luma([230])
        } else {
            Luma([35])
        }
    }))
}

fn assert_corners_near(found: &DocumentCorners, expected: [(f64, f64); 4], tol: f64) {
    let found = found.ordered().points();
    for (p, (x, y)) in found.iter().zip(expected) {
        assert!(
            p.distance(&Point::new(x, y)) <= tol,
            "corner {p:?} not within {tol}px of ({x}, {y}); got {found:?}"
        );
    }
}

fn page_options() -> RectifyOptions {
    RectifyOptions {
        target_width: 800,
        ..Default::default()
    }
}

/// Corners exactly on the outermost white pixels.
fn interior_corners() -> DocumentCorners {
    DocumentCorners::from_points([
        Point::new(100.0, 100.0),
        Point::new(899.0, 100.0),
        Point::new(899.0, 1299.0),
        Point::new(100.0, 1299.0),
    ])
}

#[test]
fn white_page_is_detected_by_edge_stage() {
    let detection = BoundaryDetector::default()
        .detect_detailed(&white_page_on_black())
        .expect("page should be found");
    assert_eq!(detection.stage, Stage::Edge);
    assert!(detection.candidate.valid);
    assert_corners_near(
        &detection.corners(),
        [(100.0, 100.0), (900.0, 100.0), (900.0, 1300.0), (100.0, 1300.0)],
        5.0,
    );
}

#[test]
fn edge_stage_corners_sit_on_the_paper() {
    let gray = white_page_on_black().to_luma8();
    let candidate = edge_stage(&gray, &DetectionConfig::default()).expect("page should be found");
    for p in candidate.corners.points() {
        let pixel = gray.get_pixel(p.x.round() as u32, p.y.round() as u32);
        assert_eq!(pixel.0[0], 255, "corner {p:?} samples the background");
    }
}

#[test]
fn threshold_stage_alone_finds_white_page() {
    let gray = white_page_on_black().to_luma8();
    let candidate = threshold_stage(&gray, &DetectionConfig::default()).expect("page should be found");
    assert_corners_near(
        &candidate.corners,
        [(100.0, 100.0), (899.0, 100.0), (899.0, 1299.0), (100.0, 1299.0)],
        5.0,
    );
}

#[test]
fn skewed_page_is_found_by_both_stages() {
    let truth = [
        Point::new(130.0, 110.0),
        Point::new(880.0, 150.0),
        Point::new(860.0, 1290.0),
        Point::new(110.0, 1250.0),
    ];
    let gray = skewed_page(1000, 1400, truth).to_luma8();
    let expected = truth.map(|p| (p.x, p.y));
    let config = DetectionConfig::default();

    let edge = edge_stage(&gray, &config).expect("edge stage should find the page");
    assert_corners_near(&edge.corners, expected, 5.0);

    let threshold = threshold_stage(&gray, &config).expect("threshold stage should find the page");
    assert_corners_near(&threshold.corners, expected, 5.0);
}

#[test]
fn uniform_frame_has_no_document() {
    let uniform = DynamicImage::ImageLuma8(GrayImage::from_pixel(640, 480, Luma([90])));
    let gray = uniform.to_luma8();
    let config = DetectionConfig::default();
    assert!(edge_stage(&gray, &config).is_none());
    assert!(threshold_stage(&gray, &config).is_none());
    assert!(detect_boundary(&uniform).is_none());
}

#[test]
fn rectified_page_is_uniformly_white() {
    let bytes = rectify(&white_page_on_black(), &interior_corners(), &page_options()).unwrap();
    let page = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(page.dimensions(), (800, 1131));
    assert!(
        page.pixels().all(|p| p.0.iter().all(|&c| c >= 250)),
        "rectified page should contain only paper"
    );
}

#[test]
fn detected_corners_rectify_to_a_white_page() {
    let photo = white_page_on_black();
    let corners = detect_boundary(&photo).expect("page should be found");
    let options = RectifyOptions {
        format: OutputFormat::Png,
        ..page_options()
    };
    let bytes = rectify(&photo, &corners, &options).unwrap();
    let page = image::load_from_memory(&bytes).unwrap().to_luma8();
    assert_eq!(page.dimensions(), (800, 1131));

    for (x, y, pixel) in page.enumerate_pixels() {
        assert!(pixel.0[0] >= 250, "dark pixel {} at ({x}, {y})", pixel.0[0]);
    }
}

#[test]
fn enhanced_page_is_bilevel() {
    let options = RectifyOptions {
        enhance: true,
        ..page_options()
    };
    let bytes = rectify(&white_page_on_black(), &interior_corners(), &options).unwrap();
    let page = image::load_from_memory(&bytes).unwrap();
    assert_eq!(page.dimensions(), (800, 1131));
    let gray = page.to_luma8();
    assert!(gray.pixels().all(|p| p.0[0] < 64 || p.0[0] > 192));
}

#[test]
fn rectify_is_deterministic() {
    let photo = white_page_on_black();
    let corners = DocumentCorners::from_points([
        Point::new(120.0, 90.0),
        Point::new(910.0, 130.0),
        Point::new(880.0, 1320.0),
        Point::new(95.0, 1280.0),
    ]);
    let first = rectify(&photo, &corners, &page_options()).unwrap();
    let second = rectify(&photo, &corners, &page_options()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn relabelled_corners_give_identical_output() {
    let photo = white_page_on_black();
    let corners = interior_corners();
    let [tl, tr, br, bl] = corners.points();
    let rotated = DocumentCorners::from_points([br, bl, tl, tr]);
    assert_eq!(
        rectify(&photo, &corners, &page_options()).unwrap(),
        rectify(&photo, &rotated, &page_options()).unwrap()
    );
}

#[test]
fn collinear_corners_cannot_be_rectified() {
    let corners = DocumentCorners::from_points([
        Point::new(100.0, 100.0),
        Point::new(500.0, 500.0),
        Point::new(900.0, 900.0),
        Point::new(100.0, 1300.0),
    ]);
    let err = rectify(&white_page_on_black(), &corners, &page_options()).unwrap_err();
    assert!(matches!(err, ScanError::Geometry(_)), "unexpected error: {err}");
}

#[test]
fn detected_page_is_well_framed() {
    let corners = detect_boundary(&white_page_on_black()).expect("page should be found");
    assert!(evaluate_framing(&corners, 1000, 1400));
}
