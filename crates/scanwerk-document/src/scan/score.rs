// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Candidate scoring — accepts or rejects a four-corner candidate by its
// size and shape relative to the frame, and ranks the survivors.

use scanwerk_core::geometry::{BoundingBox, DocumentCorners, Point};
use scanwerk_core::{DetectionConfig, ScoreThresholds};

/// Preference bonus applied to candidates in a moderate area band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preference {
    pub band_min: f64,
    pub band_max: f64,
    pub bonus: f64,
}

impl Preference {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            band_min: config.preferred_min,
            band_max: config.preferred_max,
            bonus: config.preferred_bonus,
        }
    }
}

impl Default for Preference {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

/// Why a candidate was turned down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    AreaRatio(f64),
    Aspect(f64),
}

/// A scored four-corner candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub corners: DocumentCorners,
    pub area_ratio: f64,
    pub valid: bool,
    /// Preference score; zero for rejected candidates.
    pub score: f64,
    pub rejection: Option<Rejection>,
}

/// Validate and score `points` against a `frame_width` x `frame_height` frame.
///
/// `area` is the candidate's enclosed area in pixels.
pub fn score_candidate(
    points: [Point; 4],
    area: f64,
    frame_width: u32,
    frame_height: u32,
    thresholds: &ScoreThresholds,
    preference: &Preference,
) -> Candidate {
    let corners = DocumentCorners::from_points(points);
    let frame_area = frame_width as f64 * frame_height as f64;
    let area_ratio = if frame_area > 0.0 { area / frame_area } else { 0.0 };

    let reject = |rejection| Candidate {
        corners,
        area_ratio,
        valid: false,
        score: 0.0,
        rejection: Some(rejection),
    };

    if !(thresholds.min_area_ratio..=thresholds.max_area_ratio).contains(&area_ratio) {
        return reject(Rejection::AreaRatio(area_ratio));
    }

    let aspect = BoundingBox::enclosing(&points)
        .map(|b| b.aspect_ratio())
        .unwrap_or(f64::INFINITY);
    if !(thresholds.min_aspect..=thresholds.max_aspect).contains(&aspect) {
        return reject(Rejection::Aspect(aspect));
    }

    let mut score = area_ratio;
    if (preference.band_min..=preference.band_max).contains(&area_ratio) {
        score += preference.bonus;
    }

    Candidate {
        corners,
        area_ratio,
        valid: true,
        score,
        rejection: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::quad::quad_area;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> [Point; 4] {
        [
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    fn score(points: [Point; 4], thresholds: &ScoreThresholds) -> Candidate {
        let area = quad_area(&points);
        score_candidate(points, area, 1000, 1000, thresholds, &Preference::default())
    }

    #[test]
    fn moderate_candidate_gets_bonus() {
        // 700 x 700 = 0.49 of the frame.
        let c = score(rect(150.0, 150.0, 850.0, 850.0), &ScoreThresholds::strict());
        assert!(c.valid);
        assert!((c.area_ratio - 0.49).abs() < 1e-9);
        assert!((c.score - 0.79).abs() < 1e-9);
    }

    #[test]
    fn large_candidate_outside_band_has_no_bonus() {
        // 900 x 900 = 0.81.
        let c = score(rect(50.0, 50.0, 950.0, 950.0), &ScoreThresholds::strict());
        assert!(c.valid);
        assert!((c.score - 0.81).abs() < 1e-9);
    }

    #[test]
    fn relaxed_accepts_what_strict_rejects() {
        // 0.22 of the frame, aspect 0.47.
        let pts = rect(100.0, 100.0, 100.0 + 321.6, 100.0 + 684.1);
        let strict = score(pts, &ScoreThresholds::strict());
        let relaxed = score(pts, &ScoreThresholds::relaxed());
        assert!(!strict.valid);
        assert!(matches!(strict.rejection, Some(Rejection::AreaRatio(_))));
        assert!(relaxed.valid, "{relaxed:?}");
    }

    #[test]
    fn extreme_aspect_is_rejected() {
        // 0.3 of the frame but 3:1 wide.
        let c = score(rect(0.0, 300.0, 948.7, 616.2), &ScoreThresholds::strict());
        assert!(!c.valid);
        assert!(matches!(c.rejection, Some(Rejection::Aspect(a)) if a > 2.9));
        assert_eq!(c.score, 0.0);
    }

    #[test]
    fn full_frame_is_too_large() {
        let c = score(rect(0.0, 0.0, 999.0, 999.0), &ScoreThresholds::relaxed());
        assert!(!c.valid);
    }

    #[test]
    fn bonus_is_configurable() {
        let pts = rect(150.0, 150.0, 850.0, 850.0);
        let pref = Preference {
            bonus: 0.0,
            ..Preference::default()
        };
        let c = score_candidate(
            pts,
            quad_area(&pts),
            1000,
            1000,
            &ScoreThresholds::strict(),
            &pref,
        );
        assert!((c.score - 0.49).abs() < 1e-9);
    }
}
