// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration: detection thresholds, rectification options, and
// live-preview framing rules.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ScanError};

/// Height / width of the rectified canvas (ISO A-series paper).
pub const A_SERIES_ASPECT: f64 = 1.414;

/// Area and aspect bounds a candidate must satisfy to be accepted.
///
/// Fields missing from a settings file keep the value of the set being
/// overridden: [`strict`](Self::strict) for the edge stage and standalone
/// use, [`relaxed`](Self::relaxed) for the threshold stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreThresholds {
    /// Minimum candidate area as a fraction of the frame area.
    pub min_area_ratio: f64,
    /// Maximum candidate area as a fraction of the frame area.
    pub max_area_ratio: f64,
    /// Minimum bounding-box width / height.
    pub min_aspect: f64,
    /// Maximum bounding-box width / height.
    pub max_aspect: f64,
}

impl ScoreThresholds {
    /// Thresholds for the edge-based first stage.
    pub const fn strict() -> Self {
        Self {
            min_area_ratio: 0.25,
            max_area_ratio: 0.9,
            min_aspect: 0.5,
            max_aspect: 2.0,
        }
    }

    /// Looser thresholds for the threshold-based fallback stage.
    pub const fn relaxed() -> Self {
        Self {
            min_area_ratio: 0.20,
            max_area_ratio: 0.9,
            min_aspect: 0.45,
            max_aspect: 2.2,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_area_ratio)
            || !(0.0..=1.0).contains(&self.max_area_ratio)
            || self.min_area_ratio > self.max_area_ratio
        {
            return Err(ScanError::Configuration(format!(
                "{name}: area ratio bounds [{}, {}] must be an ordered range within [0, 1]",
                self.min_area_ratio, self.max_area_ratio
            )));
        }
        if self.min_aspect <= 0.0 || self.min_aspect > self.max_aspect {
            return Err(ScanError::Configuration(format!(
                "{name}: aspect bounds [{}, {}] must be positive and ordered",
                self.min_aspect, self.max_aspect
            )));
        }
        Ok(())
    }
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self::strict()
    }
}

/// A partially specified threshold set, as read from a settings file.
#[derive(Debug, Deserialize)]
struct ThresholdOverrides {
    min_area_ratio: Option<f64>,
    max_area_ratio: Option<f64>,
    min_aspect: Option<f64>,
    max_aspect: Option<f64>,
}

impl ThresholdOverrides {
    fn over(self, base: ScoreThresholds) -> ScoreThresholds {
        ScoreThresholds {
            min_area_ratio: self.min_area_ratio.unwrap_or(base.min_area_ratio),
            max_area_ratio: self.max_area_ratio.unwrap_or(base.max_area_ratio),
            min_aspect: self.min_aspect.unwrap_or(base.min_aspect),
            max_aspect: self.max_aspect.unwrap_or(base.max_aspect),
        }
    }
}

fn strict_thresholds<'de, D>(deserializer: D) -> std::result::Result<ScoreThresholds, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ThresholdOverrides::deserialize(deserializer)?.over(ScoreThresholds::strict()))
}

fn relaxed_thresholds<'de, D>(deserializer: D) -> std::result::Result<ScoreThresholds, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ThresholdOverrides::deserialize(deserializer)?.over(ScoreThresholds::relaxed()))
}

/// Parameters for boundary detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Scoring bounds for the edge stage.
    #[serde(deserialize_with = "strict_thresholds")]
    pub strict: ScoreThresholds,
    /// Scoring bounds for the threshold stage.
    #[serde(deserialize_with = "relaxed_thresholds")]
    pub relaxed: ScoreThresholds,
    /// Lower edge of the preferred area-ratio band.
    pub preferred_min: f64,
    /// Upper edge of the preferred area-ratio band.
    pub preferred_max: f64,
    /// Score bonus for candidates inside the preferred band.
    pub preferred_bonus: f64,
    /// Threshold-stage contours enclosing less than this fraction of the
    /// frame are skipped before approximation.
    pub stage2_min_area_ratio: f64,
    /// Canny low / high gradient thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Median filter radius applied before edge detection.
    pub denoise_radius: u32,
    /// Dilation radius (L-infinity) bridging gaps in the edge map.
    pub dilate_radius: u8,
    /// Closing radius (L-infinity) applied to each binarized variant.
    pub close_radius: u8,
    /// Polygon simplification tolerances, as fractions of contour perimeter,
    /// tried in order.
    pub epsilon_fractions: Vec<f64>,
    /// Longest image side processed at full resolution; larger inputs are
    /// downscaled first.
    pub max_detection_dimension: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            strict: ScoreThresholds::strict(),
            relaxed: ScoreThresholds::relaxed(),
            preferred_min: 0.4,
            preferred_max: 0.7,
            preferred_bonus: 0.3,
            stage2_min_area_ratio: 0.2,
            canny_low: 50.0,
            canny_high: 150.0,
            denoise_radius: 1,
            dilate_radius: 1,
            close_radius: 2,
            epsilon_fractions: vec![0.02, 0.04, 0.06, 0.08, 0.10],
            max_detection_dimension: 1920,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        self.strict.validate("strict")?;
        self.relaxed.validate("relaxed")?;
        if self.preferred_min > self.preferred_max {
            return Err(ScanError::Configuration(format!(
                "preferred band [{}, {}] is inverted",
                self.preferred_min, self.preferred_max
            )));
        }
        if self.canny_low < 0.0 || self.canny_low > self.canny_high {
            return Err(ScanError::Configuration(format!(
                "canny thresholds ({}, {}) must satisfy 0 <= low <= high",
                self.canny_low, self.canny_high
            )));
        }
        if self.epsilon_fractions.is_empty()
            || self.epsilon_fractions.iter().any(|&f| f <= 0.0 || !f.is_finite())
        {
            return Err(ScanError::Configuration(
                "epsilon_fractions must be a non-empty list of positive values".into(),
            ));
        }
        if self.max_detection_dimension < 64 {
            return Err(ScanError::Configuration(format!(
                "max_detection_dimension {} is too small",
                self.max_detection_dimension
            )));
        }
        Ok(())
    }
}

/// Encoded output format for rectified documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Options for perspective rectification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifyOptions {
    /// Output canvas width; height is `round(width * 1.414)`.
    pub target_width: u32,
    /// Apply grayscale adaptive binarization after warping.
    pub enhance: bool,
    /// Compression quality in (0, 1]. Ignored for PNG.
    pub quality: f64,
    pub format: OutputFormat,
    /// Half-size of the adaptive threshold window.
    pub block_radius: u32,
    /// Constant subtracted from the local mean before comparison.
    pub bias: i32,
    /// Corners whose smallest corner triangle encloses less than this fraction
    /// of the source area are rejected as degenerate.
    pub degenerate_area_fraction: f64,
    /// Longest source side used for resampling; larger sources are
    /// downscaled first.
    pub max_source_dimension: u32,
    /// Largest accepted `target_width`.
    pub max_target_width: u32,
}

impl Default for RectifyOptions {
    fn default() -> Self {
        Self {
            target_width: 1200,
            enhance: false,
            quality: 0.95,
            format: OutputFormat::Jpeg,
            block_radius: 15,
            bias: 10,
            degenerate_area_fraction: 1e-3,
            max_source_dimension: 2200,
            max_target_width: 4096,
        }
    }
}

impl RectifyOptions {
    /// Output canvas dimensions `(width, height)`.
    pub fn canvas_size(&self) -> (u32, u32) {
        let height = (self.target_width as f64 * A_SERIES_ASPECT).round() as u32;
        (self.target_width, height)
    }

    /// JPEG quality on the encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Parameter checks. Oversized canvases surface as `Resource` errors,
    /// everything else as `Configuration`.
    pub fn validate(&self) -> Result<()> {
        if self.target_width == 0 {
            return Err(ScanError::Configuration("target_width must be positive".into()));
        }
        if self.target_width > self.max_target_width {
            return Err(ScanError::Resource(format!(
                "target_width {} exceeds the limit of {}",
                self.target_width, self.max_target_width
            )));
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(ScanError::Configuration(format!(
                "quality {} must lie in (0, 1]",
                self.quality
            )));
        }
        if self.block_radius == 0 {
            return Err(ScanError::Configuration("block_radius must be positive".into()));
        }
        if !(self.degenerate_area_fraction >= 0.0 && self.degenerate_area_fraction < 1.0) {
            return Err(ScanError::Configuration(format!(
                "degenerate_area_fraction {} must lie in [0, 1)",
                self.degenerate_area_fraction
            )));
        }
        if self.max_source_dimension == 0 {
            return Err(ScanError::Configuration(
                "max_source_dimension must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Rules for judging whether a live preview frame is ready for capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Minimum distance in pixels between every corner and every frame edge.
    pub margin_px: f64,
    pub min_area_ratio: f64,
    pub max_area_ratio: f64,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            margin_px: 30.0,
            min_area_ratio: 0.3,
            max_area_ratio: 0.8,
        }
    }
}

impl FramingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.margin_px < 0.0 {
            return Err(ScanError::Configuration("margin_px must not be negative".into()));
        }
        if self.min_area_ratio > self.max_area_ratio {
            return Err(ScanError::Configuration(format!(
                "framing area band [{}, {}] is inverted",
                self.min_area_ratio, self.max_area_ratio
            )));
        }
        Ok(())
    }
}

/// Complete scanner settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub detection: DetectionConfig,
    pub rectify: RectifyOptions,
    pub framing: FramingConfig,
}

impl ScanConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;
        self.rectify.validate()?;
        self.framing.validate()
    }
}
