// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — warps the document quadrilateral onto a flat
// A-series canvas, optionally binarizes it, and encodes the result.
//
// ## Pipeline
//
// 1. Re-derive corner roles from coordinates (input labels are ignored)
// 2. Reject collinear / near-collinear corners
// 3. Bound the source resolution
// 4. Compute the projective transform onto `(0,0) (W,0) (W,H) (0,H)`
// 5. Resample via `imageproc::geometric_transformations::warp_into`
// 6. Optionally enhance (grayscale + adaptive threshold)
// 7. Encode

use std::borrow::Cow;

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use scanwerk_core::RectifyOptions;
use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::geometry::DocumentCorners;
use tracing::{debug, info, instrument, warn};

use super::enhance::ScanEnhancer;
use crate::image::processor::ImageProcessor;

/// Perspective rectifier with fixed options.
#[derive(Debug, Clone)]
pub struct Rectifier {
    options: RectifyOptions,
}

impl Rectifier {
    /// Create a rectifier, rejecting invalid options up front.
    pub fn new(options: RectifyOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &RectifyOptions {
        &self.options
    }

    /// Rectify and encode.
    ///
    /// Either the complete encoded image is returned or an error; partial
    /// output never escapes.
    #[instrument(
        skip_all,
        fields(target_width = self.options.target_width, enhance = self.options.enhance)
    )]
    pub fn rectify(&self, image: &DynamicImage, corners: &DocumentCorners) -> Result<Vec<u8>> {
        let page = self.rectify_image(image, corners)?;
        let bytes = ImageProcessor::from_dynamic(page)
            .encode(self.options.format, self.options.jpeg_quality())?;
        info!(bytes = bytes.len(), format = ?self.options.format, "Rectified page encoded");
        Ok(bytes)
    }

    /// Rectify without encoding.
    ///
    /// The result is RGB when enhancement is off and single-channel
    /// black/white when it is on.
    pub fn rectify_image(
        &self,
        image: &DynamicImage,
        corners: &DocumentCorners,
    ) -> Result<DynamicImage> {
        let (src_w, src_h) = (image.width(), image.height());
        if src_w == 0 || src_h == 0 {
            return Err(ScanError::ImageError("source image is empty".into()));
        }

        let ordered = corners.ordered();
        check_corners(&ordered, src_w, src_h, self.options.degenerate_area_fraction)?;

        let (source, ordered) = self.bound_source(image, ordered);
        let (out_w, out_h) = self.options.canvas_size();

        let src: [(f32, f32); 4] = ordered.points().map(|p| (p.x as f32, p.y as f32));
        let dest: [(f32, f32); 4] = [
            (0.0, 0.0),
            (out_w as f32, 0.0),
            (out_w as f32, out_h as f32),
            (0.0, out_h as f32),
        ];
        debug!(
            top_left = ?ordered.top_left,
            top_right = ?ordered.top_right,
            bottom_right = ?ordered.bottom_right,
            bottom_left = ?ordered.bottom_left,
            out_w,
            out_h,
            "Computing projective transform"
        );

        // Maps the source quadrilateral onto the canvas; warp_into samples
        // through its inverse.
        let projection = Projection::from_control_points(src, dest).ok_or_else(|| {
            ScanError::Geometry("projective transform is singular for these corners".into())
        })?;

        let rgb = source.to_rgb8();
        let mut output = RgbImage::new(out_w, out_h);
        warp_into(
            &rgb,
            &projection,
            Interpolation::Bilinear,
            Rgb([255u8, 255, 255]),
            &mut output,
        );
        info!(out_w, out_h, "Perspective correction applied");

        let page = DynamicImage::ImageRgb8(output);
        if !self.options.enhance {
            return Ok(page);
        }
        Ok(ScanEnhancer::from_dynamic(page)
            .enhance_scan(self.options.block_radius, self.options.bias)
            .into_dynamic())
    }

    /// Downscale oversized sources, moving the corners along with them.
    fn bound_source<'a>(
        &self,
        image: &'a DynamicImage,
        corners: DocumentCorners,
    ) -> (Cow<'a, DynamicImage>, DocumentCorners) {
        let longest = image.width().max(image.height());
        let max_side = self.options.max_source_dimension;
        if longest <= max_side {
            return (Cow::Borrowed(image), corners);
        }
        let bounded = ImageProcessor::from_dynamic(image.clone())
            .bound_longest_side(max_side)
            .into_dynamic();
        let factor = bounded.width().max(bounded.height()) as f64 / longest as f64;
        (Cow::Owned(bounded), corners.scaled(factor))
    }
}

/// Reject corners that cannot define a stable perspective transform.
fn check_corners(
    corners: &DocumentCorners,
    width: u32,
    height: u32,
    degenerate_fraction: f64,
) -> Result<()> {
    if corners
        .points()
        .iter()
        .any(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(ScanError::Geometry("corner coordinates must be finite".into()));
    }

    let min_area = degenerate_fraction * width as f64 * height as f64;
    let smallest = corners.min_corner_triangle_area();
    if smallest <= min_area {
        warn!(smallest, min_area, "Rejecting near-collinear corners");
        return Err(ScanError::Geometry(format!(
            "three corners are nearly collinear (triangle area {smallest:.1} px² <= {min_area:.1} px²)"
        )));
    }
    Ok(())
}

/// Rectify `corners` of `image` with `options` and encode the result.
pub fn rectify(
    image: &DynamicImage,
    corners: &DocumentCorners,
    options: &RectifyOptions,
) -> Result<Vec<u8>> {
    Rectifier::new(options.clone())?.rectify(image, corners)
}
