// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan enhancement — grayscale conversion and local adaptive binarization
// that turn a rectified photo into clean black-on-white output.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::integral_image::{integral_image, sum_image_pixels};
use tracing::{debug, info, instrument};

/// Enhances rectified document images to resemble flatbed scans.
pub struct ScanEnhancer {
    /// The working image (kept as `DynamicImage` for flexibility).
    image: DynamicImage,
}

impl ScanEnhancer {
    /// Create an enhancer wrapping an existing `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Borrow the current working image.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the enhancer and return the underlying image.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Binarization ---------------------------------------------------------

    /// Apply adaptive thresholding to produce a black-and-white image.
    ///
    /// Uses a local mean approach: for each pixel, the threshold is the mean
    /// intensity within a `block_radius` neighbourhood, minus a constant
    /// `bias`. Pixels darker than the local threshold become black; others
    /// become white.
    ///
    /// A typical `block_radius` is 15 and `bias` is 10.
    #[instrument(skip(self), fields(block_radius, bias))]
    pub fn binarize(self, block_radius: u32, bias: i32) -> Self {
        info!(block_radius, bias, "Applying adaptive binarization");

        let gray = self.image.to_luma8();
        let (width, height) = gray.dimensions();
        let integral = integral_image::<_, u64>(&gray);

        let output = GrayImage::from_fn(width, height, |x, y| {
            let local_mean = window_mean(&integral, width, height, x, y, block_radius);
            let threshold = (local_mean.round() as i32 - bias).clamp(0, 255) as u8;
            let pixel_val = gray.get_pixel(x, y).0[0];
            Luma([if pixel_val < threshold { 0u8 } else { 255u8 }])
        });

        debug!("Binarization complete");
        Self {
            image: DynamicImage::ImageLuma8(output),
        }
    }

    /// Run the scan enhancement pipeline: grayscale, then adaptive
    /// binarization with the given window and bias.
    #[instrument(skip(self))]
    pub fn enhance_scan(self, block_radius: u32, bias: i32) -> Self {
        info!("Running scan enhancement pipeline");
        let gray = DynamicImage::ImageLuma8(self.image.to_luma8());
        Self::from_dynamic(gray).binarize(block_radius, bias)
    }
}

/// Mean of the square window of `radius` around (cx, cy), clipped to the
/// image. `integral` is the summed-area table of the image.
fn window_mean(
    integral: &Image<Luma<u64>>,
    width: u32,
    height: u32,
    cx: u32,
    cy: u32,
    radius: u32,
) -> f64 {
    let left = cx.saturating_sub(radius);
    let top = cy.saturating_sub(radius);
    let right = cx.saturating_add(radius).min(width - 1);
    let bottom = cy.saturating_add(radius).min(height - 1);

    let [sum] = sum_image_pixels(integral, left, top, right, bottom);
    let count = (right - left + 1) as f64 * (bottom - top + 1) as f64;
    sum as f64 / count
}
