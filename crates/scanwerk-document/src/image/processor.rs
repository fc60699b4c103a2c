// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decoding, resolution bounding, and encoding of page
// images. Operates on in-memory images using the `image` crate.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use scanwerk_core::OutputFormat;
use scanwerk_core::error::ScanError;
use tracing::{debug, info, instrument};

/// Image I/O and resizing around the scanning pipeline.
///
/// Each transforming method consumes `self` and returns a new
/// `ImageProcessor`, enabling method chaining.
///
/// ```ignore
/// let bytes = ImageProcessor::open("page.jpg")?
///     .bound_longest_side(2200)
///     .encode(OutputFormat::Jpeg, 95)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, ScanError> {
        let img = image::open(path.as_ref()).map_err(|err| {
            ScanError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ScanError> {
        let img = image::load_from_memory(data)
            .map_err(|err| ScanError::ImageError(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Downscale so the longest side is at most `max_side`, preserving aspect
    /// ratio. Images already within the bound are returned untouched.
    ///
    /// Uses a triangle filter: fast enough for per-frame use and smooth
    /// enough that edge detection on the result is not aliased.
    #[instrument(skip(self), fields(max_side))]
    pub fn bound_longest_side(self, max_side: u32) -> Self {
        let longest = self.width().max(self.height());
        if longest <= max_side || max_side == 0 {
            return self;
        }
        let scale = max_side as f64 / longest as f64;
        let new_w = ((self.width() as f64 * scale).round() as u32).max(1);
        let new_h = ((self.height() as f64 * scale).round() as u32).max(1);
        info!(
            from_w = self.width(),
            from_h = self.height(),
            new_w,
            new_h,
            "Downscaling image"
        );
        Self {
            image: self.image.resize_exact(new_w, new_h, FilterType::Triangle),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, ScanError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    ///
    /// Single-channel images are written as grayscale JPEG; everything else
    /// is flattened to RGB.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, ScanError> {
        let mut buffer = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        let written = match &self.image {
            DynamicImage::ImageLuma8(gray) => gray.write_with_encoder(encoder),
            other => other.to_rgb8().write_with_encoder(encoder),
        };
        written.map_err(|err| ScanError::Encoding(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode in the requested output format.
    pub fn encode(&self, format: OutputFormat, jpeg_quality: u8) -> Result<Vec<u8>, ScanError> {
        let bytes = match format {
            OutputFormat::Jpeg => self.to_jpeg_bytes(jpeg_quality)?,
            OutputFormat::Png => self.to_png_bytes()?,
        };
        debug!(format = ?format, bytes = bytes.len(), "Image encoded");
        Ok(bytes)
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ScanError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| ScanError::Encoding(format!("image encoding failed: {}", err)))?;
    Ok(buffer)
}
