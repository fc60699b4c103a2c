// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command implementations. Results go to stdout, diagnostics to the log.

use std::path::Path;

use image::DynamicImage;
use scanwerk_core::human_errors::no_document_found;
use scanwerk_core::{DocumentCorners, OutputFormat, RectifyOptions, Result, ScanConfig};
use scanwerk_document::scan::assess_framing;
use scanwerk_document::{BoundaryDetector, ImageProcessor, Rectifier};
use tracing::{info, warn};

use crate::RectifyArgs;

fn load_image(path: &Path) -> Result<DynamicImage> {
    let image = ImageProcessor::open(path)?.into_dynamic();
    info!(path = %path.display(), width = image.width(), height = image.height(), "image loaded");
    Ok(image)
}

/// Print the detected corners, or `null`.
pub fn detect(path: &Path, config: &ScanConfig) -> Result<()> {
    let image = load_image(path)?;
    let detector = BoundaryDetector::new(config.detection.clone())?;
    let corners = detector.detect(&image).map(|c| c.ordered());
    println!("{}", serde_json::to_string_pretty(&corners)?);
    Ok(())
}

/// Rectify with explicit or detected corners and write the result.
pub fn rectify(args: &RectifyArgs, config: &ScanConfig) -> Result<()> {
    let options = rectify_options(args, &config.rectify);
    let rectifier = Rectifier::new(options)?;
    let image = load_image(&args.image)?;

    let corners = match args.corners {
        Some(corners) => corners,
        None => detect_or_full_frame(&image, config)?,
    };

    let bytes = rectifier.rectify(&image, &corners)?;
    std::fs::write(&args.output, &bytes)?;
    info!(
        path = %args.output.display(),
        bytes = bytes.len(),
        mime = rectifier.options().format.mime_type(),
        "scan written"
    );
    Ok(())
}

/// Print the framing verdict for the detected document.
pub fn framing(path: &Path, config: &ScanConfig) -> Result<()> {
    let image = load_image(path)?;
    let detector = BoundaryDetector::new(config.detection.clone())?;

    let report = match detector.detect(&image) {
        Some(corners) => {
            let verdict = assess_framing(&corners, image.width(), image.height(), &config.framing);
            serde_json::json!({
                "corners": corners.ordered(),
                "verdict": verdict,
                "well_framed": verdict.is_well_framed(),
                "guidance": verdict.guidance(),
            })
        }
        None => serde_json::json!({
            "corners": null,
            "verdict": null,
            "well_framed": false,
            "guidance": no_document_found().message,
        }),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Settings file values overridden by command-line flags.
fn rectify_options(args: &RectifyArgs, base: &RectifyOptions) -> RectifyOptions {
    let mut options = base.clone();
    if let Some(width) = args.width {
        options.target_width = width;
    }
    if let Some(quality) = args.quality {
        options.quality = quality;
    }
    options.enhance |= args.enhance;
    if args.png {
        options.format = OutputFormat::Png;
    }
    options
}

fn detect_or_full_frame(image: &DynamicImage, config: &ScanConfig) -> Result<DocumentCorners> {
    let detector = BoundaryDetector::new(config.detection.clone())?;
    Ok(match detector.detect(image) {
        Some(corners) => corners,
        None => {
            warn!("no document found, rectifying the full frame");
            let notice = no_document_found();
            eprintln!("{}\n{}", notice.message, notice.suggestion);
            DocumentCorners::full_frame(image.width(), image.height())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    fn args(image: PathBuf, output: PathBuf) -> RectifyArgs {
        RectifyArgs {
            image,
            output,
            corners: None,
            width: Some(300),
            enhance: false,
            quality: None,
            png: true,
        }
    }

    fn write_page(dir: &Path) -> PathBuf {
        let path = dir.join("photo.png");
        RgbImage::from_fn(500, 700, |x, y| {
            if (50..450).contains(&x) && (50..650).contains(&y) {
                Rgb([240, 240, 240])
            } else {
                Rgb([20, 20, 20])
            }
        })
        .save(&path)
        .unwrap();
        path
    }

    #[test]
    fn flags_override_settings() {
        let base = RectifyOptions {
            quality: 0.5,
            ..Default::default()
        };
        let mut a = args(PathBuf::from("in.jpg"), PathBuf::from("out.jpg"));
        a.quality = Some(0.8);
        a.enhance = true;
        let options = rectify_options(&a, &base);
        assert_eq!(options.target_width, 300);
        assert_eq!(options.quality, 0.8);
        assert!(options.enhance);
        assert_eq!(options.format, OutputFormat::Png);
    }

    #[test]
    fn rectify_writes_scan_from_detected_corners() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_page(dir.path());
        let output = dir.path().join("scan.png");

        rectify(&args(input, output.clone()), &ScanConfig::default()).unwrap();

        let scan = image::open(&output).unwrap();
        assert_eq!((scan.width(), scan.height()), (300, 424));
    }

    #[test]
    fn blank_photo_falls_back_to_full_frame() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("blank.png");
        RgbImage::from_pixel(200, 300, Rgb([128, 128, 128]))
            .save(&input)
            .unwrap();
        let output = dir.path().join("scan.png");

        rectify(&args(input, output.clone()), &ScanConfig::default()).unwrap();
        assert!(output.exists());
    }

    #[test]
    fn missing_input_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = detect(&dir.path().join("nope.jpg"), &ScanConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            scanwerk_core::ScanError::Io(_) | scanwerk_core::ScanError::ImageError(_)
        ));
    }
}
