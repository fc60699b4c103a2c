// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Live preview gate — runs detection and framing for camera preview frames
// on the blocking pool, at most one frame at a time.
//
// Frames that arrive while a detection is in flight are dropped rather than
// queued, so feedback always describes a recent frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::DynamicImage;
use scanwerk_core::FramingConfig;
use scanwerk_core::error::Result;
use scanwerk_core::geometry::DocumentCorners;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace};

use super::detect::BoundaryDetector;
use super::framing::{FramingVerdict, assess_framing};

/// Overlay data for one preview frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameFeedback {
    pub corners: Option<DocumentCorners>,
    /// `None` when no document was found.
    pub verdict: Option<FramingVerdict>,
}

impl FrameFeedback {
    pub fn well_framed(&self) -> bool {
        self.verdict.is_some_and(FramingVerdict::is_well_framed)
    }
}

/// Marks the gate busy for as long as it lives.
///
/// Dropping the guard (including during a panic unwind) reopens the gate.
#[derive(Debug)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Admits preview frames for analysis one at a time.
#[derive(Debug, Clone)]
pub struct PreviewGate {
    detector: Arc<BoundaryDetector>,
    framing: FramingConfig,
    busy: Arc<AtomicBool>,
}

impl PreviewGate {
    pub fn new(detector: BoundaryDetector, framing: FramingConfig) -> Result<Self> {
        framing.validate()?;
        Ok(Self {
            detector: Arc::new(detector),
            framing,
            busy: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the gate, or `None` if a frame is already being analysed.
    pub fn try_acquire(&self) -> Option<InFlight> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Analyse `frame` on the blocking pool.
    ///
    /// Returns `None` without doing any work when the gate is busy. Must be
    /// called from within a Tokio runtime.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn submit(&self, frame: DynamicImage) -> Option<JoinHandle<FrameFeedback>> {
        let Some(guard) = self.try_acquire() else {
            trace!("Preview busy, frame dropped");
            return None;
        };

        let detector = Arc::clone(&self.detector);
        let framing = self.framing;
        Some(tokio::task::spawn_blocking(move || {
            let _guard = guard;
            analyze_frame(&detector, &framing, &frame)
        }))
    }
}

/// Detection plus framing for a single frame, synchronously.
pub fn analyze_frame(
    detector: &BoundaryDetector,
    framing: &FramingConfig,
    frame: &DynamicImage,
) -> FrameFeedback {
    let corners = detector.detect(frame);
    let verdict = corners.map(|c| assess_framing(&c, frame.width(), frame.height(), framing));
    debug!(?verdict, "Preview frame analysed");
    FrameFeedback { corners, verdict }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn page_frame() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(400, 500, |x, y| {
            if (60..340).contains(&x) && (70..430).contains(&y) {
                Luma([235])
            } else {
                Luma([25])
            }
        }))
    }

    fn gate() -> PreviewGate {
        PreviewGate::new(BoundaryDetector::default(), FramingConfig::default()).unwrap()
    }

    #[test]
    fn guard_is_exclusive_and_released_on_drop() {
        let gate = gate();
        let guard = gate.try_acquire().unwrap();
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());
        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn clones_share_the_gate() {
        let gate = gate();
        let other = gate.clone();
        let _guard = gate.try_acquire().unwrap();
        assert!(other.try_acquire().is_none());
    }

    #[tokio::test]
    async fn busy_gate_drops_frames() {
        let gate = gate();
        let guard = gate.try_acquire().unwrap();
        assert!(gate.submit(page_frame()).is_none());
        drop(guard);

        let handle = gate.submit(page_frame()).unwrap();
        handle.await.unwrap();
        assert!(!gate.is_busy());
    }

    #[tokio::test]
    async fn submitted_frame_reports_framing() {
        let gate = gate();
        let feedback = gate.submit(page_frame()).unwrap().await.unwrap();
        assert!(feedback.corners.is_some());
        assert_eq!(feedback.verdict, Some(FramingVerdict::WellFramed));
        assert!(feedback.well_framed());
    }

    #[test]
    fn empty_scene_has_no_verdict() {
        let frame = DynamicImage::ImageLuma8(GrayImage::from_pixel(320, 240, Luma([128])));
        let feedback =
            analyze_frame(&BoundaryDetector::default(), &FramingConfig::default(), &frame);
        assert_eq!(feedback.corners, None);
        assert_eq!(feedback.verdict, None);
        assert!(!feedback.well_framed());
    }

    #[test]
    fn invalid_framing_config_is_rejected() {
        let framing = FramingConfig {
            min_area_ratio: 0.9,
            max_area_ratio: 0.1,
            ..Default::default()
        };
        assert!(PreviewGate::new(BoundaryDetector::default(), framing).is_err());
    }
}
