//! The face verification pipeline.
//!
//! `FaceVerifier` wires a detector and an embedder behind their trait seams
//! and runs the fixed sequence for one image pair:
//!
//!   load → detect → crop → embed   (per image)
//!   distance → threshold resolve → `VerifyOutcome`
//!
//! Detection failure is the one behavioral fork: under strict detection an
//! undetected face aborts the run; otherwise the whole frame is embedded as
//! a fallback, matching the lenient script variant this replaces.

use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info, warn};

use facematch_contracts::{FacematchError, FacematchResult, VerifyOptions, VerifyOutcome};

use crate::detect::{best_face, FaceBounds, FaceDetector};
use crate::embed::FaceEmbedder;
use crate::metrics::{default_threshold, DistanceMetric};

/// Runs face verification over a pair of image files.
///
/// Construct one per process; the backends it owns are loaded once and the
/// verifier itself is stateless across calls.
pub struct FaceVerifier {
    detector: Box<dyn FaceDetector>,
    embedder: Box<dyn FaceEmbedder>,
    metric: DistanceMetric,
}

impl FaceVerifier {
    /// Create a verifier from its backends and the metric to report.
    pub fn new(
        detector: Box<dyn FaceDetector>,
        embedder: Box<dyn FaceEmbedder>,
        metric: DistanceMetric,
    ) -> Self {
        Self {
            detector,
            embedder,
            metric,
        }
    }

    /// Verify that the faces in `img1` and `img2` belong to the same person.
    ///
    /// Errors returned here are invocation-tier: the caller is expected to
    /// have run preflight validation already, so any failure below comes
    /// from image loading or the model backend.
    pub fn verify_pair(
        &self,
        img1: &Path,
        img2: &Path,
        options: &VerifyOptions,
    ) -> FacematchResult<VerifyOutcome> {
        let embedding1 = self.represent(img1, options)?;
        let embedding2 = self.represent(img2, options)?;

        let distance = self.metric.distance(&embedding1, &embedding2);
        let model = self.embedder.model_name().to_string();
        let threshold = default_threshold(&model, self.metric);

        let mut outcome = VerifyOutcome::new(distance, threshold, model, self.metric.name());
        if let Some(t) = options.threshold_override {
            outcome = outcome.with_threshold(t);
        }

        info!(
            verified = outcome.verified,
            distance = outcome.distance,
            threshold = outcome.threshold,
            model = %outcome.model,
            "verification complete"
        );
        Ok(outcome)
    }

    /// Load one image, locate its face, and embed the crop.
    fn represent(&self, path: &Path, options: &VerifyOptions) -> FacematchResult<Vec<f32>> {
        let image = load_image(path)?;
        let faces = self.detector.detect(&image)?;
        debug!(path = %path.display(), faces = faces.len(), "detection complete");

        let bounds = match best_face(&faces) {
            Some(face) => face.clone(),
            None if options.strict_detection => {
                return Err(FacematchError::NoFaceDetected {
                    path: path.display().to_string(),
                });
            }
            None => {
                warn!(path = %path.display(), "no face detected; embedding whole frame");
                FaceBounds::whole_frame(&image)
            }
        };

        self.embedder.embed(&bounds.crop(&image))
    }
}

fn load_image(path: &Path) -> FacematchResult<DynamicImage> {
    image::open(path).map_err(|e| FacematchError::Inference {
        reason: format!("could not read image '{}': {e}", path.display()),
    })
}
