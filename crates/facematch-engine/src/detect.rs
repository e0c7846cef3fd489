//! The face detection seam.
//!
//! Detection backends are pluggable: the engine only needs bounding boxes
//! with confidences. The real backend lives in `facematch-model`; tests use
//! in-module fakes.

use image::DynamicImage;

use facematch_contracts::FacematchResult;

/// Bounding box of a detected face within an image, in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner.
    pub x: u32,
    /// Y coordinate of the top-left corner.
    pub y: u32,
    /// Width of the box.
    pub width: u32,
    /// Height of the box.
    pub height: u32,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f32,
}

impl FaceBounds {
    /// A box covering the entire frame, used for the lenient whole-frame
    /// fallback when no face is detected.
    pub fn whole_frame(image: &DynamicImage) -> Self {
        Self {
            x: 0,
            y: 0,
            width: image.width(),
            height: image.height(),
            confidence: 0.0,
        }
    }

    /// Crop this box out of `image`, clamping to the frame so a detector
    /// that overshoots the border cannot produce an out-of-bounds crop.
    pub fn crop(&self, image: &DynamicImage) -> DynamicImage {
        let x = self.x.min(image.width().saturating_sub(1));
        let y = self.y.min(image.height().saturating_sub(1));
        let width = self.width.clamp(1, image.width() - x);
        let height = self.height.clamp(1, image.height() - y);
        image.crop_imm(x, y, width, height)
    }
}

/// Pluggable face detection backend.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in `image`. An empty vector means no face was found;
    /// that is a valid result, not an error. Errors are reserved for backend
    /// failures (missing weights, inference faults).
    fn detect(&self, image: &DynamicImage) -> FacematchResult<Vec<FaceBounds>>;
}

/// Pick the highest-confidence detection, if any.
pub fn best_face(faces: &[FaceBounds]) -> Option<&FaceBounds> {
    faces
        .iter()
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
}
